//! Playback queue construction.
//!
//! The queue is the user's pinned items followed by a round-robin interleave
//! of every channel's freshly fetched items. Each channel's list is shuffled
//! first so repeated refreshes returning the same top results don't always
//! lead with the same video.

use crate::model::{Channel, ContentItem};
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// Fetched items keyed by channel id
pub type ItemsByChannel = HashMap<String, Vec<ContentItem>>;

/// Build the full playback queue using the thread-local RNG.
#[must_use]
pub fn build_queue(
    channels: &[Channel],
    items_by_channel: &ItemsByChannel,
    manual_items: &[ContentItem],
) -> Vec<ContentItem> {
    build_queue_with_rng(channels, items_by_channel, manual_items, &mut rand::rng())
}

/// Build the full playback queue with an explicit RNG.
pub fn build_queue_with_rng<R: Rng>(
    channels: &[Channel],
    items_by_channel: &ItemsByChannel,
    manual_items: &[ContentItem],
    rng: &mut R,
) -> Vec<ContentItem> {
    let interleaved = interleave(channels, items_by_channel, rng);
    prepend_manual(manual_items, interleaved)
}

/// Shuffle each channel's items and interleave them one per channel per pass.
///
/// Channels without an entry (or with an empty list) are skipped. Duplicate
/// ids across channels are kept.
pub fn interleave<R: Rng>(
    channels: &[Channel],
    items_by_channel: &ItemsByChannel,
    rng: &mut R,
) -> Vec<ContentItem> {
    let mut pools: Vec<VecDeque<ContentItem>> = channels
        .iter()
        .map(|channel| {
            let items = items_by_channel
                .get(&channel.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            shuffle(items, rng).into()
        })
        .collect();

    let total = pools.iter().map(VecDeque::len).sum();
    let mut queue = Vec::with_capacity(total);

    let mut added = true;
    while added {
        added = false;
        for pool in &mut pools {
            if let Some(item) = pool.pop_front() {
                queue.push(item);
                added = true;
            }
        }
    }

    queue
}

/// Prepend pinned items, kept in their stored (most recent first) order.
#[must_use]
pub fn prepend_manual(
    manual_items: &[ContentItem],
    channel_queue: Vec<ContentItem>,
) -> Vec<ContentItem> {
    let mut queue = Vec::with_capacity(manual_items.len() + channel_queue.len());
    queue.extend_from_slice(manual_items);
    queue.extend(channel_queue);
    queue
}

/// Uniform random permutation via an independent random sort key per item.
fn shuffle<R: Rng>(items: &[ContentItem], rng: &mut R) -> Vec<ContentItem> {
    let mut keyed: Vec<(f64, ContentItem)> = items
        .iter()
        .map(|item| (rng.random::<f64>(), item.clone()))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn item(id: &str, channel: &str) -> ContentItem {
        ContentItem::new(id, format!("Video {id}"), channel, format!("Channel {channel}"), "")
    }

    fn fixture(counts: &[(&str, usize)]) -> (Vec<Channel>, ItemsByChannel) {
        let mut channels = Vec::new();
        let mut items = ItemsByChannel::new();
        for (channel, count) in counts {
            channels.push(Channel::new(*channel, *channel));
            items.insert(
                (*channel).to_string(),
                (0..*count).map(|i| item(&format!("{channel}{i}"), channel)).collect(),
            );
        }
        (channels, items)
    }

    fn ids(queue: &[ContentItem]) -> Vec<String> {
        queue.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_length_is_sum_of_inputs() {
        let (channels, items) = fixture(&[("A", 3), ("B", 5), ("C", 1)]);
        let manual = vec![item("m1", "X"), item("m2", "Y")];
        let mut rng = StdRng::seed_from_u64(7);

        let queue = build_queue_with_rng(&channels, &items, &manual, &mut rng);
        assert_eq!(queue.len(), 3 + 5 + 1 + 2);

        let seen: HashSet<_> = ids(&queue).into_iter().collect();
        for list in items.values() {
            for source in list {
                assert!(seen.contains(&source.id), "missing {}", source.id);
            }
        }
    }

    #[test]
    fn test_round_robin_fairness() {
        let (channels, items) = fixture(&[("A", 4), ("B", 4), ("C", 6)]);
        let mut rng = StdRng::seed_from_u64(42);

        let queue = interleave(&channels, &items, &mut rng);
        let k = 4;
        let n = channels.len();
        for round in 0..k {
            let represented: HashSet<_> = queue[round * n..(round + 1) * n]
                .iter()
                .map(|i| i.channel_id.clone())
                .collect();
            assert_eq!(represented.len(), n, "round {round} is unfair");
        }
        // The leftover items all belong to the longest channel
        assert!(queue[k * n..].iter().all(|i| i.channel_id == "C"));
    }

    #[test]
    fn test_channel_order_sets_phase() {
        let (channels, items) = fixture(&[("A", 2), ("B", 2)]);
        let mut rng = StdRng::seed_from_u64(1);

        let queue = interleave(&channels, &items, &mut rng);
        let channel_order: Vec<_> = queue.iter().map(|i| i.channel_id.as_str()).collect();
        assert_eq!(channel_order, vec!["A", "B", "A", "B"]);
    }

    #[test]
    fn test_same_multiset_across_calls() {
        let (channels, items) = fixture(&[("A", 6), ("B", 3)]);

        let mut first = ids(&build_queue(&channels, &items, &[]));
        let mut second = ids(&build_queue(&channels, &items, &[]));
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn test_manual_items_lead_in_stored_order() {
        let (channels, items) = fixture(&[("cA", 1), ("cB", 1)]);
        // Stored most-recent-first: "v1" was added after "v9"
        let manual = vec![item("v1", "X"), item("v9", "X")];

        let queue = build_queue(&channels, &items, &manual);
        let queue_ids = ids(&queue);
        assert_eq!(&queue_ids[..2], ["v1", "v9"]);
        assert_eq!(&queue_ids[2..], ["cA0", "cB0"]);
    }

    #[test]
    fn test_missing_and_empty_channels_are_skipped() {
        let (mut channels, mut items) = fixture(&[("A", 2)]);
        channels.push(Channel::new("B", "B"));
        channels.push(Channel::new("C", "C"));
        items.insert("C".into(), Vec::new());

        let queue = build_queue(&channels, &items, &[]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_empty_inputs_give_empty_queue() {
        assert!(build_queue(&[], &ItemsByChannel::new(), &[]).is_empty());
    }

    #[test]
    fn test_duplicates_across_channels_are_preserved() {
        let channels = vec![Channel::new("A", "A"), Channel::new("B", "B")];
        let mut items = ItemsByChannel::new();
        items.insert("A".into(), vec![item("shared", "A")]);
        items.insert("B".into(), vec![item("shared", "B")]);

        let queue = build_queue(&channels, &items, &[]);
        assert_eq!(ids(&queue), vec!["shared", "shared"]);
    }

    #[test]
    fn test_shuffle_reorders_within_channel() {
        let (channels, items) = fixture(&[("A", 12)]);
        let original = ids(&items["A"]);

        let differs = (0..20_u64).any(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            ids(&interleave(&channels, &items, &mut rng)) != original
        });
        assert!(differs);
    }
}
