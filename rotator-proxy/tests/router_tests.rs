//! Router tests for the proxy endpoints, driven through `tower::ServiceExt::oneshot`

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use rotator_core::{
    extract_video_id, CatalogClient, ContentItem, CoreError, ItemsByChannel, RecentItems,
    ResolvedChannel,
};
use rotator_proxy::{
    build_router, AppState, BLANK_CHANNEL_MESSAGE, BLANK_VIDEO_MESSAGE, NO_CHANNELS_MESSAGE,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

struct FakeCatalog;

#[async_trait]
impl CatalogClient for FakeCatalog {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn resolve_channel(&self, raw: &str) -> Result<ResolvedChannel, CoreError> {
        match raw.trim() {
            "@nobody" => Err(CoreError::resolution("Channel not found.")),
            "UCnolabel" => Ok(ResolvedChannel::new("UCnolabel", None)),
            _ => Ok(ResolvedChannel::new("UC123", Some("Science".into()))),
        }
    }

    async fn resolve_video(&self, raw: &str) -> Result<ContentItem, CoreError> {
        let video_id = extract_video_id(raw);
        match video_id.as_str() {
            "gone0000000" => Err(CoreError::VideoNotFound { video_id }),
            "quota000000" => Err(CoreError::CatalogStatus { status: 403 }),
            _ => Ok(ContentItem::new(video_id, "A video", "UC1", "Science", "")),
        }
    }

    async fn fetch_recent_items(&self, channel_ids: &[String]) -> Result<RecentItems, CoreError> {
        let mut items_by_channel = ItemsByChannel::new();
        let mut errors = Vec::new();
        for id in channel_ids {
            if id == "UCbroken" {
                errors.push(format!("Failed to fetch videos for channel {id}: boom"));
                items_by_channel.insert(id.clone(), Vec::new());
            } else {
                items_by_channel.insert(
                    id.clone(),
                    vec![ContentItem::new(format!("{id}-v1"), "Latest", id, "Chan", "")],
                );
            }
        }
        Ok(RecentItems {
            items_by_channel,
            errors,
        })
    }
}

fn app() -> Router {
    build_router(AppState::new(Arc::new(FakeCatalog)))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text(&body), "ok");
}

#[tokio::test]
async fn test_resolve_channel_returns_id_and_label() {
    let (status, body) = send(
        app(),
        post_json("/api/resolve-channel", &json!({ "input": "@science" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "channelId": "UC123", "label": "Science" }));
}

#[tokio::test]
async fn test_resolve_channel_omits_missing_label() {
    let (status, body) = send(
        app(),
        post_json("/api/resolve-channel", &json!({ "input": "UCnolabel" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "channelId": "UCnolabel" }));
}

#[tokio::test]
async fn test_resolve_channel_blank_input_is_400() {
    let (status, body) = send(
        app(),
        post_json("/api/resolve-channel", &json!({ "input": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), BLANK_CHANNEL_MESSAGE);

    let (status, _) = send(app(), post_json("/api/resolve-channel", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolve_channel_failure_is_400_with_message() {
    let (status, body) = send(
        app(),
        post_json("/api/resolve-channel", &json!({ "input": "@nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Channel not found.");
}

#[tokio::test]
async fn test_resolve_video_returns_item() {
    let (status, body) = send(
        app(),
        post_json(
            "/api/resolve-video",
            &json!({ "input": "https://youtu.be/dQw4w9WgXcQ" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["id"], "dQw4w9WgXcQ");
    assert_eq!(value["channelId"], "UC1");
    assert_eq!(value["channelTitle"], "Science");
    assert_eq!(value["thumbnail"], "");
}

#[tokio::test]
async fn test_resolve_video_status_codes() {
    let (status, body) = send(
        app(),
        post_json("/api/resolve-video", &json!({ "input": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), BLANK_VIDEO_MESSAGE);

    let (status, body) = send(
        app(),
        post_json("/api/resolve-video", &json!({ "input": "gone0000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text(&body), "Video not found.");

    let (status, body) = send(
        app(),
        post_json("/api/resolve-video", &json!({ "input": "quota000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text(&body), "Catalog returned status 403");
}

#[tokio::test]
async fn test_videos_returns_items_and_errors() {
    let (status, body) = send(
        app(),
        post_json("/api/videos", &json!({ "channels": ["UC1", "UCbroken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["videosByChannel"]["UC1"][0]["id"], "UC1-v1");
    assert_eq!(value["videosByChannel"]["UCbroken"], json!([]));
    assert_eq!(
        value["errors"],
        json!(["Failed to fetch videos for channel UCbroken: boom"])
    );
}

#[tokio::test]
async fn test_videos_without_channels_is_json_400() {
    let (status, body) = send(app(), post_json("/api/videos", &json!({ "channels": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "error": NO_CHANNELS_MESSAGE }));
}

#[tokio::test]
async fn test_missing_api_key_is_500_everywhere() {
    let app = build_router(AppState::without_catalog());

    for uri in ["/api/resolve-channel", "/api/resolve-video"] {
        let (status, body) = send(app.clone(), post_json(uri, &json!({ "input": "abc" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(text(&body).contains("YOUTUBE_API_KEY"));
    }

    let (status, body) = send(app, post_json("/api/videos", &json!({ "channels": ["UC1"] }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("YOUTUBE_API_KEY"));
}
