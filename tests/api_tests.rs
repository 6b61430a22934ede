// HTTP adapter tests for Lume Match

use actix_web::{http::StatusCode, test, web, App};
use lume_match::config::{StorageBackend, StorageSettings};
use lume_match::models::{ErrorResponse, LikeResponse, MatchesResponse};
use lume_match::routes::{self, matchmaking::AppState};
use lume_match::services::CacheManager;
use lume_match::{Conversation, MatchmakingEngine, MemoryStore};
use serde_json::json;
use std::sync::Arc;

async fn state_with_users(names: &[&str]) -> (AppState, Vec<i64>) {
    let store = MemoryStore::with_users(names).await;
    let ids = (1..=names.len() as i64).collect();
    let state = AppState {
        engine: MatchmakingEngine::new(Arc::new(store)),
        cache: Arc::new(CacheManager::local_only(100, 60)),
    };
    (state, ids)
}

#[actix_web::test]
async fn test_memory_backend_serves_configured_users() {
    let storage = StorageSettings {
        backend: StorageBackend::Memory,
        seed_users: vec!["Alex".to_string(), "Sam".to_string()],
    };
    let state = AppState {
        engine: MatchmakingEngine::new(Arc::new(
            MemoryStore::with_users(storage.seed_users.as_slice()).await,
        )),
        cache: Arc::new(CacheManager::local_only(100, 60)),
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": 1, "targetId": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": 2, "targetId": 1 }))
        .to_request();
    let body: LikeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.match_formed);

    // Ids past the seeded users stay unknown
    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/pass")
        .set_json(json!({ "sourceId": 1, "targetId": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_like_flow_over_http() {
    let (state, ids) = state_with_users(&["Alex", "Sam"]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    // Prime the matches cache while there are none
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/matches", ids[0]))
        .to_request();
    let body: MatchesResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.count, 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": ids[0], "targetId": ids[1] }))
        .to_request();
    let body: LikeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!body.match_formed);

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": ids[1], "targetId": ids[0] }))
        .to_request();
    let body: LikeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.match_formed);
    let match_id = body.match_id.unwrap();

    // The new match invalidated the cached empty listing
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/matches", ids[0]))
        .to_request();
    let body: MatchesResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.count, 1);
    assert_eq!(body.matches[0].id, match_id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/matches/{}/conversation", match_id))
        .to_request();
    let conversation: Conversation = test::call_and_read_body_json(&app, req).await;
    assert_eq!(conversation.display_name, "Sam & Alex");

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": ids[1], "targetId": ids[0] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_block_and_unblock_over_http() {
    let (state, ids) = state_with_users(&["Alex", "Sam"]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/blocks")
        .set_json(json!({ "blockerId": ids[0], "blockedId": ids[1] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/pass")
        .set_json(json!({ "sourceId": ids[1], "targetId": ids[0] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "forbidden");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/blocks/{}/{}", ids[0], ids[1]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/blocks/{}/{}", ids[0], ids[1]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_ids_are_bad_requests() {
    let (state, ids) = state_with_users(&["Alex"]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": 0, "targetId": ids[0] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/interactions/like")
        .set_json(json!({ "sourceId": ids[0], "targetId": ids[0] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_argument");
}

#[actix_web::test]
async fn test_health_reports_healthy_store() {
    let (state, _ids) = state_with_users(&[]).await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
