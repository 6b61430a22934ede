use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::{Validate, ValidationErrors};
use crate::core::{EngineError, MatchmakingEngine};
use crate::models::{
    BlockRequest, BlocksResponse, ConversationsResponse, DecisionRequest, ErrorResponse,
    HealthResponse, LikeResponse, Match, MatchesResponse, PassResponse,
};
use crate::services::{CacheKey, CacheManager};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchmakingEngine,
    pub cache: Arc<CacheManager>,
}

/// Configure all matchmaking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/interactions/like", web::post().to(like))
        .route("/interactions/pass", web::post().to(pass))
        .route("/blocks", web::post().to(block))
        .route("/blocks/{blocker_id}/{blocked_id}", web::delete().to(unblock))
        .route("/users/{user_id}/matches", web::get().to(matches_of))
        .route("/users/{user_id}/blocks", web::get().to(blocks_of))
        .route("/users/{user_id}/conversations", web::get().to(conversations_of))
        .route("/matches/{match_id}", web::get().to(match_by_id))
        .route("/matches/{match_id}/conversation", web::get().to(conversation_of));
}

/// Render an engine failure with the status its kind maps to
fn engine_error(err: EngineError) -> HttpResponse {
    if let EngineError::Storage(e) = &err {
        tracing::error!("Storage failure: {}", e);
    }

    let status_code = err.status_code();
    HttpResponse::build(
        StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    )
    .json(ErrorResponse {
        error: err.kind().to_string(),
        message: err.to_string(),
        status_code,
    })
}

fn validation_error(errors: ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_argument".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.engine.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Like endpoint
///
/// POST /api/v1/interactions/like
///
/// Request body:
/// ```json
/// { "sourceId": 1, "targetId": 2 }
/// ```
async fn like(state: web::Data<AppState>, req: web::Json<DecisionRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let outcome = match state.engine.like(req.source_id, req.target_id).await {
        Ok(outcome) => outcome,
        Err(e) => return engine_error(e),
    };

    if outcome.match_formed() {
        if let Err(e) = state.cache.invalidate_matches(req.source_id, req.target_id).await {
            tracing::warn!("Failed to invalidate cached matches: {}", e);
        }
    }

    HttpResponse::Ok().json(LikeResponse {
        match_formed: outcome.match_formed(),
        interaction_id: outcome.interaction.id,
        match_id: outcome.matched.map(|created| created.record.id),
    })
}

/// Pass endpoint
///
/// POST /api/v1/interactions/pass
async fn pass(state: web::Data<AppState>, req: web::Json<DecisionRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.engine.pass(req.source_id, req.target_id).await {
        Ok(interaction) => HttpResponse::Ok().json(PassResponse {
            interaction_id: interaction.id,
        }),
        Err(e) => engine_error(e),
    }
}

/// Block endpoint
///
/// POST /api/v1/blocks
///
/// Request body:
/// ```json
/// { "blockerId": 1, "blockedId": 2 }
/// ```
async fn block(state: web::Data<AppState>, req: web::Json<BlockRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.engine.block(req.blocker_id, req.blocked_id).await {
        Ok(block) => HttpResponse::Created().json(block),
        Err(e) => engine_error(e),
    }
}

/// DELETE /api/v1/blocks/{blockerId}/{blockedId}
async fn unblock(state: web::Data<AppState>, path: web::Path<(i64, i64)>) -> impl Responder {
    let (blocker_id, blocked_id) = path.into_inner();

    match state.engine.unblock(blocker_id, blocked_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/users/{userId}/matches
///
/// Served from the cache when possible; cache trouble only costs a store round trip.
/// Redis entries filled by another instance can still lag a match by up to the TTL.
async fn matches_of(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let user_id = path.into_inner();
    let cache_key = CacheKey::matches(user_id);

    let matches = match state.cache.get::<Vec<Match>>(&cache_key).await {
        Ok(cached) => cached,
        Err(_) => {
            let seen = state.cache.generation();
            let fresh = match state.engine.matches_of(user_id).await {
                Ok(matches) => matches,
                Err(e) => return engine_error(e),
            };
            if let Err(e) = state.cache.set_if_unchanged(&cache_key, &fresh, seen).await {
                tracing::warn!("Failed to cache matches for {}: {}", user_id, e);
            }
            fresh
        }
    };

    HttpResponse::Ok().json(MatchesResponse {
        user_id,
        count: matches.len(),
        matches,
    })
}

/// GET /api/v1/users/{userId}/blocks
async fn blocks_of(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let user_id = path.into_inner();

    match state.engine.blocks_of(user_id).await {
        Ok(blocks) => HttpResponse::Ok().json(BlocksResponse {
            user_id,
            count: blocks.len(),
            blocks,
        }),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/users/{userId}/conversations
async fn conversations_of(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let user_id = path.into_inner();

    match state.engine.conversations_of(user_id).await {
        Ok(conversations) => HttpResponse::Ok().json(ConversationsResponse {
            user_id,
            count: conversations.len(),
            conversations,
        }),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/matches/{matchId}
async fn match_by_id(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match state.engine.match_by_id(path.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => engine_error(e),
    }
}

/// GET /api/v1/matches/{matchId}/conversation
async fn conversation_of(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match state.engine.conversation_of(path.into_inner()).await {
        Ok(conversation) => HttpResponse::Ok().json(conversation),
        Err(e) => engine_error(e),
    }
}
