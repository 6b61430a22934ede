use serde::{Deserialize, Serialize};
use crate::models::domain::{Block, Conversation, Match};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for the like endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    #[serde(rename = "matchFormed")]
    pub match_formed: bool,
    #[serde(rename = "interactionId")]
    pub interaction_id: i64,
    #[serde(rename = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<i64>,
}

/// Response for the pass endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassResponse {
    #[serde(rename = "interactionId")]
    pub interaction_id: i64,
}

/// Matches of one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub matches: Vec<Match>,
    pub count: usize,
}

/// Blocks created by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub blocks: Vec<Block>,
    pub count: usize,
}

/// Conversations one user participates in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub conversations: Vec<Conversation>,
    pub count: usize,
}
