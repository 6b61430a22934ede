use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to like or pass on another user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecisionRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "source_id", rename = "sourceId")]
    pub source_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "target_id", rename = "targetId")]
    pub target_id: i64,
}

/// Request to block another user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlockRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "blocker_id", rename = "blockerId")]
    pub blocker_id: i64,
    #[validate(range(min = 1))]
    #[serde(alias = "blocked_id", rename = "blockedId")]
    pub blocked_id: i64,
}
