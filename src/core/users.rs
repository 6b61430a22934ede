use crate::core::error::{EngineError, EngineResult};
use crate::models::{User, UserId};
use crate::services::StoreTx;

/// Load a user or fail with `NotFound`
pub async fn require_user(tx: &mut dyn StoreTx, id: UserId, role: &str) -> EngineResult<User> {
    tx.find_user(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("{} user {} does not exist", role, id)))
}
