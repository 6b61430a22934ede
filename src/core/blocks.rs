//! Block registry: directed block relationships that gate every other operation.

use crate::core::error::{validate_pair, EngineError, EngineResult};
use crate::core::teardown::sever_conversation;
use crate::core::users::require_user;
use crate::models::{Block, UserId};
use crate::services::StoreTx;

/// Whether either user has blocked the other
pub async fn is_blocked_either_way(
    tx: &mut dyn StoreTx,
    x: UserId,
    y: UserId,
) -> EngineResult<bool> {
    if tx.find_block(x, y).await?.is_some() {
        return Ok(true);
    }
    Ok(tx.find_block(y, x).await?.is_some())
}

/// Record that `blocker` blocks `blocked`, then tear down any conversation between them
pub async fn block(tx: &mut dyn StoreTx, blocker: UserId, blocked: UserId) -> EngineResult<Block> {
    validate_pair(blocker, blocked, "blocker", "blocked")?;
    require_user(tx, blocker, "blocker").await?;
    require_user(tx, blocked, "blocked").await?;

    if tx.find_block(blocker, blocked).await?.is_some() {
        return Err(EngineError::DuplicateRelationship(format!(
            "user {} has already blocked user {}",
            blocker, blocked
        )));
    }

    let block = tx.insert_block(blocker, blocked).await?;
    sever_conversation(tx, blocker, blocked).await?;

    Ok(block)
}

/// Remove the block `blocker -> blocked`. Conversations torn down by the block stay deleted.
pub async fn unblock(tx: &mut dyn StoreTx, blocker: UserId, blocked: UserId) -> EngineResult<()> {
    validate_pair(blocker, blocked, "blocker", "blocked")?;

    let block = tx.find_block(blocker, blocked).await?.ok_or_else(|| {
        EngineError::NotFound(format!(
            "user {} has not blocked user {}",
            blocker, blocked
        ))
    })?;

    tx.delete_block(block.id).await?;
    Ok(())
}
