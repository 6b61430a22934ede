use crate::core::error::EngineResult;
use crate::core::ledger::decision_of;
use crate::models::{InteractionKind, UserId};
use crate::services::StoreTx;

/// Whether `user_b` has already liked `user_a`
///
/// Called right after a like from `user_a` to `user_b` is recorded, inside the same
/// transaction and under the pair lock.
pub async fn has_reciprocal_like(
    tx: &mut dyn StoreTx,
    user_a: UserId,
    user_b: UserId,
) -> EngineResult<bool> {
    let reverse = decision_of(tx, user_b, user_a).await?;
    Ok(matches!(reverse, Some(i) if i.kind == InteractionKind::Like))
}
