//! Interaction ledger: one immutable decision per ordered user pair.
//!
//! The ledger does not consult blocks. Callers gate on
//! [`is_blocked_either_way`](crate::core::blocks::is_blocked_either_way) first.

use crate::core::error::{validate_pair, EngineError, EngineResult};
use crate::core::users::require_user;
use crate::models::{Interaction, InteractionKind, UserId};
use crate::services::StoreTx;

/// The recorded decision of `source` about `target`, if any
pub async fn decision_of(
    tx: &mut dyn StoreTx,
    source: UserId,
    target: UserId,
) -> EngineResult<Option<Interaction>> {
    Ok(tx.find_interaction(source, target).await?)
}

/// Persist a decision. A pair that already has a decision cannot be re-decided, whatever the
/// earlier kind was.
pub async fn record_decision(
    tx: &mut dyn StoreTx,
    source: UserId,
    target: UserId,
    kind: InteractionKind,
) -> EngineResult<Interaction> {
    validate_pair(source, target, "source", "target")?;
    require_user(tx, source, "source").await?;
    require_user(tx, target, "target").await?;

    if let Some(existing) = decision_of(tx, source, target).await? {
        return Err(EngineError::DuplicateRelationship(format!(
            "user {} already decided on user {} ({})",
            source, target, existing.kind
        )));
    }

    // The unique index still has the final word if a concurrent call slipped in
    let interaction = tx.insert_interaction(source, target, kind).await?;

    tracing::debug!(
        "Recorded {} from {} to {} (interaction {})",
        kind,
        source,
        target,
        interaction.id
    );

    Ok(interaction)
}
