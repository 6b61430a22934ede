//! Match & conversation factory.
//!
//! A match and its conversation are written in the caller's transaction, so a failure while
//! creating the conversation leaves no match behind once the transaction rolls back.

use crate::core::error::{validate_pair, EngineError, EngineResult};
use crate::core::users::require_user;
use crate::models::{conversation_display_name, Conversation, Match, UserId};
use crate::services::StoreTx;

/// A freshly created match together with its conversation
#[derive(Debug, Clone)]
pub struct CreatedMatch {
    pub record: Match,
    pub conversation: Conversation,
}

/// Create the match for the unordered pair `{user_a, user_b}` plus its conversation
///
/// Fails with `DuplicateRelationship` if the pair already has a match in either order. The
/// ledger's per-pair uniqueness should make that unreachable, but match creation never
/// silently duplicates.
pub async fn create_match_if_absent(
    tx: &mut dyn StoreTx,
    user_a: UserId,
    user_b: UserId,
) -> EngineResult<CreatedMatch> {
    validate_pair(user_a, user_b, "user_a", "user_b")?;

    if let Some(existing) = tx.find_match_by_pair(user_a, user_b).await? {
        return Err(EngineError::DuplicateRelationship(format!(
            "users {} and {} already matched (match {})",
            user_a, user_b, existing.id
        )));
    }

    let first = require_user(tx, user_a, "matched").await?;
    let second = require_user(tx, user_b, "matched").await?;

    let record = tx.insert_match(user_a, user_b).await?;
    let conversation = tx
        .insert_conversation(
            record.id,
            &conversation_display_name(&first, &second),
            [user_a, user_b],
        )
        .await?;

    tracing::debug!(
        "Created match {} with conversation {} for {} and {}",
        record.id,
        conversation.id,
        user_a,
        user_b
    );

    Ok(CreatedMatch {
        record,
        conversation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemoryStore, Store};

    #[tokio::test]
    async fn test_creates_match_and_named_conversation() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let b = store.seed_user("Sam").await;
        let mut tx = store.begin().await.unwrap();

        let created = create_match_if_absent(&mut *tx, a.id, b.id).await.unwrap();

        assert!(created.record.is_between(b.id, a.id));
        assert_eq!(created.conversation.match_id, created.record.id);
        assert_eq!(created.conversation.display_name, "Alex & Sam");
        assert!(created.conversation.has_participants(a.id, b.id));
    }

    #[tokio::test]
    async fn test_reversed_pair_is_duplicate() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let b = store.seed_user("Sam").await;
        let mut tx = store.begin().await.unwrap();

        create_match_if_absent(&mut *tx, a.id, b.id).await.unwrap();
        let err = create_match_if_absent(&mut *tx, b.id, a.id).await.unwrap_err();

        assert!(matches!(err, EngineError::DuplicateRelationship(_)));
        assert_eq!(tx.matches_of(a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_creates_nothing() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let mut tx = store.begin().await.unwrap();

        let err = create_match_if_absent(&mut *tx, a.id, 77).await.unwrap_err();

        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(tx.matches_of(a.id).await.unwrap().is_empty());
    }
}
