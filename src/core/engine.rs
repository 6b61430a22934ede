use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::blocks::{self, is_blocked_either_way};
use crate::core::error::{validate_id, validate_pair, EngineError, EngineResult};
use crate::core::factory::{create_match_if_absent, CreatedMatch};
use crate::core::ledger::{decision_of, record_decision};
use crate::core::reciprocity::has_reciprocal_like;
use crate::core::users::require_user;
use crate::models::{Block, Conversation, Interaction, InteractionKind, Match, MatchId, UserId};
use crate::services::{Store, StoreTx};

/// Result of a like
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub interaction: Interaction,
    /// Set when this like completed a mutual like
    pub matched: Option<CreatedMatch>,
}

impl LikeOutcome {
    pub fn match_formed(&self) -> bool {
        self.matched.is_some()
    }
}

/// Entry point for likes, passes and blocks
///
/// Each public operation runs as one transaction on the injected [`Store`]: it commits when the
/// operation succeeds and rolls back on any error, so a failed call leaves nothing behind.
/// Operations on a pair take the store's pair lock before reading anything, which keeps
/// concurrent calls on the same pair from both passing a check-then-insert.
///
/// Per ordered pair the decision goes `none -> liked | passed` once and for all. Blocking is
/// orthogonal and can be toggled. A match forms exactly once, when both directions are `liked`.
#[derive(Clone)]
pub struct MatchmakingEngine {
    store: Arc<dyn Store>,
}

impl MatchmakingEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `source` likes `target`; forms a match if `target` already liked `source`
    pub async fn like(&self, source: UserId, target: UserId) -> EngineResult<LikeOutcome> {
        validate_pair(source, target, "source", "target")?;

        let mut tx = self.store.begin().await?;
        let result = Self::like_in(&mut *tx, source, target).await;
        let outcome = finish(tx, result).await?;

        match &outcome.matched {
            Some(created) => info!(
                "Match {} formed between {} and {} (conversation {})",
                created.record.id, source, target, created.conversation.id
            ),
            None => debug!("User {} liked {}, no match yet", source, target),
        }

        Ok(outcome)
    }

    async fn like_in(
        tx: &mut dyn StoreTx,
        source: UserId,
        target: UserId,
    ) -> EngineResult<LikeOutcome> {
        tx.lock_pair(source, target).await?;
        ensure_not_blocked(tx, source, target).await?;

        let interaction = record_decision(tx, source, target, InteractionKind::Like).await?;

        let matched = if has_reciprocal_like(tx, source, target).await? {
            Some(create_match_if_absent(tx, source, target).await?)
        } else {
            None
        };

        Ok(LikeOutcome {
            interaction,
            matched,
        })
    }

    /// `source` passes on `target`. Final, like a like.
    pub async fn pass(&self, source: UserId, target: UserId) -> EngineResult<Interaction> {
        validate_pair(source, target, "source", "target")?;

        let mut tx = self.store.begin().await?;
        let result = Self::pass_in(&mut *tx, source, target).await;
        let interaction = finish(tx, result).await?;

        debug!("User {} passed on {}", source, target);
        Ok(interaction)
    }

    async fn pass_in(
        tx: &mut dyn StoreTx,
        source: UserId,
        target: UserId,
    ) -> EngineResult<Interaction> {
        tx.lock_pair(source, target).await?;
        ensure_not_blocked(tx, source, target).await?;
        record_decision(tx, source, target, InteractionKind::Pass).await
    }

    /// `blocker` blocks `blocked`; any conversation between them is deleted
    pub async fn block(&self, blocker: UserId, blocked: UserId) -> EngineResult<Block> {
        validate_pair(blocker, blocked, "blocker", "blocked")?;

        let mut tx = self.store.begin().await?;
        let result = Self::block_in(&mut *tx, blocker, blocked).await;
        let block = finish(tx, result).await?;

        info!("User {} blocked {}", blocker, blocked);
        Ok(block)
    }

    async fn block_in(
        tx: &mut dyn StoreTx,
        blocker: UserId,
        blocked: UserId,
    ) -> EngineResult<Block> {
        tx.lock_pair(blocker, blocked).await?;
        blocks::block(tx, blocker, blocked).await
    }

    /// Lift a block. Deleted conversations are not restored.
    pub async fn unblock(&self, blocker: UserId, blocked: UserId) -> EngineResult<()> {
        validate_pair(blocker, blocked, "blocker", "blocked")?;

        let mut tx = self.store.begin().await?;
        let result = Self::unblock_in(&mut *tx, blocker, blocked).await;
        finish(tx, result).await?;

        info!("User {} unblocked {}", blocker, blocked);
        Ok(())
    }

    async fn unblock_in(
        tx: &mut dyn StoreTx,
        blocker: UserId,
        blocked: UserId,
    ) -> EngineResult<()> {
        tx.lock_pair(blocker, blocked).await?;
        blocks::unblock(tx, blocker, blocked).await
    }

    /// All matches of `user`, including ones whose conversation was severed by a block
    pub async fn matches_of(&self, user: UserId) -> EngineResult<Vec<Match>> {
        validate_id(user, "user")?;

        let mut tx = self.store.begin().await?;
        let result = matches_in(&mut *tx, user).await;
        finish(tx, result).await
    }

    pub async fn match_by_id(&self, match_id: MatchId) -> EngineResult<Match> {
        validate_id(match_id, "match")?;

        let mut tx = self.store.begin().await?;
        let result = find_match(&mut *tx, match_id).await;
        finish(tx, result).await
    }

    /// The conversation owned by a match; `NotFound` once a block has severed it
    pub async fn conversation_of(&self, match_id: MatchId) -> EngineResult<Conversation> {
        validate_id(match_id, "match")?;

        let mut tx = self.store.begin().await?;
        let result = conversation_in(&mut *tx, match_id).await;
        finish(tx, result).await
    }

    /// Conversations `user` participates in
    pub async fn conversations_of(&self, user: UserId) -> EngineResult<Vec<Conversation>> {
        validate_id(user, "user")?;

        let mut tx = self.store.begin().await?;
        let result = conversations_in(&mut *tx, user).await;
        finish(tx, result).await
    }

    /// The decision `source` recorded about `target`, if any
    pub async fn decision_of(
        &self,
        source: UserId,
        target: UserId,
    ) -> EngineResult<Option<Interaction>> {
        validate_pair(source, target, "source", "target")?;

        let mut tx = self.store.begin().await?;
        let result = decision_of(&mut *tx, source, target).await;
        finish(tx, result).await
    }

    pub async fn is_blocked_either_way(&self, x: UserId, y: UserId) -> EngineResult<bool> {
        validate_pair(x, y, "user", "other user")?;

        let mut tx = self.store.begin().await?;
        let result = is_blocked_either_way(&mut *tx, x, y).await;
        finish(tx, result).await
    }

    /// Blocks created by `blocker`
    pub async fn blocks_of(&self, blocker: UserId) -> EngineResult<Vec<Block>> {
        validate_id(blocker, "blocker")?;

        let mut tx = self.store.begin().await?;
        let result = blocks_in(&mut *tx, blocker).await;
        finish(tx, result).await
    }

    pub async fn health_check(&self) -> EngineResult<bool> {
        Ok(self.store.health_check().await?)
    }
}

async fn ensure_not_blocked(tx: &mut dyn StoreTx, x: UserId, y: UserId) -> EngineResult<()> {
    if is_blocked_either_way(tx, x, y).await? {
        return Err(EngineError::Forbidden(format!(
            "users {} and {} have a block between them",
            x, y
        )));
    }
    Ok(())
}

async fn find_match(tx: &mut dyn StoreTx, match_id: MatchId) -> EngineResult<Match> {
    tx.find_match(match_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("match {} does not exist", match_id)))
}

async fn matches_in(tx: &mut dyn StoreTx, user: UserId) -> EngineResult<Vec<Match>> {
    require_user(tx, user, "requested").await?;
    Ok(tx.matches_of(user).await?)
}

async fn conversation_in(tx: &mut dyn StoreTx, match_id: MatchId) -> EngineResult<Conversation> {
    find_match(tx, match_id).await?;
    tx.find_conversation_by_match(match_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("match {} has no conversation", match_id)))
}

async fn conversations_in(tx: &mut dyn StoreTx, user: UserId) -> EngineResult<Vec<Conversation>> {
    require_user(tx, user, "requested").await?;
    Ok(tx.conversations_of(user).await?)
}

async fn blocks_in(tx: &mut dyn StoreTx, blocker: UserId) -> EngineResult<Vec<Block>> {
    require_user(tx, blocker, "blocker").await?;
    Ok(tx.blocks_by_blocker(blocker).await?)
}

/// Commit on success, roll back on failure
async fn finish<T>(tx: Box<dyn StoreTx>, result: EngineResult<T>) -> EngineResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback after '{}' failed: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
