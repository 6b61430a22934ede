//! Storage port consumed by the matchmaking engine.
//!
//! A [`Store`] hands out one [`StoreTx`] per engine call. Every repository method runs inside
//! that transaction, and nothing becomes visible to other callers until [`StoreTx::commit`].
//! Dropping a transaction without committing rolls it back.
//!
//! Adapters must enforce these uniqueness constraints and report violations as
//! [`StoreError::UniqueViolation`]:
//! - one interaction per ordered `(source, target)`
//! - one block per ordered `(blocker, blocked)`
//! - one match per unordered pair
//! - one conversation per match

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Block, BlockId, Conversation, ConversationId, Interaction, InteractionKind, Match, MatchId,
    Message, User, UserId,
};

/// Errors reported by storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository {
    async fn insert_user(&mut self, display_name: &str) -> StoreResult<User>;

    async fn find_user(&mut self, id: UserId) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait InteractionRepository {
    async fn insert_interaction(
        &mut self,
        source: UserId,
        target: UserId,
        kind: InteractionKind,
    ) -> StoreResult<Interaction>;

    async fn find_interaction(
        &mut self,
        source: UserId,
        target: UserId,
    ) -> StoreResult<Option<Interaction>>;

    async fn interactions_by_source(&mut self, source: UserId) -> StoreResult<Vec<Interaction>>;

    async fn interactions_by_target(&mut self, target: UserId) -> StoreResult<Vec<Interaction>>;
}

#[async_trait]
pub trait BlockRepository {
    async fn insert_block(&mut self, blocker: UserId, blocked: UserId) -> StoreResult<Block>;

    /// Exact ordered lookup
    async fn find_block(&mut self, blocker: UserId, blocked: UserId) -> StoreResult<Option<Block>>;

    /// Returns whether a row was deleted
    async fn delete_block(&mut self, id: BlockId) -> StoreResult<bool>;

    async fn blocks_by_blocker(&mut self, blocker: UserId) -> StoreResult<Vec<Block>>;
}

#[async_trait]
pub trait MatchRepository {
    async fn insert_match(&mut self, user_a: UserId, user_b: UserId) -> StoreResult<Match>;

    async fn find_match(&mut self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Lookup by unordered pair
    async fn find_match_by_pair(&mut self, x: UserId, y: UserId) -> StoreResult<Option<Match>>;

    /// Matches involving `user`, oldest first
    async fn matches_of(&mut self, user: UserId) -> StoreResult<Vec<Match>>;
}

#[async_trait]
pub trait ConversationRepository {
    async fn insert_conversation(
        &mut self,
        match_id: MatchId,
        display_name: &str,
        participants: [UserId; 2],
    ) -> StoreResult<Conversation>;

    async fn find_conversation(&mut self, id: ConversationId) -> StoreResult<Option<Conversation>>;

    async fn find_conversation_by_match(
        &mut self,
        match_id: MatchId,
    ) -> StoreResult<Option<Conversation>>;

    /// Conversation whose participant set is exactly `{x, y}`
    async fn find_conversation_by_participants(
        &mut self,
        x: UserId,
        y: UserId,
    ) -> StoreResult<Option<Conversation>>;

    async fn conversations_of(&mut self, user: UserId) -> StoreResult<Vec<Conversation>>;

    /// Returns whether a row was deleted
    async fn delete_conversation(&mut self, id: ConversationId) -> StoreResult<bool>;
}

#[async_trait]
pub trait MessageRepository {
    async fn insert_message(
        &mut self,
        conversation_id: ConversationId,
        sender: UserId,
        body: &str,
    ) -> StoreResult<Message>;

    async fn count_messages(&mut self, conversation_id: ConversationId) -> StoreResult<u64>;

    /// Returns the number of deleted messages
    async fn delete_messages_of(&mut self, conversation_id: ConversationId) -> StoreResult<u64>;
}

/// One open transaction against the store
#[async_trait]
pub trait StoreTx:
    UserRepository
    + InteractionRepository
    + BlockRepository
    + MatchRepository
    + ConversationRepository
    + MessageRepository
    + Send
{
    /// Serialize this transaction against every other transaction touching the unordered
    /// pair `{x, y}` until commit or rollback.
    async fn lock_pair(&mut self, x: UserId, y: UserId) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Transaction factory injected into the engine
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Cheap liveness probe
    async fn health_check(&self) -> StoreResult<bool>;
}
