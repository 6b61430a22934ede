use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{
    canonical_pair, Block, BlockId, Conversation, ConversationId, Interaction, InteractionId,
    InteractionKind, Match, MatchId, Message, User, UserId,
};
use crate::services::store::{
    BlockRepository, ConversationRepository, InteractionRepository, MatchRepository,
    MessageRepository, Store, StoreError, StoreResult, StoreTx, UserRepository,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<UserId, User>,
    interactions: BTreeMap<InteractionId, Interaction>,
    blocks: BTreeMap<BlockId, Block>,
    matches: BTreeMap<MatchId, Match>,
    conversations: BTreeMap<ConversationId, Conversation>,
    messages: BTreeMap<i64, Message>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-process store
///
/// A transaction holds the store-wide lock from `begin` until commit or rollback and works on
/// a private copy of the state, so transactions are fully serialized and a rollback simply
/// discards the copy. Intended for tests, benchmarks and local development.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one user per name, with ids assigned in order from 1
    pub async fn with_users<S: AsRef<str>>(names: &[S]) -> Self {
        let store = Self::new();
        for name in names {
            store.seed_user(name.as_ref()).await;
        }
        store
    }

    /// Create a user outside of any engine call
    pub async fn seed_user(&self, display_name: &str) -> User {
        let mut state = self.state.lock().await;
        let user = User {
            id: state.next_id(),
            display_name: display_name.to_string(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Number of interactions recorded for the ordered pair
    pub async fn interaction_count(&self, source: UserId, target: UserId) -> usize {
        let state = self.state.lock().await;
        state
            .interactions
            .values()
            .filter(|i| i.source_user == source && i.target_user == target)
            .count()
    }

    /// Number of matches stored for the unordered pair
    pub async fn match_count(&self, x: UserId, y: UserId) -> usize {
        let state = self.state.lock().await;
        state.matches.values().filter(|m| m.is_between(x, y)).count()
    }

    pub async fn conversation_count(&self) -> usize {
        self.state.lock().await.conversations.len()
    }

    pub async fn message_count(&self) -> usize {
        self.state.lock().await.messages.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = MemoryState::clone(&guard);
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

/// Open transaction on a [`MemoryStore`]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_pair(&mut self, _x: UserId, _y: UserId) -> StoreResult<()> {
        // The store-wide lock taken in `begin` already covers every pair
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryTx {
    async fn insert_user(&mut self, display_name: &str) -> StoreResult<User> {
        let user = User {
            id: self.working.next_id(),
            display_name: display_name.to_string(),
        };
        self.working.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }
}

#[async_trait]
impl InteractionRepository for MemoryTx {
    async fn insert_interaction(
        &mut self,
        source: UserId,
        target: UserId,
        kind: InteractionKind,
    ) -> StoreResult<Interaction> {
        if self.find_interaction(source, target).await?.is_some() {
            return Err(StoreError::UniqueViolation(format!(
                "interactions_source_target_key ({}, {})",
                source, target
            )));
        }

        let interaction = Interaction {
            id: self.working.next_id(),
            source_user: source,
            target_user: target,
            kind,
            created_at: Utc::now(),
        };
        self.working.interactions.insert(interaction.id, interaction.clone());
        Ok(interaction)
    }

    async fn find_interaction(
        &mut self,
        source: UserId,
        target: UserId,
    ) -> StoreResult<Option<Interaction>> {
        Ok(self
            .working
            .interactions
            .values()
            .find(|i| i.source_user == source && i.target_user == target)
            .cloned())
    }

    async fn interactions_by_source(&mut self, source: UserId) -> StoreResult<Vec<Interaction>> {
        Ok(self
            .working
            .interactions
            .values()
            .filter(|i| i.source_user == source)
            .cloned()
            .collect())
    }

    async fn interactions_by_target(&mut self, target: UserId) -> StoreResult<Vec<Interaction>> {
        Ok(self
            .working
            .interactions
            .values()
            .filter(|i| i.target_user == target)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BlockRepository for MemoryTx {
    async fn insert_block(&mut self, blocker: UserId, blocked: UserId) -> StoreResult<Block> {
        if self.find_block(blocker, blocked).await?.is_some() {
            return Err(StoreError::UniqueViolation(format!(
                "blocks_blocker_blocked_key ({}, {})",
                blocker, blocked
            )));
        }

        let block = Block {
            id: self.working.next_id(),
            blocker,
            blocked,
            created_at: Utc::now(),
        };
        self.working.blocks.insert(block.id, block.clone());
        Ok(block)
    }

    async fn find_block(&mut self, blocker: UserId, blocked: UserId) -> StoreResult<Option<Block>> {
        Ok(self
            .working
            .blocks
            .values()
            .find(|b| b.blocker == blocker && b.blocked == blocked)
            .cloned())
    }

    async fn delete_block(&mut self, id: BlockId) -> StoreResult<bool> {
        Ok(self.working.blocks.remove(&id).is_some())
    }

    async fn blocks_by_blocker(&mut self, blocker: UserId) -> StoreResult<Vec<Block>> {
        Ok(self
            .working
            .blocks
            .values()
            .filter(|b| b.blocker == blocker)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MatchRepository for MemoryTx {
    async fn insert_match(&mut self, user_a: UserId, user_b: UserId) -> StoreResult<Match> {
        if self.find_match_by_pair(user_a, user_b).await?.is_some() {
            let (low, high) = canonical_pair(user_a, user_b);
            return Err(StoreError::UniqueViolation(format!(
                "matches_pair_key ({}, {})",
                low, high
            )));
        }

        let record = Match {
            id: self.working.next_id(),
            user_a,
            user_b,
            created_at: Utc::now(),
        };
        self.working.matches.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_match(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.working.matches.get(&id).cloned())
    }

    async fn find_match_by_pair(&mut self, x: UserId, y: UserId) -> StoreResult<Option<Match>> {
        Ok(self
            .working
            .matches
            .values()
            .find(|m| m.is_between(x, y))
            .cloned())
    }

    async fn matches_of(&mut self, user: UserId) -> StoreResult<Vec<Match>> {
        Ok(self
            .working
            .matches
            .values()
            .filter(|m| m.involves(user))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConversationRepository for MemoryTx {
    async fn insert_conversation(
        &mut self,
        match_id: MatchId,
        display_name: &str,
        participants: [UserId; 2],
    ) -> StoreResult<Conversation> {
        if self.find_conversation_by_match(match_id).await?.is_some() {
            return Err(StoreError::UniqueViolation(format!(
                "conversations_match_id_key ({})",
                match_id
            )));
        }

        let conversation = Conversation {
            id: self.working.next_id(),
            match_id,
            display_name: display_name.to_string(),
            participants,
            created_at: Utc::now(),
        };
        self.working
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn find_conversation(&mut self, id: ConversationId) -> StoreResult<Option<Conversation>> {
        Ok(self.working.conversations.get(&id).cloned())
    }

    async fn find_conversation_by_match(
        &mut self,
        match_id: MatchId,
    ) -> StoreResult<Option<Conversation>> {
        Ok(self
            .working
            .conversations
            .values()
            .find(|c| c.match_id == match_id)
            .cloned())
    }

    async fn find_conversation_by_participants(
        &mut self,
        x: UserId,
        y: UserId,
    ) -> StoreResult<Option<Conversation>> {
        Ok(self
            .working
            .conversations
            .values()
            .find(|c| c.has_participants(x, y))
            .cloned())
    }

    async fn conversations_of(&mut self, user: UserId) -> StoreResult<Vec<Conversation>> {
        Ok(self
            .working
            .conversations
            .values()
            .filter(|c| c.participants.contains(&user))
            .cloned()
            .collect())
    }

    async fn delete_conversation(&mut self, id: ConversationId) -> StoreResult<bool> {
        let removed = self.working.conversations.remove(&id).is_some();
        // Mirror ON DELETE CASCADE
        self.working.messages.retain(|_, m| m.conversation_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl MessageRepository for MemoryTx {
    async fn insert_message(
        &mut self,
        conversation_id: ConversationId,
        sender: UserId,
        body: &str,
    ) -> StoreResult<Message> {
        let message = Message {
            id: self.working.next_id(),
            conversation_id,
            sender,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.working.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn count_messages(&mut self, conversation_id: ConversationId) -> StoreResult<u64> {
        Ok(self
            .working
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .count() as u64)
    }

    async fn delete_messages_of(&mut self, conversation_id: ConversationId) -> StoreResult<u64> {
        let before = self.working.messages.len();
        self.working
            .messages
            .retain(|_, m| m.conversation_id != conversation_id);
        Ok((before - self.working.messages.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_users_assigns_ids_in_order() {
        let store = MemoryStore::with_users(&["Alex", "Sam"]).await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_user(1).await.unwrap().unwrap().display_name, "Alex");
        assert_eq!(tx.find_user(2).await.unwrap().unwrap().display_name, "Sam");
        assert!(tx.find_user(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let b = store.seed_user("Sam").await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_interaction(a.id, b.id, InteractionKind::Like)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.interaction_count(a.id, b.id).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let b = store.seed_user("Sam").await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_match(a.id, b.id).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.match_count(a.id, b.id).await, 0);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = MemoryStore::new();
        let a = store.seed_user("Alex").await;
        let b = store.seed_user("Sam").await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_block(a.id, b.id).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_block(a.id, b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_uniqueness_is_unordered() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_match(1, 2).await.unwrap();

        let err = tx.insert_match(2, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_interaction_uniqueness_is_ordered() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_interaction(1, 2, InteractionKind::Like).await.unwrap();
        tx.insert_interaction(2, 1, InteractionKind::Pass).await.unwrap();

        let err = tx
            .insert_interaction(1, 2, InteractionKind::Pass)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(tx.interactions_by_target(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_conversation_cascades_messages() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let m = tx.insert_match(1, 2).await.unwrap();
        let c = tx.insert_conversation(m.id, "A & B", [1, 2]).await.unwrap();
        tx.insert_message(c.id, 1, "hi").await.unwrap();
        tx.insert_message(c.id, 2, "hey").await.unwrap();

        assert!(tx.delete_conversation(c.id).await.unwrap());
        assert_eq!(tx.count_messages(c.id).await.unwrap(), 0);
        assert!(tx.find_conversation_by_participants(2, 1).await.unwrap().is_none());
    }
}
