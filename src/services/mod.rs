// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::MemoryStore;
pub use postgres::{PgInteractionKind, PostgresStore};
pub use store::{
    BlockRepository, ConversationRepository, InteractionRepository, MatchRepository,
    MessageRepository, Store, StoreError, StoreResult, StoreTx, UserRepository,
};
