//! Lume Match - interaction and matching consistency engine for Lume dating app
//!
//! Turns a stream of like, pass and block signals into a consistent set of matches and
//! conversations: one decision per ordered pair, one match per unordered pair, no interaction
//! across a block, and no match left without its conversation.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CreatedMatch, EngineError, EngineResult, LikeOutcome, MatchmakingEngine};
pub use crate::models::{Block, Conversation, Interaction, InteractionKind, Match, User, UserId};
pub use crate::services::{MemoryStore, PostgresStore, Store, StoreError, StoreTx};
