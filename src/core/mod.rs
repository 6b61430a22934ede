// Core engine exports
pub mod blocks;
pub mod engine;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod reciprocity;
pub mod teardown;
pub mod users;

pub use engine::{LikeOutcome, MatchmakingEngine};
pub use error::{EngineError, EngineResult};
pub use factory::CreatedMatch;
