// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    canonical_pair, conversation_display_name, Block, BlockId, Conversation, ConversationId,
    Interaction, InteractionId, InteractionKind, Match, MatchId, Message, MessageId, User, UserId,
};
pub use requests::{BlockRequest, DecisionRequest};
pub use responses::{
    BlocksResponse, ConversationsResponse, ErrorResponse, HealthResponse, LikeResponse,
    MatchesResponse, PassResponse,
};
