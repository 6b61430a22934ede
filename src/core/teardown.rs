use crate::core::error::EngineResult;
use crate::models::{ConversationId, UserId};
use crate::services::StoreTx;

/// Delete the conversation between `x` and `y` and its messages, if there is one
///
/// Returns the id of the deleted conversation. No conversation is not an error.
pub async fn sever_conversation(
    tx: &mut dyn StoreTx,
    x: UserId,
    y: UserId,
) -> EngineResult<Option<ConversationId>> {
    let Some(conversation) = tx.find_conversation_by_participants(x, y).await? else {
        tracing::debug!("No conversation between {} and {} to sever", x, y);
        return Ok(None);
    };

    let messages = tx.delete_messages_of(conversation.id).await?;
    tx.delete_conversation(conversation.id).await?;

    tracing::info!(
        "Severed conversation {} between {} and {} ({} messages removed)",
        conversation.id,
        x,
        y,
        messages
    );

    Ok(Some(conversation.id))
}
