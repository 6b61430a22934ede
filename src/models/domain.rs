use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned identifiers. Valid ids are strictly positive.
pub type UserId = i64;
pub type InteractionId = i64;
pub type BlockId = i64;
pub type MatchId = i64;
pub type ConversationId = i64;
pub type MessageId = i64;

/// A user as far as the engine cares: an id and a name used for conversation titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// The decision a user records about another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Pass,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Pass => "pass",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One directed decision. At most one exists per ordered (source, target) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    #[serde(rename = "sourceUserId")]
    pub source_user: UserId,
    #[serde(rename = "targetUserId")]
    pub target_user: UserId,
    pub kind: InteractionKind,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Directed block. At most one exists per ordered (blocker, blocked) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "blockerId")]
    pub blocker: UserId,
    #[serde(rename = "blockedId")]
    pub blocked: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Mutual like between two users. The pair is unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "userA")]
    pub user_a: UserId,
    #[serde(rename = "userB")]
    pub user_b: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Whether this match is between exactly `x` and `y`, in either order
    pub fn is_between(&self, x: UserId, y: UserId) -> bool {
        canonical_pair(self.user_a, self.user_b) == canonical_pair(x, y)
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.user_a == user || self.user_b == user
    }
}

/// Chat channel owned by a match. Always has exactly the match's two users as participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(rename = "matchId")]
    pub match_id: MatchId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub participants: [UserId; 2],
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participants(&self, x: UserId, y: UserId) -> bool {
        canonical_pair(self.participants[0], self.participants[1]) == canonical_pair(x, y)
    }
}

/// Message inside a conversation. Only tracked so deleting a conversation can cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "conversationId")]
    pub conversation_id: ConversationId,
    #[serde(rename = "senderId")]
    pub sender: UserId,
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Order two ids so that an unordered pair has a single representation
#[inline]
pub fn canonical_pair(x: UserId, y: UserId) -> (UserId, UserId) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Conversation title derived from both users' display names
pub fn conversation_display_name(a: &User, b: &User) -> String {
    format!("{} & {}", a.display_name, b.display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(a: UserId, b: UserId) -> Match {
        Match {
            id: 1,
            user_a: a,
            user_b: b,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_canonical_pair_orders_ids() {
        assert_eq!(canonical_pair(7, 3), (3, 7));
        assert_eq!(canonical_pair(3, 7), (3, 7));
        assert_eq!(canonical_pair(4, 4), (4, 4));
    }

    #[test]
    fn test_match_is_unordered() {
        let m = sample_match(2, 9);
        assert!(m.is_between(2, 9));
        assert!(m.is_between(9, 2));
        assert!(!m.is_between(2, 3));
        assert!(m.involves(9));
        assert!(!m.involves(5));
    }

    #[test]
    fn test_conversation_display_name() {
        let a = User { id: 1, display_name: "Alex".to_string() };
        let b = User { id: 2, display_name: "Sam".to_string() };
        assert_eq!(conversation_display_name(&a, &b), "Alex & Sam");
    }

    #[test]
    fn test_interaction_kind_serializes_lowercase() {
        let json = serde_json::to_string(&InteractionKind::Like).unwrap();
        assert_eq!(json, "\"like\"");
        assert_eq!(InteractionKind::Pass.to_string(), "pass");
    }
}
