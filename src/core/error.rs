use thiserror::Error;

use crate::models::UserId;
use crate::services::StoreError;

/// Failures surfaced by the matchmaking engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate relationship: {0}")]
    DuplicateRelationship(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            // A constraint hit means a concurrent call won the race
            StoreError::UniqueViolation(constraint) => {
                EngineError::DuplicateRelationship(format!("constraint {} violated", constraint))
            }
            other => EngineError::Storage(other),
        }
    }
}

impl EngineError {
    /// Short machine-readable name, used as the `error` field of API responses
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidArgument(_) => "invalid_argument",
            EngineError::NotFound(_) => "not_found",
            EngineError::DuplicateRelationship(_) => "duplicate_relationship",
            EngineError::Forbidden(_) => "forbidden",
            EngineError::Storage(_) => "storage_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidArgument(_) => 400,
            EngineError::NotFound(_) => 404,
            EngineError::DuplicateRelationship(_) => 409,
            EngineError::Forbidden(_) => 403,
            EngineError::Storage(_) => 500,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Reject missing or non-positive ids
pub fn validate_id(id: i64, field: &str) -> EngineResult<()> {
    if id <= 0 {
        return Err(EngineError::InvalidArgument(format!(
            "{} must be a positive id, got {}",
            field, id
        )));
    }
    Ok(())
}

/// Validate both ids of a directed relationship and reject self-reference
pub fn validate_pair(from: UserId, to: UserId, from_field: &str, to_field: &str) -> EngineResult<()> {
    validate_id(from, from_field)?;
    validate_id(to, to_field)?;
    if from == to {
        return Err(EngineError::InvalidArgument(format!(
            "{} and {} must differ (both {})",
            from_field, to_field, from
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let err = EngineError::from(StoreError::UniqueViolation("matches_pair_key".into()));
        assert!(matches!(err, EngineError::DuplicateRelationship(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_validate_pair() {
        assert!(validate_pair(1, 2, "source", "target").is_ok());
        assert!(matches!(
            validate_pair(3, 3, "source", "target"),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_pair(0, 3, "source", "target"),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_pair(4, -1, "source", "target"),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_status_codes_are_distinct_for_blocked_and_duplicate() {
        let blocked = EngineError::Forbidden("blocked".into());
        let dup = EngineError::DuplicateRelationship("decided".into());
        assert_ne!(blocked.status_code(), dup.status_code());
        assert_eq!(blocked.kind(), "forbidden");
    }
}
