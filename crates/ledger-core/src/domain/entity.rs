//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.

use thiserror::Error;

/// Core trait for entities that are persisted as individual documents
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    /// Remote or local write failure, carrying the raw backend message
    #[error("{0}")]
    Storage(String),

    #[error("{failed} of {total} writes failed")]
    PartialWrite { failed: usize, total: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn storage(msg: impl Into<String>) -> Self {
        DomainError::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            DomainError::InvalidInput("金額と支払い者のすべてを入力してください。".into()).to_string(),
            "金額と支払い者のすべてを入力してください。"
        );
        assert_eq!(
            DomainError::PartialWrite { failed: 2, total: 5 }.to_string(),
            "2 of 5 writes failed"
        );
    }
}
