use crate::errors::repository::RepositoryError;
use rdkafka::error::KafkaError;
use thiserror::Error;

/// Failure surfaced by a service operation. Business rejections such as a
/// stock shortfall are not errors; they come back as a rejected order.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Repo(#[from] RepositoryError),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Event publish failed: {0}")]
    Kafka(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether repeating the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Repo(RepositoryError::NotFound)
            | ServiceError::Repo(RepositoryError::ForeignKey(_))
            | ServiceError::Repo(RepositoryError::AlreadyExists(_))
            | ServiceError::Validation(_)
            | ServiceError::NotFound(_)
            | ServiceError::Conflict(_) => false,
            ServiceError::Repo(_) | ServiceError::Kafka(_) | ServiceError::Internal(_) => true,
        }
    }
}

impl From<KafkaError> for ServiceError {
    fn from(error: KafkaError) -> Self {
        ServiceError::Kafka(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_and_input_errors_are_permanent() {
        assert!(!ServiceError::NotFound("Order 9 not found".into()).is_transient());
        assert!(!ServiceError::Validation(vec!["quantity".into()]).is_transient());
        assert!(!ServiceError::Repo(RepositoryError::NotFound).is_transient());
    }

    #[test]
    fn infrastructure_errors_are_transient() {
        assert!(ServiceError::Internal("connection reset".into()).is_transient());
        assert!(ServiceError::Kafka("broker down".into()).is_transient());
        assert!(ServiceError::Repo(RepositoryError::LockTimeout("row 3".into())).is_transient());
    }
}
