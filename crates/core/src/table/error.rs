use thiserror::Error;

/// Failure reported by a remote table service call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service asked the caller to slow down; the call may be retried.
    #[error("Request throttled: {0}")]
    Throttled(String),
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    /// Only throttling is retried; everything else is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

/// Result type for remote table service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_throttling_is_retryable() {
        assert!(ServiceError::Throttled("slow down".to_string()).is_retryable());
        assert!(!ServiceError::Failed("access denied".to_string()).is_retryable());
    }

    #[test]
    fn test_service_error_display() {
        assert_eq!(
            ServiceError::Throttled("ProvisionedThroughputExceededException".to_string())
                .to_string(),
            "Request throttled: ProvisionedThroughputExceededException"
        );
        assert_eq!(
            ServiceError::Failed("AccessDeniedException".to_string()).to_string(),
            "AccessDeniedException"
        );
    }
}
