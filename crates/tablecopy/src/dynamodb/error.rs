//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `ServiceError` from `tablecopy_core::table`.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tablecopy_core::table::ServiceError;

/// Error codes that mean "slow down and retry".
const THROTTLING_CODES: [&str; 4] = [
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "LimitExceededException",
];

/// Map any SDK error to ServiceError.
pub fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    classify(operation, code.as_deref(), &message)
}

/// Decides whether an error with the given code is retryable.
pub fn classify(operation: &str, code: Option<&str>, message: &str) -> ServiceError {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => {
            ServiceError::Throttled(format!("{operation}: {code}: {message}"))
        }
        Some(code) => ServiceError::Failed(format!("{operation} failed: {code}: {message}")),
        None => ServiceError::Failed(format!("{operation} failed: {message}")),
    }
}

/// An invalid request built on this side of the wire.
pub fn invalid_request(operation: &str, reason: impl std::fmt::Display) -> ServiceError {
    ServiceError::Failed(format!("{operation} failed: invalid request: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttling_codes_are_retryable() {
        for code in THROTTLING_CODES {
            let err = classify("PutItem", Some(code), "Rate exceeded");
            assert!(err.is_retryable(), "{code} should be retryable");
        }
    }

    #[test]
    fn test_other_codes_are_fatal() {
        let err = classify(
            "CreateTable",
            Some("ResourceInUseException"),
            "Table already exists: orders-staging",
        );

        assert_eq!(
            err,
            ServiceError::Failed(
                "CreateTable failed: ResourceInUseException: Table already exists: orders-staging"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_errors_without_code_are_fatal() {
        let err = classify("Scan", None, "dispatch failure");

        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Scan failed: dispatch failure");
    }

    #[test]
    fn test_throttled_message_keeps_context() {
        assert_eq!(
            classify(
                "Scan",
                Some("ProvisionedThroughputExceededException"),
                "capacity exceeded"
            ),
            ServiceError::Throttled(
                "Scan: ProvisionedThroughputExceededException: capacity exceeded".to_string()
            )
        );
    }
}
