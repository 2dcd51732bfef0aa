//! Error types for the AWS provider.

use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::resource::ResourceKind;

/// Errors raised by the AWS provider.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AwsProviderError {
    /// Raised when the high-level configuration fails validation.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when an AWS API call fails.
    #[error("{operation} failed: {message}")]
    Api {
        /// API operation that failed, for example `DescribeSnapshots`.
        operation: &'static str,
        /// Error code reported by the service, when one was present.
        code: Option<String>,
        /// Message reported by the service or the transport.
        message: String,
    },
    /// Raised when a request cannot be assembled before being sent.
    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        /// API operation whose input was rejected.
        operation: &'static str,
        /// Builder error message.
        message: String,
    },
    /// Raised when a lifecycle policy is created without an execution role.
    #[error("no lifecycle policy execution role configured: set SNAPKEEP_DLM_ROLE_ARN")]
    MissingPolicyRole,
    /// Raised when a resource kind does not support a mutating verb.
    #[error("{kind} does not support {verb}")]
    Unsupported {
        /// Kind the verb was attempted on.
        kind: ResourceKind,
        /// The unsupported verb.
        verb: &'static str,
    },
}

impl AwsProviderError {
    /// Wraps an SDK error, capturing the service error code when present.
    pub(super) fn api<E>(operation: &'static str, err: &SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        Self::Api {
            operation,
            code: err.code().map(str::to_owned),
            message: err
                .message()
                .map_or_else(|| err.to_string(), str::to_owned),
        }
    }

    /// Wraps an input builder failure.
    pub(super) fn invalid(
        operation: &'static str,
        err: &aws_sdk_dlm::error::BuildError,
    ) -> Self {
        Self::InvalidRequest {
            operation,
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for AwsProviderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
