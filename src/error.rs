//! Crate error type.
//!
//! Every failure is single-shot: the triggering operation is aborted and the
//! cause is returned verbatim. Nothing is retried locally.

use crate::common::expression;

use aws_sdk_dynamodb::error as sdk_error;

/// Errors raised while building or issuing a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value could not be converted to or from the DynamoDB attribute format.
    #[error(transparent)]
    Marshal(#[from] serde_dynamo::Error),
    /// An expression could not be rewritten.
    #[error(transparent)]
    Expression(#[from] expression::ExpressionError),
    /// The SDK rejected the request shape before sending it.
    #[error(transparent)]
    Build(#[from] sdk_error::BuildError),
    /// The service call failed.
    #[error(transparent)]
    Service(#[from] aws_sdk_dynamodb::Error),
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
