//! The failure taxonomy of a unary call.

use std::{convert::Infallible, time::Duration};
use tonic::{Code, Status};

/// The address handed to [`ChannelManager::acquire`](crate::ChannelManager::acquire)
/// could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid endpoint {input:?}: {reason}")]
pub struct InvalidEndpoint {
    input: String,
    reason: String,
}

impl InvalidEndpoint {
    pub(crate) fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// The rejected address.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Why the address was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

// Lets an already parsed `Endpoint` go through the same `TryInto` bound.
impl From<Infallible> for InvalidEndpoint {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A service or method name that cannot form a gRPC path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid method id {input:?}: {reason}")]
pub struct InvalidMethodId {
    input: String,
    reason: String,
}

impl InvalidMethodId {
    pub(crate) fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// The rejected service/method pair, joined by `/`.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Why a unary call did not produce a response.
///
/// Exactly one of a decoded response or a `CallFailure` is produced per call.
#[derive(Debug, thiserror::Error)]
pub enum CallFailure {
    /// The proxy or the remote could not be reached, or refused the connection.
    #[error("target unavailable: {0}")]
    Unavailable(String),
    /// No terminal event arrived within the deadline. Carries the local budget
    /// when it is known, a remote `DEADLINE_EXCEEDED` status does not say.
    #[error("no response before the deadline{}", budget(.0))]
    DeadlineExceeded(Option<Duration>),
    /// The remote answered with a non-OK gRPC status.
    #[error("service returned {code:?}: {message}")]
    ServiceError { code: Code, message: String },
    /// The request could not be encoded or the response could not be decoded.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

fn budget(deadline: &Option<Duration>) -> String {
    deadline
        .map(|deadline| format!(" of {:?}", deadline))
        .unwrap_or_default()
}

impl From<Status> for CallFailure {
    fn from(status: Status) -> Self {
        // Statuses decoded from the wire never carry a source, so one with a
        // source was produced locally by the transport.
        let local_source = std::error::Error::source(&status).map(|source| source.to_string());

        match (status.code(), local_source) {
            (Code::DeadlineExceeded, _) => CallFailure::DeadlineExceeded(None),
            (Code::Unavailable, None) => CallFailure::Unavailable(status.message().to_string()),
            (_, Some(source)) => {
                CallFailure::Unavailable(format!("{}: {}", status.message(), source))
            }
            (code, None) => CallFailure::ServiceError {
                code,
                message: status.message().to_string(),
            },
        }
    }
}

/// Every error surfaced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidEndpoint(#[from] InvalidEndpoint),
    #[error(transparent)]
    InvalidMethodId(#[from] InvalidMethodId),
    #[error(transparent)]
    Call(#[from] CallFailure),
}

/// The kind of an [`Error`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidEndpoint,
    InvalidMethodId,
    Unavailable,
    DeadlineExceeded,
    ServiceError,
    SerializationError,
}

impl FailureKind {
    /// Whether the caller can reasonably try again, after fixing its input or
    /// backing off. Serialization failures are contract violations and a
    /// service error depends on its payload, so neither is.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            FailureKind::InvalidEndpoint
                | FailureKind::InvalidMethodId
                | FailureKind::Unavailable
                | FailureKind::DeadlineExceeded
        )
    }
}

impl CallFailure {
    /// The kind of this failure, for callers that branch on it without the payload.
    pub fn kind(&self) -> FailureKind {
        match self {
            CallFailure::Unavailable(_) => FailureKind::Unavailable,
            CallFailure::DeadlineExceeded(_) => FailureKind::DeadlineExceeded,
            CallFailure::ServiceError { .. } => FailureKind::ServiceError,
            CallFailure::SerializationError(_) => FailureKind::SerializationError,
        }
    }
}

impl Error {
    /// The kind of this error. Input errors report their own kind, call
    /// failures report [`CallFailure::kind`].
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidEndpoint(_) => FailureKind::InvalidEndpoint,
            Error::InvalidMethodId(_) => FailureKind::InvalidMethodId,
            Error::Call(failure) => failure.kind(),
        }
    }

    /// Shorthand for [`FailureKind::is_recoverable`] on [`Error::kind`].
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }
}
