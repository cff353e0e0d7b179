//! Status/error channel - maps `(status, payload)` to a typed outcome
//!
//! The raw status answers "did it fail", the `CallStatus` kind answers
//! "why". Both are folded into one sum type so callers never compare
//! integers against magic constants.

use crate::proto::{self, CallStatus};
use thiserror::Error;
use tracing::warn;

/// Result alias for boundary calls
pub type CallResult<T> = Result<T, CallError>;

/// Failures surfaced by the call adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Native side could not decode the request. Host and native codecs
    /// are out of sync; retrying will not help.
    #[error("native side failed to decode the request (status {code})")]
    DecodeFailure { code: i32 },

    /// Caller-supplied data was rejected.
    #[error("{}", validation_message(.details))]
    ValidationFailure { details: Option<String> },

    /// An enumerated field held a value outside its declared domain.
    #[error("unknown enum value")]
    EnumDomainFailure,

    /// A required field was absent.
    #[error("a required field is not present")]
    MissingRequiredField,

    /// Status not mapped by this host, or an internal native failure.
    #[error("unknown error occurred, code: {code}, details: {details}")]
    UnknownFailure { code: i32, details: String },

    /// Status was zero but the payload is not the expected message.
    #[error("malformed response payload: {0}")]
    MalformedResponse(String),

    /// The instance handle was already released.
    #[error("{0} instance has already been released")]
    Released(&'static str),

    /// Constructor reported success without producing a handle.
    #[error("{0} constructor returned a null handle")]
    NullHandle(&'static str),
}

/// Fieldless classification of a `CallError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Decode,
    Validation,
    EnumDomain,
    MissingRequiredField,
    Unknown,
    MalformedResponse,
    Released,
    NullHandle,
}

impl CallError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::DecodeFailure { .. } => FailureKind::Decode,
            Self::ValidationFailure { .. } => FailureKind::Validation,
            Self::EnumDomainFailure => FailureKind::EnumDomain,
            Self::MissingRequiredField => FailureKind::MissingRequiredField,
            Self::UnknownFailure { .. } => FailureKind::Unknown,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::Released(_) => FailureKind::Released,
            Self::NullHandle(_) => FailureKind::NullHandle,
        }
    }

    /// True when the failure is the caller's fault (bad input or misuse of
    /// a handle); false when it points at the native library or a codec skew.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::Validation
                | FailureKind::EnumDomain
                | FailureKind::MissingRequiredField
                | FailureKind::Released
        )
    }

    /// Details string carried by the failure, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::ValidationFailure { details } => details.as_deref(),
            Self::UnknownFailure { details, .. } if !details.is_empty() => Some(details.as_str()),
            Self::MalformedResponse(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// One-shot outcome of a boundary call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(Vec<u8>),
    Failure(CallError),
}

impl CallOutcome {
    /// Classify a raw status and the (already copied) output payload.
    ///
    /// Negative statuses never look at the payload. Positive statuses decode
    /// an `Error` record only when the payload is non-empty.
    pub fn from_status(status: i32, payload: Vec<u8>) -> Self {
        if status == 0 {
            return Self::Success(payload);
        }
        if status < 0 {
            return Self::Failure(CallError::DecodeFailure { code: status });
        }

        let details = error_details(status, &payload);
        let error = match CallStatus::try_from(status) {
            Ok(CallStatus::InvalidArguments) => CallError::ValidationFailure { details: None },
            Ok(CallStatus::InvalidArgumentsDetails) => CallError::ValidationFailure { details },
            Ok(CallStatus::UnknownEnumValue) => CallError::EnumDomainFailure,
            Ok(CallStatus::EmptyParams) => CallError::MissingRequiredField,
            _ => CallError::UnknownFailure {
                code: status,
                details: details.unwrap_or_default(),
            },
        };
        Self::Failure(error)
    }

    pub fn into_result(self) -> CallResult<Vec<u8>> {
        match self {
            Self::Success(bytes) => Ok(bytes),
            Self::Failure(err) => Err(err),
        }
    }
}

fn validation_message(details: &Option<String>) -> String {
    match details {
        Some(d) => format!("invalid arguments: {}", d),
        None => "invalid arguments".to_string(),
    }
}

fn error_details(status: i32, payload: &[u8]) -> Option<String> {
    if payload.is_empty() {
        return None;
    }
    match proto::decode::<proto::Error>(payload) {
        Ok(record) => Some(record.details),
        Err(err) => {
            warn!(
                event = "error_payload_undecodable",
                status,
                error = %err,
                "Dropping undecodable error record"
            );
            None
        }
    }
}
