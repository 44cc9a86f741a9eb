//! Error taxonomy and the causally-chained engine error.
//!
//! Every failure produced by this crate is an [`EngineError`]. Each error carries
//! an [`ErrorKind`] that tells a retry executor whether reissuing the operation
//! can succeed, plus an optional cause that may itself be an `EngineError` or any
//! foreign error coming from the transport layer.
//!
//! ## Error Kinds
//!
//! | Code               | Meaning                                        | Auto-retry |
//! |--------------------|------------------------------------------------|------------|
//! | `access_denied`    | Credentials were rejected                      | no         |
//! | `not_ovirt_engine` | The endpoint did not answer like an engine     | no         |
//! | `tls_error`        | CA certificate did not match the server        | no         |
//! | `not_found`        | The requested resource does not exist          | no         |
//! | `bug`              | Should never happen, please report             | no         |
//! | `connection`       | Connection problem                             | yes        |
//! | `pending`          | Still waiting for an action to complete        | yes        |
//! | `timeout`          | Timed out waiting for an action                | yes        |
//! | `field_missing`    | The API did not return an expected field       | no         |
//! | `bad_argument`     | An input parameter was incorrect               | yes        |
//! | `file_read_failed` | Reading a local file failed                    | yes        |
//! | `unsupported`      | Action or parameter combination not supported  | no         |
//! | `generic_error`    | Not identified (yet)                           | yes        |

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use crate::classify;

/// Boxed foreign error that can travel between threads.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Closed set of error classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The provided credentials were incorrect.
    AccessDenied,
    /// The server did not respond with a proper engine response.
    #[serde(rename = "not_ovirt_engine")]
    NotAnEngine,
    /// The CA certificate did not match the server.
    #[serde(rename = "tls_error")]
    Tls,
    /// The requested resource was not found.
    NotFound,
    /// An error that should never happen.
    Bug,
    /// A problem with the connection.
    Connection,
    /// Still waiting for an action to be completed.
    Pending,
    /// Timed out waiting for an action to be completed.
    Timeout,
    /// The API did not return a specific field.
    FieldMissing,
    /// An input parameter was incorrect.
    BadArgument,
    /// Reading a local file failed.
    FileReadFailed,
    /// The action or parameter combination is not supported.
    Unsupported,
    /// Not identified. Wrapping with this kind triggers identification of the cause.
    #[serde(rename = "generic_error")]
    Unidentified,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::AccessDenied,
        ErrorKind::NotAnEngine,
        ErrorKind::Tls,
        ErrorKind::NotFound,
        ErrorKind::Bug,
        ErrorKind::Connection,
        ErrorKind::Pending,
        ErrorKind::Timeout,
        ErrorKind::FieldMissing,
        ErrorKind::BadArgument,
        ErrorKind::FileReadFailed,
        ErrorKind::Unsupported,
        ErrorKind::Unidentified,
    ];

    /// Get the stable code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::NotAnEngine => "not_ovirt_engine",
            ErrorKind::Tls => "tls_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Bug => "bug",
            ErrorKind::Connection => "connection",
            ErrorKind::Pending => "pending",
            ErrorKind::Timeout => "timeout",
            ErrorKind::FieldMissing => "field_missing",
            ErrorKind::BadArgument => "bad_argument",
            ErrorKind::FileReadFailed => "file_read_failed",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Unidentified => "generic_error",
        }
    }

    /// Returns false if the condition is permanent and an automatic retry
    /// must not be attempted.
    pub fn can_auto_retry(&self) -> bool {
        !matches!(
            self,
            ErrorKind::AccessDenied
                | ErrorKind::NotAnEngine
                | ErrorKind::Tls
                | ErrorKind::NotFound
                | ErrorKind::Bug
                | ErrorKind::Unsupported
                | ErrorKind::FieldMissing
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EngineError::bad_argument(format!("unknown error code: {}", s)))
    }
}

/// Error received while interacting with the engine (or its mock).
#[derive(Debug)]
pub struct EngineError {
    message: String,
    kind: ErrorKind,
    cause: Option<BoxError>,
}

impl EngineError {
    /// Create a leaf error without a cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            cause: None,
        }
    }

    /// Wrap an existing error, adding a kind and message.
    ///
    /// The cause is appended to the message. When `kind` is
    /// [`ErrorKind::Unidentified`] the kind is taken from the first engine error
    /// in the cause chain that has a specific kind; failing that, the cause is
    /// run through the classifier. Only when both fail does the result stay
    /// unidentified.
    pub fn wrap(err: impl Into<BoxError>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut cause: BoxError = err.into();
        let mut kind = kind;

        if kind == ErrorKind::Unidentified {
            if let Some(inherited) = inherited_kind(&*cause) {
                kind = inherited;
            } else {
                match classify::classify(cause) {
                    Ok(identified) => {
                        kind = identified.kind();
                        cause = Box::new(identified);
                    }
                    Err(original) => cause = original,
                }
            }
        }

        Self {
            message: format!("{} ({})", message.into(), cause),
            kind,
            cause: Some(cause),
        }
    }

    /// A required parent or the requested resource does not exist.
    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("{} with ID {} not found", resource, id))
    }

    /// A parameter failed validation.
    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadArgument, message)
    }

    /// An internal invariant was broken.
    pub fn bug(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Bug, message)
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The `"kind: message"` form used in logs.
    pub fn code_string(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns true if this error, or any engine error directly below it in the
    /// cause chain, has `kind`. A foreign cause ends the search.
    pub fn has_code(&self, kind: ErrorKind) -> bool {
        if self.kind == kind {
            return true;
        }
        self.cause
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<EngineError>())
            .map_or(false, |cause| cause.has_code(kind))
    }

    /// Returns false if an automatic retry should not be attempted.
    pub fn can_auto_retry(&self) -> bool {
        self.kind.can_auto_retry()
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// First specific kind carried by an engine error anywhere in the chain.
fn inherited_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(engine) = err.downcast_ref::<EngineError>() {
            if engine.kind != ErrorKind::Unidentified {
                return Some(engine.kind);
            }
        }
        current = err.source();
    }
    None
}
