//! Common error types for TVLINK

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for TVLINK operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes reported across the native engine boundary.
///
/// These are opaque pass-through values: the coordination core routes them to
/// the status snapshot of the affected output without interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    General,
    InvalidArgument,
    NotFound,
    OutOfMemory,
    Busy,
    PermissionDenied,
    TimedOut,
    Empty,
    EndOfFile,
    EndOfList,
    BeginOfList,
    Overflow,
    NotImplemented,
    Fatal,
    TryAgain,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::General => "general",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::NotFound => "not found",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::Busy => "busy",
            ErrorCode::PermissionDenied => "permission denied",
            ErrorCode::TimedOut => "timed out",
            ErrorCode::Empty => "empty",
            ErrorCode::EndOfFile => "end of file",
            ErrorCode::EndOfList => "end of list",
            ErrorCode::BeginOfList => "begin of list",
            ErrorCode::Overflow => "overflow",
            ErrorCode::NotImplemented => "not implemented",
            ErrorCode::Fatal => "fatal",
            ErrorCode::TryAgain => "try again",
        };
        write!(f, "{}", name)
    }
}

/// Errors surfaced synchronously to callers.
///
/// Caller-misuse conditions (invalid arguments, duplicate registrations, a
/// command issued while a transition is in flight) fail fast at the call
/// site. Native-boundary failures are *not* returned through this type by
/// the coordinator; they travel through the status snapshot instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid caller-supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A structural command is already in flight on this output
    #[error("Busy: {0}")]
    Busy(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error code reported by the native engine
    #[error("Engine error: {0}")]
    Engine(ErrorCode),
}

impl Error {
    /// Engine-code equivalent, for publishing through a status snapshot.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::Busy(_) => ErrorCode::Busy,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::Engine(code) => *code,
        }
    }
}
