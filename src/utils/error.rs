//! The `error` module defines the error types used within `nsqmsg`.
//!
//! [`MessageError`] covers contract violations on a single message: they
//! signal a bug in the caller and are never retried. [`Error`] is the
//! crate-level error that also carries ambient failures such as
//! configuration loading.

use thiserror::Error;

/// Contract violations reported by [`Message`](crate::message::Message).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// `finish`, `requeue` or `touch` called after the message was resolved.
    #[error("message {id} has already been responded to")]
    AlreadyResponded { id: String },

    /// `is_alive` queried on a message whose timeout was never armed.
    #[error("message {id} has no client-side timeout; set msg_timeout to enable it")]
    TimeoutNotArmed { id: String },
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Message(#[from] MessageError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;
