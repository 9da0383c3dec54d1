//! The `event` module provides the small publish/subscribe primitive used by
//! messages and connections to notify each other.
//!
//! Any entity gains notifications by owning an [`Evented`] and forwarding
//! `on`/`trigger` to it. Handlers receive the triggering instance and a
//! context value; message events use [`Kwargs`] as their context.

pub mod evented;
pub mod kwargs;

pub use evented::{Evented, Handler};
pub use kwargs::Kwargs;

/// Fired on a message after a successful `finish()`.
pub const FINISH: &str = "finish";
/// Fired on a message after a successful `requeue()`.
pub const REQUEUE: &str = "requeue";
/// Fired on a message after `touch()`.
pub const TOUCH: &str = "touch";
/// Fired on a connection when a message's client-side timeout elapses.
pub const MESSAGE_TIMEOUT: &str = "message_timeout";
