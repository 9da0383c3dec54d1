//! The `conn` module defines what a message needs from the connection that
//! delivered it, and provides [`Conn`], an in-process connection that turns
//! message dispositions into broker commands.
//!
//! Socket I/O and frame encoding stay outside this crate: `Conn` pushes
//! [`Command`]s onto a channel and whoever owns the socket writes them out.

pub mod command;
pub mod local;

use std::sync::Arc;
use std::time::Duration;

use crate::message::Message;
use crate::timer::Scheduler;

pub use command::{BackoffSignal, Command};
pub use local::Conn;

/// The owning side of a delivered message.
///
/// Messages hold connections weakly and only use them to run their
/// client-side timeout.
pub trait Connection: Send + Sync {
    /// How long a message may be processed before `message_timeout` fires.
    fn msg_timeout(&self) -> Duration;

    /// Scheduler the message timeout runs on. `schedule_periodic` must not
    /// invoke the callback before returning.
    fn scheduler(&self) -> &dyn Scheduler;

    /// Notifies the connection that `message` reached its timeout.
    fn trigger_message_timeout(&self, message: &Arc<Message>);
}
