//! Message lifecycle
//!
//! A [`Message`] is one delivered, not yet resolved unit of work. It carries
//! the broker-assigned identity and payload, guards the at-most-once response
//! rule, and optionally runs a client-side timeout that tells the owning
//! connection when the processing deadline elapsed.
//!
//! Notes:
//! - `finish` and `requeue` are terminal; exactly one of them can succeed on
//!   a message, no matter how many threads race on it.
//! - `touch` is not terminal. It re-arms the timeout (when one was armed) and
//!   asks the connection to extend the broker-side deadline.
//! - Listeners subscribe with [`Message::on`] to the
//!   [`FINISH`](crate::event::FINISH), [`REQUEUE`](crate::event::REQUEUE) and
//!   [`TOUCH`](crate::event::TOUCH) events.

pub mod lifecycle;
pub mod requeue;
pub mod state;

pub use lifecycle::Message;
pub use requeue::RequeueOptions;
pub use state::ResponseState;

/// Opaque identifier assigned by the broker.
pub type MessageId = String;
