//! Consumer hand-off
//!
//! What the consumer loop does with a message once the application handler
//! returns: respond on the handler's behalf, unless the handler switched the
//! message to async mode or already responded itself.

use std::sync::Arc;

use tracing::trace;

use crate::message::{Message, RequeueOptions};
use crate::utils::error::MessageError;

/// What [`respond`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Finished,
    Requeued,
    /// Async mode: the application responds later.
    Deferred,
    /// The handler already finished or requeued the message.
    AlreadyResponded,
}

/// Responds to `message` after its handler returned `success`.
///
/// Successful messages are finished, failed ones requeued with default
/// options (backoff applies, delay derived from attempts).
pub fn respond(message: &Message, success: bool) -> Result<Disposition, MessageError> {
    if message.is_async() {
        trace!(id = %message.id(), "async message, leaving response to the handler");
        return Ok(Disposition::Deferred);
    }
    if message.has_responded() {
        return Ok(Disposition::AlreadyResponded);
    }

    if success {
        message.finish()?;
        Ok(Disposition::Finished)
    } else {
        message.requeue(RequeueOptions::default())?;
        Ok(Disposition::Requeued)
    }
}

/// Runs `handler` on `message` and responds according to its result.
pub fn dispatch<F>(message: &Arc<Message>, handler: F) -> Result<Disposition, MessageError>
where
    F: FnOnce(&Arc<Message>) -> bool,
{
    let success = handler(message);
    respond(message, success)
}

#[cfg(test)]
mod tests;
