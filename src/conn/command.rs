use std::fmt;

use crate::message::MessageId;

/// Effect a disposition has on the consumer's backoff state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffSignal {
    /// Processed successfully; backoff pressure goes down.
    Success,
    /// Failed; backoff pressure goes up.
    Failure,
    /// Requeued without penalty; backoff state is left alone.
    Neutral,
}

/// A response the connection owes the broker for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fin {
        id: MessageId,
    },
    Req {
        id: MessageId,
        time_ms: u64,
        backoff: bool,
    },
    Touch {
        id: MessageId,
    },
}

impl Command {
    pub fn id(&self) -> &str {
        match self {
            Command::Fin { id } | Command::Req { id, .. } | Command::Touch { id } => id.as_str(),
        }
    }

    /// Backoff effect of this command; `None` for `TOUCH`, which is not a
    /// disposition.
    pub fn backoff_signal(&self) -> Option<BackoffSignal> {
        match self {
            Command::Fin { .. } => Some(BackoffSignal::Success),
            Command::Req { backoff: true, .. } => Some(BackoffSignal::Failure),
            Command::Req { backoff: false, .. } => Some(BackoffSignal::Neutral),
            Command::Touch { .. } => None,
        }
    }

    /// Whether the command resolves the message on the broker.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Command::Touch { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Fin { id } => write!(f, "FIN {id}"),
            Command::Req { id, time_ms, .. } => write!(f, "REQ {id} {time_ms}"),
            Command::Touch { id } => write!(f, "TOUCH {id}"),
        }
    }
}
