use serde::{Deserialize, Serialize};

use crate::event::Kwargs;

/// Delay sentinel meaning "let the connection derive the delay from the
/// number of attempts".
pub const DEFAULT_DELAY: i64 = -1;

/// Options for [`Message::requeue`](super::Message::requeue).
///
/// - `backoff`: whether this requeue counts as a failure for backoff
///   purposes. `false` is neutral: backoff state neither grows nor shrinks.
/// - `delay`: requeue delay in seconds, or [`DEFAULT_DELAY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeueOptions {
    pub backoff: bool,
    pub delay: i64,
}

impl Default for RequeueOptions {
    fn default() -> Self {
        Self {
            backoff: true,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RequeueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backoff(mut self, backoff: bool) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_delay(mut self, delay_secs: i64) -> Self {
        self.delay = delay_secs;
        self
    }

    /// The delay in milliseconds, present only for a positive `delay`.
    pub fn time_ms(&self) -> Option<i64> {
        (self.delay > 0).then(|| self.delay.saturating_mul(1000))
    }

    /// Context carried by the `requeue` event.
    ///
    /// `backoff` and `delay` are always present; `time_ms` only when the
    /// delay is positive. Zero and negative delays pass through untouched.
    pub fn to_kwargs(&self) -> Kwargs {
        let mut kwargs = Kwargs::new()
            .with("backoff", self.backoff)
            .with("delay", self.delay);
        if let Some(time_ms) = self.time_ms() {
            kwargs.insert("time_ms", time_ms);
        }
        kwargs
    }
}
