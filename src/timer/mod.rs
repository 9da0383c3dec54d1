//! Timer facility
//!
//! Messages do not own a clock. They ask the connection's [`Scheduler`] for a
//! periodic callback and keep the returned [`TimerHandle`] so they can stop it
//! before resolving. [`TokioScheduler`] is the tokio-backed implementation.

pub mod periodic;

use std::time::Duration;

pub use periodic::{PeriodicTimer, TokioScheduler};

/// Callback run on every tick of a periodic timer.
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Handle to a started periodic timer.
pub trait TimerHandle: Send + Sync {
    /// Stops the timer. Stopping an already stopped timer is a no-op.
    fn stop(&self);

    /// Whether the timer will fire again.
    fn is_running(&self) -> bool;
}

/// Something that can run a callback every `interval`.
pub trait Scheduler: Send + Sync {
    /// Starts a periodic timer. The first tick happens one full `interval`
    /// after this call.
    fn schedule_periodic(&self, interval: Duration, callback: Callback) -> Box<dyn TimerHandle>;
}

#[cfg(test)]
mod tests;
