use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

use super::{Callback, Scheduler, TimerHandle};

/// Smallest interval a timer will tick at; tokio rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns periodic timers as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, like
    /// [`Handle::current`].
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    pub fn try_new() -> Result<Self, TryCurrentError> {
        Ok(Self {
            handle: Handle::try_current()?,
        })
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(&self, interval: Duration, callback: Callback) -> Box<dyn TimerHandle> {
        Box::new(PeriodicTimer::start(&self.handle, interval, callback))
    }
}

/// A running periodic callback.
///
/// The callback runs on the runtime's worker threads once per `interval`
/// until the timer is stopped or dropped.
#[derive(Debug)]
pub struct PeriodicTimer {
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PeriodicTimer {
    pub fn start(handle: &Handle, interval: Duration, mut callback: Callback) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let running = Arc::new(AtomicBool::new(true));

        let task = {
            let running = running.clone();
            handle.spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    ticker.tick().await;
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    trace!(?interval, "periodic timer fired");
                    callback();
                }
            })
        };

        Self { running, task }
    }
}

impl TimerHandle for PeriodicTimer {
    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
