use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::ReentrantMutex;
use tracing::{debug, trace, warn};

use super::MessageId;
use super::requeue::RequeueOptions;
use super::state::{AtomicResponseState, ResponseState};
use crate::conn::Connection;
use crate::event::{Evented, FINISH, Kwargs, REQUEUE, TOUCH};
use crate::timer::TimerHandle;
use crate::utils::error::MessageError;

/// Client-side timeout bookkeeping, guarded by one mutex so arming, clearing
/// and expiring never interleave.
#[derive(Default)]
struct TimeoutSlot {
    conn: Option<Weak<dyn Connection>>,
    timer: Option<Box<dyn TimerHandle>>,
    /// Bumped on every arm so a firing timer only ever clears itself.
    generation: u64,
}

/// A message received from the broker.
///
/// Created by the delivery path with [`Message::new`], which hands back an
/// `Arc<Message>`: timers refer back to the message weakly, so the consumer
/// holding the `Arc` decides how long it lives.
///
/// If you want to process a message asynchronously, call
/// [`enable_async`](Message::enable_async), pass the message around and
/// respond later with [`finish`](Message::finish) or
/// [`requeue`](Message::requeue).
///
/// `finish` and `requeue` impact backoff positively and negatively; a
/// requeue with `backoff = false` is neutral.
pub struct Message {
    id: MessageId,
    body: Vec<u8>,
    timestamp: i64,
    attempts: u16,
    state: AtomicResponseState,
    async_enabled: AtomicBool,
    delivered: AtomicBool,
    timeout: Mutex<TimeoutSlot>,
    /// Held while a timeout is being reported and while the message moves to
    /// `Responded`, so `message_timeout` never follows a terminal transition.
    /// Reentrant: a timeout handler may finish or requeue on the same thread.
    notify: ReentrantMutex<()>,
    events: Evented<Message, Kwargs>,
    this: Weak<Message>,
}

impl Message {
    /// Creates a pending message.
    ///
    /// `timestamp` is the broker's production time in nanoseconds since the
    /// UNIX epoch and `attempts` the number of delivery attempts so far. No
    /// validation happens here.
    pub fn new(
        id: impl Into<MessageId>,
        body: impl Into<Vec<u8>>,
        timestamp: i64,
        attempts: u16,
    ) -> Arc<Self> {
        let id = id.into();
        let body = body.into();
        Arc::new_cyclic(|this| Self {
            id,
            body,
            timestamp,
            attempts,
            state: AtomicResponseState::new(),
            async_enabled: AtomicBool::new(false),
            delivered: AtomicBool::new(false),
            timeout: Mutex::new(TimeoutSlot::default()),
            notify: ReentrantMutex::new(()),
            events: Evented::new(),
            this: this.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Production time as a UTC date.
    pub fn produced_at(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }

    pub fn attempts(&self) -> u16 {
        self.attempts
    }

    /// Registers a listener for one of the message events.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Message, &Kwargs) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    pub fn events(&self) -> &Evented<Message, Kwargs> {
        &self.events
    }

    /// Marks the message for asynchronous processing: the consumer loop will
    /// not respond on the handler's behalf once it returns.
    pub fn enable_async(&self) {
        self.async_enabled.store(true, Ordering::Release);
    }

    pub fn is_async(&self) -> bool {
        self.async_enabled.load(Ordering::Acquire)
    }

    pub fn has_responded(&self) -> bool {
        self.state() == ResponseState::Responded
    }

    pub fn state(&self) -> ResponseState {
        self.state.load()
    }

    /// Starts the client-side timeout on `conn`.
    ///
    /// Any running timer is stopped first. Each time the connection's
    /// `msg_timeout` elapses the connection receives a `message_timeout`
    /// notification for this message, after which the timer stops itself:
    /// one notification per arm, until [`touch`](Message::touch) re-arms.
    pub fn arm_timeout(&self, conn: &Arc<dyn Connection>) {
        let mut slot = self.lock_timeout();
        slot.conn = Some(Arc::downgrade(conn));
        self.start_timer(&mut slot, conn);
    }

    /// Whether the client-side timeout is still running.
    ///
    /// Only meaningful once a timeout has been armed; asking earlier is a
    /// contract violation.
    pub fn is_alive(&self) -> Result<bool, MessageError> {
        let slot = self.lock_timeout();
        slot.timer
            .as_ref()
            .map(|timer| timer.is_running())
            .ok_or_else(|| MessageError::TimeoutNotArmed {
                id: self.id.clone(),
            })
    }

    /// Tells the broker the message was processed successfully (or should
    /// be silently discarded).
    pub fn finish(&self) -> Result<(), MessageError> {
        self.resolve()?;
        debug!(id = %self.id, "message finished");
        self.events.trigger(FINISH, self, &Kwargs::new());
        Ok(())
    }

    /// Tells the broker processing failed and the message should be
    /// delivered again.
    ///
    /// The `requeue` event carries `backoff`, `delay` and, for a positive
    /// delay, `time_ms`.
    pub fn requeue(&self, options: RequeueOptions) -> Result<(), MessageError> {
        let context = options.to_kwargs();
        self.resolve()?;
        debug!(id = %self.id, backoff = options.backoff, delay = options.delay, "message requeued");
        self.events.trigger(REQUEUE, self, &context);
        Ok(())
    }

    /// Tells the broker more time is needed to process the message.
    ///
    /// Re-arms the client-side timeout when one was armed before and the
    /// connection is still around.
    pub fn touch(&self) -> Result<(), MessageError> {
        {
            let mut slot = self.lock_timeout();
            // Checked under the timeout lock so a concurrent finish either
            // sees the new timer and stops it, or stops us from arming one.
            if self.has_responded() {
                return Err(self.already_responded());
            }
            if slot.timer.is_some() {
                let conn = slot.conn.as_ref().and_then(Weak::upgrade);
                match conn {
                    Some(conn) => self.start_timer(&mut slot, &conn),
                    None => {
                        debug!(id = %self.id, "connection gone, not re-arming timeout");
                        Self::stop_timer(&slot);
                    }
                }
            }
        }

        trace!(id = %self.id, "message touched");
        self.events.trigger(TOUCH, self, &Kwargs::new());
        Ok(())
    }

    /// Claims the message for one connection. Only the first call returns
    /// `true`.
    pub(crate) fn mark_delivered(&self) -> bool {
        !self.delivered.swap(true, Ordering::AcqRel)
    }

    /// Terminal transition shared by `finish` and `requeue`.
    fn resolve(&self) -> Result<(), MessageError> {
        let _notify = self.notify.lock();
        self.respond()?;
        self.clear_timeout();
        Ok(())
    }

    fn respond(&self) -> Result<(), MessageError> {
        self.state
            .respond()
            .map_err(|_| self.already_responded())
    }

    fn already_responded(&self) -> MessageError {
        warn!(id = %self.id, "message has already been responded to");
        MessageError::AlreadyResponded {
            id: self.id.clone(),
        }
    }

    fn lock_timeout(&self) -> MutexGuard<'_, TimeoutSlot> {
        self.timeout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_timer(&self, slot: &mut TimeoutSlot, conn: &Arc<dyn Connection>) {
        if let Some(previous) = slot.timer.take() {
            previous.stop();
        }
        slot.generation += 1;

        let generation = slot.generation;
        let message = self.this.clone();
        let weak_conn = Arc::downgrade(conn);
        let callback = Box::new(move || {
            let Some(message) = message.upgrade() else {
                return;
            };
            {
                let _notify = message.notify.lock();
                if !message.has_responded() {
                    if let Some(conn) = weak_conn.upgrade() {
                        conn.trigger_message_timeout(&message);
                    }
                }
            }
            message.expire_timer(generation);
        });

        let interval = conn.msg_timeout();
        slot.timer = Some(conn.scheduler().schedule_periodic(interval, callback));
        trace!(id = %self.id, ?interval, generation, "message timeout armed");
    }

    /// Stops the timer that just fired, unless it was already replaced.
    fn expire_timer(&self, generation: u64) {
        let slot = self.lock_timeout();
        if slot.generation == generation {
            if let Some(timer) = slot.timer.as_ref().filter(|timer| timer.is_running()) {
                timer.stop();
            }
        }
    }

    fn clear_timeout(&self) {
        Self::stop_timer(&self.lock_timeout());
    }

    fn stop_timer(slot: &TimeoutSlot) {
        if let Some(timer) = &slot.timer {
            timer.stop();
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("body_len", &self.body.len())
            .field("timestamp", &self.timestamp)
            .field("attempts", &self.attempts)
            .field("state", &self.state())
            .field("async", &self.is_async())
            .finish()
    }
}
