//! In-process connection
//!
//! `Conn` is the consumer side of a broker connection with the socket cut
//! off: it listens to the messages it delivers and queues the matching
//! `FIN`/`REQ`/`TOUCH` commands on an unbounded channel. It also owns the
//! scheduler message timeouts run on and re-publishes their expiry as a
//! `message_timeout` event.
//!
//! Usage notes:
//! - Create with [`Conn::new`], keep the returned receiver and drain it from
//!   whatever task writes to the broker.
//! - Call [`Conn::deliver`] for each decoded message before handing it to
//!   the application; a repeated delivery is ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use super::Connection;
use super::command::Command;
use crate::config::ConsumerSettings;
use crate::event::{Evented, FINISH, MESSAGE_TIMEOUT, REQUEUE, TOUCH};
use crate::message::Message;
use crate::timer::Scheduler;

/// Timeout used by [`Conn`] when a message is armed explicitly but
/// `msg_timeout_ms` is not configured. Matches nsqd's default.
pub const DEFAULT_MSG_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Conn {
    settings: ConsumerSettings,
    scheduler: Arc<dyn Scheduler>,
    sender: UnboundedSender<Command>,
    in_flight: Arc<AtomicUsize>,
    events: Evented<Conn, Arc<Message>>,
}

impl Conn {
    /// Creates a connection and the receiving end of its command channel.
    pub fn new(
        settings: ConsumerSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> (Arc<Self>, UnboundedReceiver<Command>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let conn = Arc::new(Self {
            settings,
            scheduler,
            sender,
            in_flight: Arc::new(AtomicUsize::new(0)),
            events: Evented::new(),
        });
        (conn, receiver)
    }

    pub fn settings(&self) -> &ConsumerSettings {
        &self.settings
    }

    /// Messages delivered and not yet finished or requeued.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Registers a listener for connection events, e.g. `message_timeout`.
    pub fn on<F>(&self, name: &str, handler: F)
    where
        F: Fn(&Conn, &Arc<Message>) + Send + Sync + 'static,
    {
        self.events.on(name, handler);
    }

    /// Takes responsibility for responding to `message`.
    ///
    /// Subscribes to the message's disposition events and, when a message
    /// timeout is configured, arms it. A message is delivered at most once:
    /// later calls, on this or any other connection, are ignored and return
    /// `false`.
    ///
    /// The message counts as in flight until it is finished or requeued. One
    /// dropped without a response stays in flight, as it does on the broker
    /// until its timeout redelivers it.
    pub fn deliver(self: &Arc<Self>, message: &Arc<Message>) -> bool {
        if !message.mark_delivered() {
            warn!(id = %message.id(), "message already delivered, ignoring");
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        {
            let sender = self.sender.clone();
            let in_flight = self.in_flight.clone();
            message.on(FINISH, move |msg, _| {
                in_flight.fetch_sub(1, Ordering::SeqCst);
                send(&sender, Command::Fin {
                    id: msg.id().to_string(),
                });
            });
        }

        {
            let sender = self.sender.clone();
            let in_flight = self.in_flight.clone();
            let settings = self.settings.clone();
            message.on(REQUEUE, move |msg, ctx| {
                in_flight.fetch_sub(1, Ordering::SeqCst);
                // No time_ms means the caller left the delay to us.
                let time_ms = ctx
                    .get_i64("time_ms")
                    .map(|ms| u64::try_from(ms).unwrap_or(0))
                    .unwrap_or_else(|| settings.requeue_delay_ms(msg.attempts()));
                send(&sender, Command::Req {
                    id: msg.id().to_string(),
                    time_ms,
                    backoff: ctx.get_bool("backoff").unwrap_or(true),
                });
            });
        }

        {
            let sender = self.sender.clone();
            message.on(TOUCH, move |msg, _| {
                send(&sender, Command::Touch {
                    id: msg.id().to_string(),
                });
            });
        }

        if self.settings.msg_timeout().is_some() {
            let conn: Arc<dyn Connection> = self.clone();
            message.arm_timeout(&conn);
        }

        debug!(id = %message.id(), attempts = message.attempts(), "message delivered");
        true
    }
}

impl Connection for Conn {
    fn msg_timeout(&self) -> Duration {
        self.settings.msg_timeout().unwrap_or(DEFAULT_MSG_TIMEOUT)
    }

    fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    fn trigger_message_timeout(&self, message: &Arc<Message>) {
        warn!(id = %message.id(), "message timed out");
        self.events.trigger(MESSAGE_TIMEOUT, self, message);
    }
}

fn send(sender: &UnboundedSender<Command>, command: Command) {
    if let Err(e) = sender.send(command) {
        warn!("Failed to queue {}: receiver dropped", e.0);
    }
}
