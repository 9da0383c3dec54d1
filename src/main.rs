//! Offline demo for nsqmsg
//!
//! Delivers a few messages to an in-process connection, lets handlers
//! finish, fail and defer them, and prints the commands the connection
//! would have written to the broker. No network involved.

use std::sync::Arc;

use chrono::Utc;
use nsqmsg::config::{Settings, load_config};
use nsqmsg::conn::{Conn, Connection};
use nsqmsg::consumer;
use nsqmsg::event::MESSAGE_TIMEOUT;
use nsqmsg::message::{Message, RequeueOptions};
use nsqmsg::timer::TokioScheduler;
use nsqmsg::utils::error::Result;
use nsqmsg::utils::logging;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Client-side timeout used when the configuration leaves it unset.
const DEMO_MSG_TIMEOUT_MS: u64 = 200;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            return;
        }
    };
    logging::init(&settings.logging.level);

    if let Err(e) = run(settings).await {
        error!("Demo failed: {}", e);
    }
}

async fn run(settings: Settings) -> Result<()> {
    let mut consumer_settings = settings.consumer;
    consumer_settings
        .msg_timeout_ms
        .get_or_insert(DEMO_MSG_TIMEOUT_MS);

    let (conn, mut commands) = Conn::new(consumer_settings, Arc::new(TokioScheduler::new()));
    conn.on(MESSAGE_TIMEOUT, |_, message| {
        info!(id = %message.id(), "deadline reached, asking for more time");
        if let Err(e) = message.touch() {
            warn!("Could not touch message: {}", e);
        }
    });

    let messages: Vec<Arc<Message>> = (1..=3)
        .map(|attempts| {
            Message::new(
                Uuid::new_v4().simple().to_string(),
                format!("job #{attempts}"),
                Utc::now().timestamp_nanos_opt().unwrap_or_default(),
                attempts,
            )
        })
        .collect();
    for message in &messages {
        conn.deliver(message);
    }

    let done = consumer::dispatch(&messages[0], |_| true)?;
    info!(id = %messages[0].id(), ?done, "handled");

    let failed = consumer::dispatch(&messages[1], |_| false)?;
    info!(id = %messages[1].id(), ?failed, "handled");

    // The slow one goes async, outlives its deadline once, then gets requeued
    // without penalty.
    let deferred = consumer::dispatch(&messages[2], |message| {
        message.enable_async();
        true
    })?;
    info!(id = %messages[2].id(), ?deferred, "handed off");

    tokio::time::sleep(conn.msg_timeout() + conn.msg_timeout() / 2).await;
    messages[2].requeue(RequeueOptions::new().with_backoff(false).with_delay(10))?;

    info!(in_flight = conn.in_flight(), "all messages resolved");
    while let Ok(command) = commands.try_recv() {
        println!("{command}  backoff={:?}", command.backoff_signal());
    }

    Ok(())
}
