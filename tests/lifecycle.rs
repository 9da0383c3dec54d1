use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nsqmsg::config::ConsumerSettings;
use nsqmsg::conn::{BackoffSignal, Command, Conn};
use nsqmsg::consumer::{self, Disposition};
use nsqmsg::event::MESSAGE_TIMEOUT;
use nsqmsg::message::{Message, RequeueOptions};
use nsqmsg::timer::TokioScheduler;
use nsqmsg::utils::error::MessageError;

#[tokio::test(start_paused = true)]
async fn integration_consumer_round_trip() {
    let settings = ConsumerSettings {
        msg_timeout_ms: Some(1000),
        requeue_delay_secs: 2,
        max_requeue_delay_secs: 10,
    };
    let (conn, mut commands) = Conn::new(settings, Arc::new(TokioScheduler::new()));

    let timeouts = Arc::new(AtomicUsize::new(0));
    {
        let timeouts = timeouts.clone();
        conn.on(MESSAGE_TIMEOUT, move |_, message| {
            timeouts.fetch_add(1, Ordering::SeqCst);
            message.touch().expect("touch pending message");
        });
    }

    let ok = Message::new("ok", "payload", 0, 1);
    let failing = Message::new("failing", "payload", 0, 4);
    let slow = Message::new("slow", "payload", 0, 1);
    for message in [&ok, &failing, &slow] {
        conn.deliver(message);
    }
    assert_eq!(conn.in_flight(), 3);

    assert_eq!(consumer::dispatch(&ok, |_| true), Ok(Disposition::Finished));
    assert_eq!(consumer::dispatch(&failing, |_| false), Ok(Disposition::Requeued));
    assert_eq!(
        consumer::dispatch(&slow, |m| {
            m.enable_async();
            true
        }),
        Ok(Disposition::Deferred)
    );

    // Two deadlines pass; the timeout handler renews the slow message each time.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(timeouts.load(Ordering::SeqCst), 2);
    assert_eq!(slow.is_alive(), Ok(true));

    slow.requeue(RequeueOptions::new().with_backoff(false)).unwrap();
    assert_eq!(slow.is_alive(), Ok(false));
    assert!(matches!(slow.finish(), Err(MessageError::AlreadyResponded { .. })));
    assert_eq!(conn.in_flight(), 0);

    let mut received = Vec::new();
    while let Ok(command) = commands.try_recv() {
        received.push(command);
    }

    assert_eq!(
        received,
        vec![
            Command::Fin { id: "ok".to_string() },
            Command::Req {
                id: "failing".to_string(),
                time_ms: 8000,
                backoff: true,
            },
            Command::Touch { id: "slow".to_string() },
            Command::Touch { id: "slow".to_string() },
            Command::Req {
                id: "slow".to_string(),
                time_ms: 2000,
                backoff: false,
            },
        ]
    );

    let signals: Vec<_> = received.iter().filter_map(Command::backoff_signal).collect();
    assert_eq!(
        signals,
        vec![
            BackoffSignal::Success,
            BackoffSignal::Failure,
            BackoffSignal::Neutral
        ]
    );

    // Nothing fires for resolved messages.
    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(timeouts.load(Ordering::SeqCst), 2);
}
