use super::{Disposition, dispatch, respond};
use crate::event::{FINISH, REQUEUE};
use crate::message::{Message, RequeueOptions};
use std::sync::{Arc, Mutex};

fn record_events(msg: &Message) -> Arc<Mutex<Vec<&'static str>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in [FINISH, REQUEUE] {
        let seen = seen.clone();
        msg.on(name, move |_, _| seen.lock().unwrap().push(name));
    }
    seen
}

#[test]
fn test_success_finishes() {
    let msg = Message::new("m1", "body", 0, 1);
    let seen = record_events(&msg);

    assert_eq!(respond(&msg, true), Ok(Disposition::Finished));
    assert!(msg.has_responded());
    assert_eq!(*seen.lock().unwrap(), vec![FINISH]);
}

#[test]
fn test_failure_requeues_with_backoff() {
    let msg = Message::new("m1", "body", 0, 1);
    let backoff = Arc::new(Mutex::new(None));
    {
        let backoff = backoff.clone();
        msg.on(REQUEUE, move |_, ctx| *backoff.lock().unwrap() = ctx.get_bool("backoff"));
    }

    assert_eq!(respond(&msg, false), Ok(Disposition::Requeued));
    assert_eq!(*backoff.lock().unwrap(), Some(true));
}

#[test]
fn test_async_message_is_left_alone() {
    let msg = Message::new("m1", "body", 0, 1);
    let seen = record_events(&msg);

    let result = dispatch(&msg, |m| {
        m.enable_async();
        true
    });

    assert_eq!(result, Ok(Disposition::Deferred));
    assert!(!msg.has_responded());
    assert!(seen.lock().unwrap().is_empty());

    // The application responds later on its own.
    msg.finish().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![FINISH]);
}

#[test]
fn test_handler_that_responded_is_not_answered_twice() {
    let msg = Message::new("m1", "body", 0, 1);
    let seen = record_events(&msg);

    let result = dispatch(&msg, |m| {
        m.requeue(RequeueOptions::new().with_backoff(false)).unwrap();
        true
    });

    assert_eq!(result, Ok(Disposition::AlreadyResponded));
    assert_eq!(*seen.lock().unwrap(), vec![REQUEUE]);
}
