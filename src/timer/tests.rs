use super::{Scheduler, TimerHandle, TokioScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counting_timer(scheduler: &TokioScheduler, every_ms: u64) -> (Box<dyn TimerHandle>, Arc<AtomicUsize>) {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let timer = scheduler.schedule_periodic(
        Duration::from_millis(every_ms),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    (timer, ticks)
}

#[tokio::test(start_paused = true)]
async fn test_periodic_timer_ticks_every_interval() {
    let scheduler = TokioScheduler::new();
    let (timer, ticks) = counting_timer(&scheduler, 100);

    assert!(timer.is_running());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 2);
    assert!(timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stopped_timer_does_not_fire() {
    let scheduler = TokioScheduler::new();
    let (timer, ticks) = counting_timer(&scheduler, 100);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);

    timer.stop();
    assert!(!timer.is_running());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 1);

    // Stopping twice is harmless.
    timer.stop();
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_timer_does_not_fire() {
    let scheduler = TokioScheduler::new();
    let (timer, ticks) = counting_timer(&scheduler, 100);
    drop(timer);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_is_clamped() {
    let scheduler = TokioScheduler::new();
    let (timer, ticks) = counting_timer(&scheduler, 0);

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(ticks.load(Ordering::SeqCst) >= 1);
    timer.stop();
}

#[test]
fn test_try_new_outside_runtime_fails() {
    assert!(TokioScheduler::try_new().is_err());
}
