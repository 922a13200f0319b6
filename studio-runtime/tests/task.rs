use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use studio_runtime::{BackgroundTask, TaskError};

#[test]
fn join_returns_work_result() {
    let mut task = BackgroundTask::spawn("sum", |_ctx| (1..=10).sum::<u32>()).unwrap();
    assert_eq!(task.name(), "sum");
    assert_eq!(task.join().unwrap(), 55);
    assert!(task.is_finished());
}

#[test]
fn second_join_is_an_error() {
    let mut task = BackgroundTask::spawn("once", |_ctx| ()).unwrap();
    task.join().unwrap();
    assert!(matches!(task.join(), Err(TaskError::AlreadyJoined(name)) if name == "once"));
}

#[test]
fn worker_thread_carries_task_name() {
    let mut task = BackgroundTask::spawn("named_worker", |_ctx| {
        std::thread::current().name().map(str::to_string)
    })
    .unwrap();
    assert_eq!(task.join().unwrap().as_deref(), Some("named_worker"));
}

#[test]
fn cancellation_is_visible_to_the_worker() {
    let (started_tx, started_rx) = mpsc::channel();
    let mut task = BackgroundTask::spawn("loop", move |ctx| {
        started_tx.send(()).unwrap();
        let mut spins = 0u64;
        while !ctx.is_cancelled() {
            spins += 1;
            std::thread::sleep(Duration::from_millis(1));
        }
        spins
    })
    .unwrap();
    started_rx.recv().unwrap();
    task.cancel();
    assert!(task.is_cancelled());
    task.join().unwrap();
}

#[test]
fn progress_is_clamped_and_shared() {
    let mut task = BackgroundTask::spawn("progress", |ctx| {
        ctx.set_progress(30);
        let mid = ctx.progress();
        ctx.set_progress(250);
        mid
    })
    .unwrap();
    assert_eq!(task.join().unwrap(), 30);
    assert_eq!(task.progress(), 100);
}

#[test]
fn completion_runs_after_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut task = BackgroundTask::spawn_with_completion(
        "ok",
        |_ctx| 7,
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    )
    .unwrap();
    assert_eq!(task.join().unwrap(), 7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn completion_runs_even_if_worker_panics() {
    let (done_tx, done_rx) = mpsc::channel();
    let mut task = BackgroundTask::<()>::spawn_with_completion(
        "boom",
        |_ctx| panic!("worker failure"),
        move || {
            let _ = done_tx.send(());
        },
    )
    .unwrap();
    assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    assert!(matches!(task.join(), Err(TaskError::Panicked(name)) if name == "boom"));
    assert!(task.is_finished());
}
