//! End-to-end pool behavior: rounds, policies, misuse rejection, shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tickpool::{
    ClearPolicy, ErrorPolicy, EventKind, Partition, Pool, PoolConfig, PoolError, Status,
    Subscribe, TaskError, TaskFn, TaskRef, Workload,
};

fn config(workers: usize) -> PoolConfig {
    PoolConfig {
        workers,
        ..Default::default()
    }
}

fn slots(count: usize) -> Arc<Vec<AtomicUsize>> {
    Arc::new((0..count).map(|_| AtomicUsize::new(0)).collect())
}

/// Task that bumps `slots[index]` once, optionally after a delay.
fn slot_task(
    name: &'static str,
    slots: Arc<Vec<AtomicUsize>>,
    index: usize,
    delay: Duration,
) -> TaskRef {
    TaskFn::arc(name, move |_ctx: CancellationToken| {
        let slots = Arc::clone(&slots);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            slots[index].fetch_add(1, Ordering::SeqCst);
            Ok::<_, TaskError>(())
        }
    })
}

/// Task that fails, optionally after a delay.
fn failing_task(name: &'static str, delay: Duration) -> TaskRef {
    TaskFn::arc(name, move |_ctx: CancellationToken| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Err(TaskError::fail("boom"))
    })
}

/// Task that bumps a counter and then fails.
fn attempted_failing_task(name: &'static str, attempts: Arc<AtomicUsize>) -> TaskRef {
    TaskFn::arc(name, move |_ctx: CancellationToken| {
        let attempts = Arc::clone(&attempts);
        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(TaskError::fail("boom"))
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn round_executes_every_task_exactly_once() {
    let mut cfg = config(4);
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();
    assert!(pool.is_started());
    assert_eq!(pool.size(), 4);

    let hits = slots(10);
    for i in 0..10 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }

    pool.process_workload().await.unwrap();

    assert_eq!(pool.status(), Status::Ready);
    for (i, slot) in hits.iter().enumerate() {
        assert_eq!(slot.load(Ordering::SeqCst), 1, "task {i} must run once");
    }
    // ClearPolicy::Never keeps the batch for immediate reuse.
    assert_eq!(pool.pending_tasks(), 10);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_clear_allows_rerunning_the_same_batch() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(6);
    for i in 0..6 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }

    pool.process_workload().await.unwrap();
    pool.process_workload().await.unwrap();

    for slot in hits.iter() {
        assert_eq!(slot.load(Ordering::SeqCst), 2);
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn empty_round_resolves_immediately_as_success() {
    let pool = Pool::new(config(2));
    pool.start();

    pool.process_workload().await.unwrap();
    assert_eq!(pool.status(), Status::Ready);

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn round_before_start_is_rejected() {
    let pool = Pool::new(config(2));
    assert!(!pool.is_started());

    let res = pool.process_workload().await;
    assert!(matches!(res, Err(PoolError::NotStarted)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rounds_do_not_overlap() {
    let pool = Pool::new(config(2));
    pool.start();

    let hits = slots(4);
    for i in 0..4 {
        pool.append(slot_task(
            "slow-tick",
            Arc::clone(&hits),
            i,
            Duration::from_millis(50),
        ))
        .unwrap();
    }

    let first = pool.process_workload();
    assert_eq!(pool.status(), Status::Processing);

    let second = pool.process_workload().await;
    assert!(matches!(
        second,
        Err(PoolError::NotReady {
            status: Status::Processing
        })
    ));

    first.await.unwrap();
    assert_eq!(pool.status(), Status::Ready);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn buffer_mutation_during_round_is_rejected() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(2);
    for i in 0..2 {
        pool.append(slot_task(
            "slow-tick",
            Arc::clone(&hits),
            i,
            Duration::from_millis(50),
        ))
        .unwrap();
    }

    let handle = pool.process_workload();

    let extra = slot_task("late", Arc::clone(&hits), 0, Duration::ZERO);
    assert!(matches!(pool.append(extra), Err(PoolError::Busy)));
    assert!(matches!(
        pool.set_workload(Workload::new(), false).await,
        Err(PoolError::Busy)
    ));
    assert!(matches!(pool.clear_workload(), Err(PoolError::Busy)));

    handle.await.unwrap();

    // Idle again: mutation is accepted.
    pool.clear_workload().unwrap();
    assert_eq!(pool.pending_tasks(), 0);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn terminate_stops_claiming_after_the_first_failure() {
    let mut cfg = config(2);
    cfg.partition = Partition::Strided;
    cfg.on_failure = ErrorPolicy::Terminate;
    let pool = Pool::new(cfg);
    pool.start();

    // Strided over 2 workers: worker 0 owns indices {0, 2}, worker 1 owns
    // {1, 3}. The failure at index 1 is delayed so worker 0 finishes its
    // whole stride first; index 3 sits behind the failure and must not run.
    let hits = slots(4);
    pool.append(slot_task("ok-0", Arc::clone(&hits), 0, Duration::ZERO))
        .unwrap();
    pool.append(failing_task("bad-1", Duration::from_millis(100)))
        .unwrap();
    pool.append(slot_task("ok-2", Arc::clone(&hits), 2, Duration::ZERO))
        .unwrap();
    pool.append(slot_task("ok-3", Arc::clone(&hits), 3, Duration::ZERO))
        .unwrap();

    let res = pool.process_workload().await;
    match res {
        Err(PoolError::RoundFailed { failure }) => {
            assert_eq!(&*failure.task, "bad-1");
        }
        other => panic!("expected RoundFailed, got {other:?}"),
    }

    assert_eq!(pool.status(), Status::Error);
    assert_eq!(pool.task_errors().len(), 1);
    assert_eq!(hits[0].load(Ordering::SeqCst), 1);
    assert_eq!(hits[2].load(Ordering::SeqCst), 1);
    assert_eq!(
        hits[3].load(Ordering::SeqCst),
        0,
        "the stride behind the failure must stop at the claim boundary"
    );

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sticky_error_requires_acknowledgment() {
    let mut cfg = config(1);
    cfg.on_failure = ErrorPolicy::Terminate;
    let pool = Pool::new(cfg);
    pool.start();

    pool.append(failing_task("bad", Duration::ZERO)).unwrap();
    let res = pool.process_workload().await;
    assert!(matches!(res, Err(PoolError::RoundFailed { .. })));
    assert_eq!(pool.status(), Status::Error);

    // New rounds are rejected until the error is acknowledged.
    let rejected = pool.process_workload().await;
    assert!(matches!(
        rejected,
        Err(PoolError::NotReady {
            status: Status::Error
        })
    ));

    pool.clear_errors().unwrap();
    assert_eq!(pool.status(), Status::Ready);
    assert!(pool.task_errors().is_empty());

    let hits = slots(1);
    pool.clear_workload().unwrap();
    pool.append(slot_task("ok", Arc::clone(&hits), 0, Duration::ZERO))
        .unwrap();
    pool.process_workload().await.unwrap();
    assert_eq!(hits[0].load(Ordering::SeqCst), 1);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ignore_policy_attempts_every_task() {
    let mut cfg = config(2);
    cfg.on_failure = ErrorPolicy::Ignore;
    let pool = Pool::new(cfg);
    pool.start();

    let attempts = Arc::new(AtomicUsize::new(0));
    for _ in 0..6 {
        pool.append(attempted_failing_task("flaky", Arc::clone(&attempts)))
            .unwrap();
    }

    pool.process_workload().await.unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 6);
    assert!(pool.task_errors().is_empty(), "Ignore captures nothing");
    assert_eq!(pool.status(), Status::Ready);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn log_policy_records_failures_but_finishes_the_round() {
    let mut cfg = config(2);
    cfg.on_failure = ErrorPolicy::Log;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(3);
    pool.append(slot_task("ok-0", Arc::clone(&hits), 0, Duration::ZERO))
        .unwrap();
    pool.append(failing_task("bad-1", Duration::ZERO)).unwrap();
    pool.append(slot_task("ok-2", Arc::clone(&hits), 2, Duration::ZERO))
        .unwrap();
    pool.append(failing_task("bad-3", Duration::ZERO)).unwrap();

    pool.process_workload().await.unwrap();

    assert_eq!(pool.status(), Status::Ready);
    assert_eq!(hits[0].load(Ordering::SeqCst), 1);
    assert_eq!(hits[2].load(Ordering::SeqCst), 1);

    let errors = pool.task_errors();
    assert_eq!(errors.len(), 2);
    let mut failed: Vec<&str> = errors.iter().map(|f| &*f.task).collect();
    failed.sort_unstable();
    assert_eq!(failed, vec!["bad-1", "bad-3"]);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn upon_completion_empties_the_buffer() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::UponCompletion;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(5);
    for i in 0..5 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }

    pool.process_workload().await.unwrap();
    assert_eq!(pool.pending_tasks(), 0);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn at_next_workload_clears_lazily_on_append() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::AtNextWorkload;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(4);
    for i in 0..3 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }

    pool.process_workload().await.unwrap();
    // Still holding the finished round's tasks: clearing is deferred.
    assert_eq!(pool.pending_tasks(), 3);

    pool.append(slot_task("fresh", Arc::clone(&hits), 3, Duration::ZERO))
        .unwrap();
    assert_eq!(pool.pending_tasks(), 1, "stale batch dropped on append");

    pool.process_workload().await.unwrap();
    assert_eq!(hits[0].load(Ordering::SeqCst), 1);
    assert_eq!(hits[3].load(Ordering::SeqCst), 1);

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wait_for_finished_returns_after_the_round() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(4);
    for i in 0..4 {
        pool.append(slot_task(
            "slow-tick",
            Arc::clone(&hits),
            i,
            Duration::from_millis(50),
        ))
        .unwrap();
    }

    // Fire-and-forget: drop the handle, rely on the status machine.
    drop(pool.process_workload());
    pool.wait_for_finished().await;

    assert_eq!(pool.status(), Status::Ready);
    for slot in hits.iter() {
        assert_eq!(slot.load(Ordering::SeqCst), 1);
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn set_workload_wait_first_blocks_until_idle() {
    let mut cfg = config(2);
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(2);
    for i in 0..2 {
        pool.append(slot_task(
            "slow-tick",
            Arc::clone(&hits),
            i,
            Duration::from_millis(50),
        ))
        .unwrap();
    }
    let handle = pool.process_workload();

    let replacement: Workload = (0..5)
        .map(|i| slot_task("next-tick", Arc::clone(&hits), i % 2, Duration::ZERO))
        .collect();
    pool.set_workload(replacement, true).await.unwrap();

    assert_eq!(pool.pending_tasks(), 5);
    // The original round still completed every task.
    handle.await.unwrap();
    for slot in hits.iter() {
        assert!(slot.load(Ordering::SeqCst) >= 1);
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_cursor_covers_all_tasks_exactly_once() {
    let mut cfg = config(3);
    cfg.partition = Partition::SharedCursor;
    cfg.clear = ClearPolicy::Never;
    let pool = Pool::new(cfg);
    pool.start();

    // Uneven costs: a handful of slow tasks sprinkled into the batch.
    let hits = slots(100);
    for i in 0..100 {
        let delay = if i % 25 == 0 {
            Duration::from_millis(20)
        } else {
            Duration::ZERO
        };
        pool.append(slot_task("tick", Arc::clone(&hits), i, delay))
            .unwrap();
    }

    pool.process_workload().await.unwrap();

    assert_eq!(pool.status(), Status::Ready);
    let total: usize = hits.iter().map(|s| s.load(Ordering::SeqCst)).sum();
    assert_eq!(total, 100);
    for (i, slot) in hits.iter().enumerate() {
        assert_eq!(slot.load(Ordering::SeqCst), 1, "task {i} must run once");
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn process_variant_replaces_and_runs() {
    let pool = Pool::new(config(2));
    pool.start();

    let hits = slots(8);
    let workload: Workload = (0..8)
        .map(|i| slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
        .collect();

    pool.process(workload).await.unwrap();

    for slot in hits.iter() {
        assert_eq!(slot.load(Ordering::SeqCst), 1);
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_joins_workers_and_stops_the_pool() {
    let pool = Pool::new(config(3));
    pool.start();

    let hits = slots(6);
    for i in 0..6 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }
    pool.process_workload().await.unwrap();

    pool.shutdown().await.unwrap();
    assert_eq!(pool.status(), Status::Stopped);
    assert!(!pool.is_started());

    // A stopped pool rejects new rounds.
    let res = pool.process_workload().await;
    assert!(matches!(res, Err(PoolError::NotStarted)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn propagate_with_trusted_tasks_completes_normally() {
    let mut cfg = config(2);
    cfg.on_failure = ErrorPolicy::Propagate;
    let pool = Pool::new(cfg);
    pool.start();

    let hits = slots(4);
    for i in 0..4 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }

    pool.process_workload().await.unwrap();
    for slot in hits.iter() {
        assert_eq!(slot.load(Ordering::SeqCst), 1);
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn propagate_failure_forfeits_the_round() {
    let mut cfg = config(2);
    cfg.on_failure = ErrorPolicy::Propagate;
    cfg.grace = Duration::from_millis(100);
    let pool = Pool::new(cfg);
    pool.start();

    let mut events = pool.events();

    let hits = slots(2);
    pool.append(failing_task("trusted-lie", Duration::ZERO))
        .unwrap();
    pool.append(slot_task("ok", Arc::clone(&hits), 1, Duration::ZERO))
        .unwrap();

    let handle = pool.process_workload();

    // The failing worker is lost, the active counter never drains, and only
    // shutdown can tear the round down.
    let res = pool.shutdown().await;
    assert!(matches!(res, Err(PoolError::GraceExceeded { .. })));
    assert!(matches!(handle.await, Err(PoolError::Interrupted)));
    assert_eq!(pool.status(), Status::Stopped);
    assert!(pool.task_errors().is_empty(), "Propagate captures nothing");

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::WorkerLost));
    assert!(kinds.contains(&EventKind::GraceExceeded));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn events_follow_the_round_lifecycle() {
    let pool = Pool::new(config(2));
    let mut events = pool.events();
    pool.start();

    let hits = slots(2);
    for i in 0..2 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }
    pool.process_workload().await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }

    let started = kinds.iter().position(|k| *k == EventKind::PoolStarted);
    let round_started = kinds.iter().position(|k| *k == EventKind::RoundStarted);
    let completed = kinds.iter().position(|k| *k == EventKind::RoundCompleted);
    assert!(started.is_some());
    assert!(round_started.is_some());
    assert!(completed.is_some());
    assert!(round_started < completed);

    pool.shutdown().await.unwrap();
}

struct RecordingSubscriber {
    seen: Mutex<Vec<EventKind>>,
}

#[async_trait::async_trait]
impl Subscribe for RecordingSubscriber {
    async fn on_event(&self, event: &tickpool::Event) {
        self.seen.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribers_receive_round_events() {
    let recorder = Arc::new(RecordingSubscriber {
        seen: Mutex::new(Vec::new()),
    });

    let pool = Pool::builder(config(2))
        .with_subscriber(Arc::clone(&recorder) as Arc<dyn Subscribe>)
        .build();
    pool.start();

    let hits = slots(3);
    for i in 0..3 {
        pool.append(slot_task("tick", Arc::clone(&hits), i, Duration::ZERO))
            .unwrap();
    }
    pool.process_workload().await.unwrap();

    // Fan-out is fire-and-forget; give the subscriber worker a beat.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let seen = recorder.seen.lock().unwrap().clone();
    assert!(seen.contains(&EventKind::RoundStarted));
    assert!(seen.contains(&EventKind::RoundCompleted));

    pool.shutdown().await.unwrap();
}
