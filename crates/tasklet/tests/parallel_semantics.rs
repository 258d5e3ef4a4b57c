//! Aggregate delivery semantics under races, timeouts, and custom
//! delivery contexts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use tasklet::{
    AggregateOptions, BasicTask, Completion, CompletionContext, DEFAULT_AGGREGATE_DEADLINE, Task,
    TaskError, TaskExt, parallel, parallel_with,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reduction_order_matches_submission_despite_completion_order() {
    // Task i sleeps longer for smaller i, so completion order is reversed.
    let tasks: Vec<BasicTask<(), usize>> = (0..5)
        .map(|i| {
            BasicTask::new(move |_: (), completion: Completion<usize>| {
                let delay = Duration::from_millis(10 * (5 - i) as u64);
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    completion.succeed(i);
                });
            })
        })
        .collect();
    let aggregate = parallel(tasks, |values| values);
    assert_eq!(
        aggregate.perform_async(()).await.unwrap(),
        vec![0, 1, 2, 3, 4]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_deliver_exactly_one_error() {
    let starter = Arc::new(Barrier::new(3));
    let tasks: Vec<BasicTask<(), u32>> = (0..3)
        .map(|i| {
            let starter = starter.clone();
            BasicTask::new(move |_: (), completion: Completion<u32>| {
                let starter = starter.clone();
                std::thread::spawn(move || {
                    starter.wait();
                    completion.fail(TaskError::failure(format!("worker {i} exploded")));
                });
            })
        })
        .collect();

    let successes = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let aggregate = parallel(tasks, |values: Vec<u32>| values);
    let completion = Completion::new(
        {
            let successes = successes.clone();
            move |_| {
                successes.fetch_add(1, Ordering::SeqCst);
            }
        },
        {
            let failures = failures.clone();
            move |_| {
                failures.fetch_add(1, Ordering::SeqCst);
            }
        },
    );
    aggregate.perform((), completion);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(successes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_default_deadline_fires_after_sixty_seconds() {
    let never = BasicTask::new(|_: (), completion: Completion<u32>| {
        tokio::spawn(async move {
            std::future::pending::<()>().await;
            drop(completion);
        });
    });
    let quick = BasicTask::from_fn(|_: ()| Ok(1));
    let aggregate = parallel(vec![never, quick], |values: Vec<u32>| values);
    let error = aggregate.perform_async(()).await.unwrap_err();
    assert!(matches!(error, TaskError::Timeout(d) if d == DEFAULT_AGGREGATE_DEADLINE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_success_after_failure_is_ignored() {
    let fail_now: BasicTask<(), u32> =
        BasicTask::from_fn(|_| Err(TaskError::failure("fast failure")));
    let succeed_later = BasicTask::new(|_: (), completion: Completion<u32>| {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            completion.succeed(7);
        });
    });
    let outcomes = Arc::new(AtomicUsize::new(0));
    let joined = fail_now.in_parallel(succeed_later, |a, b| a + b);
    let completion = {
        let outcomes = outcomes.clone();
        Completion::from_fn(move |result| {
            outcomes.fetch_add(1, Ordering::SeqCst);
            assert!(result.is_err());
        })
    };
    joined.perform((), completion);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(outcomes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_outcome_delivers_on_the_designated_runtime() {
    let main = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let delivery = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("delivery-runtime")
        .enable_all()
        .build()
        .unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    main.block_on(async {
        let tasks: Vec<BasicTask<u32, u32>> = (0..3)
            .map(|_| BasicTask::from_fn(|v: u32| Ok(v)))
            .collect();
        let options = AggregateOptions::new()
            .with_context(CompletionContext::Runtime(delivery.handle().clone()));
        let aggregate = parallel_with(tasks, options, |values: Vec<u32>| values.len());
        let completion = Completion::from_fn(move |result| {
            let thread = std::thread::current().name().map(str::to_owned);
            tx.send((thread, result.map_err(|e| e.to_string()))).unwrap();
        });
        aggregate.perform(5, completion);
    });

    let (thread, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.unwrap(), 3);
    assert_eq!(thread.as_deref(), Some("delivery-runtime"));
}

#[tokio::test]
async fn test_inline_context_delivers_before_perform_returns_for_empty_list() {
    let delivered = Arc::new(AtomicUsize::new(0));
    let options = AggregateOptions::new().with_context(CompletionContext::Inline);
    let aggregate = parallel_with(Vec::<BasicTask<(), u32>>::new(), options, |v: Vec<u32>| {
        v.len()
    });
    let completion = {
        let delivered = delivered.clone();
        Completion::from_fn(move |result| {
            assert_eq!(result.unwrap(), 0);
            delivered.fetch_add(1, Ordering::SeqCst);
        })
    };
    aggregate.perform((), completion);
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_latency_heterogeneous_join() {
    let user_id = BasicTask::from_async(|name: String| async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        Ok(name.len() as u64)
    });
    let normalized = BasicTask::from_fn(|name: String| Ok(name.to_lowercase()));
    let profile = user_id.in_parallel(normalized, |id, name: String| format!("{name}#{id}"));
    assert_eq!(
        profile.perform_async("Fernando".to_string()).await.unwrap(),
        "fernando#8"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aggregates_nest_inside_chains() {
    let double = BasicTask::from_fn(|n: u32| Ok(n * 2));
    let triple = BasicTask::from_fn(|n: u32| Ok(n * 3));
    let fan = parallel(vec![double, triple], |values: Vec<u32>| {
        values.iter().sum::<u32>()
    });
    let pipeline = fan.map(|total| total + 1);
    assert_eq!(pipeline.perform_async(4).await.unwrap(), 21);
}
