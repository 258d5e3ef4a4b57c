//! N-ary parallel aggregation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::basic::BasicTask;
use crate::completion::Completion;
use crate::error::{TaskError, TaskResult};
use crate::task::Task;

use super::{AggregateOptions, OutcomeGate, Verdict};

/// Run a list of tasks concurrently and reduce their outputs into one
/// value, with the default [`AggregateOptions`].
pub fn parallel<I, O, R, T, F>(tasks: Vec<T>, reduce: F) -> BasicTask<I, R>
where
    T: Task<I, O> + 'static,
    F: Fn(Vec<O>) -> R + Send + Sync + 'static,
    I: Clone + Send + 'static,
    O: Send + 'static,
    R: 'static,
{
    parallel_with(tasks, AggregateOptions::default(), reduce)
}

/// Run a list of tasks concurrently and reduce their outputs into one
/// value.
///
/// Every sub-task receives a clone of the same input and starts
/// immediately. Outputs are collected by each task's position in `tasks`,
/// so the `Vec` handed to `reduce` lines up with the submission order no
/// matter which sub-task finishes first.
///
/// The first sub-task failure becomes the aggregate outcome and is
/// delivered promptly from the thread that reported it; the remaining
/// sub-tasks keep running but can no longer affect the outcome. If
/// sub-tasks are still pending once `options.deadline` has passed, the
/// aggregate fails with [`TaskError::Timeout`]. Successful reduction is
/// delivered on `options.context`.
///
/// An empty `tasks` list succeeds immediately with `reduce(Vec::new())`.
///
/// # Panics
///
/// [`Task::perform`] panics if called outside a tokio runtime.
pub fn parallel_with<I, O, R, T, F>(
    tasks: Vec<T>,
    options: AggregateOptions,
    reduce: F,
) -> BasicTask<I, R>
where
    T: Task<I, O> + 'static,
    F: Fn(Vec<O>) -> R + Send + Sync + 'static,
    I: Clone + Send + 'static,
    O: Send + 'static,
    R: 'static,
{
    let tasks: Vec<Arc<T>> = tasks.into_iter().map(Arc::new).collect();
    let reduce = Arc::new(reduce);
    BasicTask::new(move |input: I, completion: Completion<R>| {
        let context = options.context.resolve();
        let reduce = Arc::clone(&reduce);
        if tasks.is_empty() {
            context.dispatch(move || completion.succeed((*reduce)(Vec::new())));
            return;
        }

        trace!(task_count = tasks.len(), "starting parallel aggregate");
        let runtime = Handle::current();
        let (aggregate, signal) = Aggregate::new(tasks.len(), completion);

        for (index, task) in tasks.iter().enumerate() {
            let task = Arc::clone(task);
            let input = input.clone();
            let aggregate = Arc::clone(&aggregate);
            runtime.spawn(async move {
                let record = Completion::from_fn(move |result| aggregate.record(index, result));
                task.perform(input, record);
            });
        }

        let deadline = options.deadline;
        runtime.spawn(async move {
            match tokio::time::timeout(deadline, signal).await {
                Ok(Ok(Verdict::Complete)) => {
                    let values = aggregate.collect();
                    match aggregate.gate.take() {
                        Some(completion) => {
                            debug!(task_count = values.len(), "parallel aggregate complete");
                            context.dispatch(move || completion.succeed((*reduce)(values)));
                        }
                        None => trace!("aggregate outcome already delivered; discarding results"),
                    }
                }
                Ok(Ok(Verdict::Aborted)) => {
                    // A failure already delivered the outcome from its own thread.
                }
                Ok(Err(_closed)) => {
                    trace!("all record handles vanished without a verdict");
                }
                Err(_elapsed) => match aggregate.gate.take() {
                    Some(completion) => {
                        warn!(
                            timeout = ?deadline,
                            pending = aggregate.remaining.load(Ordering::Acquire),
                            "parallel aggregate timed out"
                        );
                        context.dispatch(move || completion.fail(TaskError::Timeout(deadline)));
                    }
                    None => trace!("deadline raced a delivered outcome; nothing to do"),
                },
            }
        });
    })
}

/// Shared state for one in-flight parallel invocation.
///
/// Success outputs land in `slots` under the sub-task's submission index.
/// `remaining` counts sub-tasks that have not yet succeeded; the record
/// call that brings it to zero signals the waiter. Failures bypass the
/// count entirely and race for the gate instead.
struct Aggregate<O, R> {
    slots: Mutex<Vec<Option<O>>>,
    remaining: AtomicUsize,
    gate: OutcomeGate<R>,
    done: Mutex<Option<oneshot::Sender<Verdict>>>,
}

impl<O, R> Aggregate<O, R> {
    fn new(count: usize, completion: Completion<R>) -> (Arc<Self>, oneshot::Receiver<Verdict>) {
        let (tx, rx) = oneshot::channel();
        let aggregate = Arc::new(Self {
            slots: Mutex::new((0..count).map(|_| None).collect()),
            remaining: AtomicUsize::new(count),
            gate: OutcomeGate::new(completion),
            done: Mutex::new(Some(tx)),
        });
        (aggregate, rx)
    }

    /// Record one sub-task outcome. Runs on whatever thread the sub-task
    /// completed on.
    fn record(&self, index: usize, result: TaskResult<O>) {
        match result {
            Ok(value) => {
                if self.gate.is_spent() {
                    trace!(slot = index, "sub-task succeeded after the aggregate outcome");
                } else {
                    trace!(slot = index, "sub-task succeeded");
                }
                self.slots.lock().unwrap()[index] = Some(value);
                if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    self.signal(Verdict::Complete);
                }
            }
            Err(error) => match self.gate.take() {
                Some(completion) => {
                    debug!(slot = index, error = %error, "sub-task failed; aborting the aggregate");
                    completion.fail(error);
                    self.signal(Verdict::Aborted);
                }
                None => {
                    trace!(slot = index, "sub-task failed after the aggregate outcome");
                }
            },
        }
    }

    fn signal(&self, verdict: Verdict) {
        if let Some(done) = self.done.lock().unwrap().take() {
            // The waiter may have timed out and gone away already.
            let _ = done.send(verdict);
        }
    }

    /// Drain the slots. Only called after `remaining` hit zero, so every
    /// slot holds a value.
    fn collect(&self) -> Vec<O> {
        self.slots
            .lock()
            .unwrap()
            .drain(..)
            .map(|slot| slot.expect("aggregate slot missing after completion signal"))
            .collect()
    }
}
