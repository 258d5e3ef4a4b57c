//! Binary parallel aggregation over differently-typed outputs.

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

/// Run two tasks concurrently and reduce their outputs into one value,
/// with the default [`AggregateOptions`].
pub(crate) fn in_parallel<I, A, B, R, TA, TB, F>(left: TA, right: TB, reduce: F) -> BasicTask<I, R>
where
    TA: Task<I, A> + 'static,
    TB: Task<I, B> + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
    I: Clone + Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    R: 'static,
{
    in_parallel_with(left, right, AggregateOptions::default(), reduce)
}

/// Run two tasks concurrently and reduce their two outputs into one value.
///
/// Same rules as [`parallel_with`](super::parallel_with), with the pair of
/// outputs kept positional: `reduce` always receives the left task's
/// output first, regardless of which task finished first.
pub(crate) fn in_parallel_with<I, A, B, R, TA, TB, F>(
    left: TA,
    right: TB,
    options: AggregateOptions,
    reduce: F,
) -> BasicTask<I, R>
where
    TA: Task<I, A> + 'static,
    TB: Task<I, B> + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
    I: Clone + Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    R: 'static,
{
    let left = Arc::new(left);
    let right = Arc::new(right);
    let reduce = Arc::new(reduce);
    BasicTask::new(move |input: I, completion: Completion<R>| {
        let context = options.context.resolve();
        let reduce = Arc::clone(&reduce);
        let runtime = Handle::current();
        let (pair, signal) = Pair::new(completion);

        {
            let left = Arc::clone(&left);
            let input = input.clone();
            let pair = Arc::clone(&pair);
            runtime.spawn(async move {
                let record = Completion::from_fn(move |result| pair.record_left(result));
                left.perform(input, record);
            });
        }
        {
            let right = Arc::clone(&right);
            let pair = Arc::clone(&pair);
            runtime.spawn(async move {
                let record = Completion::from_fn(move |result| pair.record_right(result));
                right.perform(input, record);
            });
        }

        let deadline = options.deadline;
        runtime.spawn(async move {
            match tokio::time::timeout(deadline, signal).await {
                Ok(Ok(Verdict::Complete)) => {
                    let (a, b) = pair.collect();
                    match pair.gate.take() {
                        Some(completion) => {
                            debug!("parallel pair complete");
                            context.dispatch(move || completion.succeed((*reduce)(a, b)));
                        }
                        None => trace!("pair outcome already delivered; discarding results"),
                    }
                }
                Ok(Ok(Verdict::Aborted)) => {
                    // A failure already delivered the outcome from its own thread.
                }
                Ok(Err(_closed)) => {
                    trace!("record handles vanished without a verdict");
                }
                Err(_elapsed) => match pair.gate.take() {
                    Some(completion) => {
                        warn!(timeout = ?deadline, "parallel pair timed out");
                        context.dispatch(move || completion.fail(TaskError::Timeout(deadline)));
                    }
                    None => trace!("deadline raced a delivered outcome; nothing to do"),
                },
            }
        });
    })
}

/// Shared state for one in-flight pair invocation. Same discipline as the
/// N-ary aggregate, with the two slots kept individually typed.
struct Pair<A, B, R> {
    slots: Mutex<(Option<A>, Option<B>)>,
    remaining: AtomicUsize,
    gate: OutcomeGate<R>,
    done: Mutex<Option<oneshot::Sender<Verdict>>>,
}

impl<A, B, R> Pair<A, B, R> {
    fn new(completion: Completion<R>) -> (Arc<Self>, oneshot::Receiver<Verdict>) {
        let (tx, rx) = oneshot::channel();
        let pair = Arc::new(Self {
            slots: Mutex::new((None, None)),
            remaining: AtomicUsize::new(2),
            gate: OutcomeGate::new(completion),
            done: Mutex::new(Some(tx)),
        });
        (pair, rx)
    }

    fn record_left(&self, result: TaskResult<A>) {
        match result {
            Ok(value) => {
                if self.gate.is_spent() {
                    trace!("late left success ignored after the pair outcome");
                } else {
                    trace!("left sub-task succeeded");
                }
                self.slots.lock().unwrap().0 = Some(value);
                self.finish_one();
            }
            Err(error) => self.abort("left", error),
        }
    }

    fn record_right(&self, result: TaskResult<B>) {
        match result {
            Ok(value) => {
                if self.gate.is_spent() {
                    trace!("late right success ignored after the pair outcome");
                } else {
                    trace!("right sub-task succeeded");
                }
                self.slots.lock().unwrap().1 = Some(value);
                self.finish_one();
            }
            Err(error) => self.abort("right", error),
        }
    }

    fn finish_one(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.signal(Verdict::Complete);
        }
    }

    fn abort(&self, side: &'static str, error: TaskError) {
        match self.gate.take() {
            Some(completion) => {
                debug!(error = %error, "{side} sub-task failed; aborting the pair");
                completion.fail(error);
                self.signal(Verdict::Aborted);
            }
            None => trace!("{side} sub-task failed after the pair outcome"),
        }
    }

    fn signal(&self, verdict: Verdict) {
        if let Some(done) = self.done.lock().unwrap().take() {
            let _ = done.send(verdict);
        }
    }

    /// Both slots are present once `remaining` hit zero.
    fn collect(&self) -> (A, B) {
        let mut slots = self.slots.lock().unwrap();
        let a = slots
            .0
            .take()
            .expect("left slot missing after completion signal");
        let b = slots
            .1
            .take()
            .expect("right slot missing after completion signal");
        (a, b)
    }
}
