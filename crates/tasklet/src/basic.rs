//! [`BasicTask`]: build a task from a closure.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::completion::Completion;
use crate::error::TaskResult;
use crate::task::Task;

type Action<I, O> = dyn Fn(I, Completion<O>) + Send + Sync;

/// A [`Task`] backed by a closure.
///
/// The closure receives the input and the [`Completion`] for that
/// invocation; how and where it produces the outcome is entirely up to it.
/// Cloning a `BasicTask` is cheap and shares the underlying action.
pub struct BasicTask<I, O> {
    action: Arc<Action<I, O>>,
}

impl<I, O> BasicTask<I, O> {
    /// Wrap an action that drives the completion by hand.
    ///
    /// This is the most general constructor: the action may deliver
    /// synchronously, hand the completion to another thread, or spawn
    /// whatever background work it needs.
    pub fn new<A>(action: A) -> Self
    where
        A: Fn(I, Completion<O>) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
        }
    }

    /// Wrap a synchronous function; its return value becomes the outcome.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> TaskResult<O> + Send + Sync + 'static,
    {
        Self::new(move |input, completion: Completion<O>| completion.resolve(f(input)))
    }

    /// Wrap an async function; each invocation spawns the future on the
    /// current tokio runtime and its output becomes the outcome.
    ///
    /// # Panics
    ///
    /// [`Task::perform`] panics if called outside a tokio runtime.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult<O>> + Send + 'static,
        O: Send + 'static,
    {
        Self::new(move |input, completion: Completion<O>| {
            let fut = f(input);
            tokio::spawn(async move {
                completion.resolve(fut.await);
            });
        })
    }
}

impl<I, O> Task<I, O> for BasicTask<I, O> {
    fn perform(&self, input: I, completion: Completion<O>) {
        (*self.action)(input, completion);
    }
}

impl<I, O> Clone for BasicTask<I, O> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
        }
    }
}

impl<I, O> fmt::Debug for BasicTask<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicTask").finish_non_exhaustive()
    }
}
