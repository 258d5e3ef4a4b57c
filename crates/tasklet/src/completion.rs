//! Single-use completion handles.
//!
//! A [`Completion`] is the write side of one task invocation: the task
//! calls [`Completion::succeed`] or [`Completion::fail`] exactly once, and
//! the handle consumes itself in the process. Move semantics make a second
//! delivery unrepresentable, which is what lets combinators treat every
//! sub-task outcome as trustworthy.

use tokio::sync::oneshot;
use tracing::warn;

use crate::error::{TaskError, TaskResult};

/// Write-once handle through which a task reports its outcome.
#[must_use = "a completion must be delivered with `succeed`, `fail`, or `resolve`"]
pub struct Completion<O> {
    deliver: Option<Box<dyn FnOnce(TaskResult<O>) + Send>>,
}

impl<O> Completion<O> {
    /// Build a completion from separate success and error callbacks.
    ///
    /// Exactly one of the two callbacks runs, whichever matches the outcome
    /// the task delivers.
    pub fn new<S, E>(on_success: S, on_error: E) -> Self
    where
        S: FnOnce(O) + Send + 'static,
        E: FnOnce(TaskError) + Send + 'static,
    {
        Self::from_fn(move |result| match result {
            Ok(value) => on_success(value),
            Err(error) => on_error(error),
        })
    }

    /// Build a completion from a single continuation over the whole
    /// [`TaskResult`].
    pub fn from_fn<F>(deliver: F) -> Self
    where
        F: FnOnce(TaskResult<O>) + Send + 'static,
    {
        Self {
            deliver: Some(Box::new(deliver)),
        }
    }

    /// Build a completion wired to a oneshot receiver.
    ///
    /// Dropping the completion undelivered closes the channel, so the
    /// receiver observes a recv error instead of waiting forever.
    pub fn channel() -> (Self, oneshot::Receiver<TaskResult<O>>)
    where
        O: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let completion = Self::from_fn(move |result| {
            // The receiver side may already be gone; nothing left to notify.
            let _ = tx.send(result);
        });
        (completion, rx)
    }

    /// Deliver a successful output.
    pub fn succeed(self, value: O) {
        self.resolve(Ok(value));
    }

    /// Deliver a failure.
    pub fn fail(self, error: TaskError) {
        self.resolve(Err(error));
    }

    /// Deliver a ready-made result.
    pub fn resolve(mut self, result: TaskResult<O>) {
        if let Some(deliver) = self.deliver.take() {
            deliver(result);
        }
    }
}

impl<O> Drop for Completion<O> {
    fn drop(&mut self) {
        if self.deliver.is_some() {
            warn!("completion dropped without delivering an outcome");
        }
    }
}

impl<O> std::fmt::Debug for Completion<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("delivered", &self.deliver.is_none())
            .finish()
    }
}
