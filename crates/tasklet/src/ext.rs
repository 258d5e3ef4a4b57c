//! Chainable combinator methods for every [`Task`].

use std::future::Future;
use std::sync::Arc;

use crate::basic::BasicTask;
use crate::combinator::{self, AggregateOptions};
use crate::completion::Completion;
use crate::error::{TaskError, TaskResult};
use crate::task::{SharedTask, Task};

/// Combinator methods available on every sized [`Task`].
///
/// The methods consume `self`, which keeps chains free of lifetime
/// plumbing; clone first (or go through [`TaskExt::shared`]) to keep
/// using the original task.
pub trait TaskExt<I, O>: Task<I, O> + Sized + 'static {
    /// Feed this task's output into `next`.
    ///
    /// If this task fails, `next` never starts and the failure is
    /// delivered unchanged.
    fn then<P, N>(self, next: N) -> BasicTask<I, P>
    where
        N: Task<O, P> + 'static,
        I: 'static,
        O: 'static,
        P: 'static,
    {
        combinator::then(self, next)
    }

    /// Transform this task's successful output with a plain function.
    fn map<P, F>(self, transform: F) -> BasicTask<I, P>
    where
        F: Fn(O) -> P + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        P: 'static,
    {
        combinator::map(self, transform)
    }

    /// Run this task and `other` concurrently on the same input and
    /// reduce their outputs into one value.
    ///
    /// Output types may differ; `reduce` always receives this task's
    /// output first.
    fn in_parallel<U, V, N, F>(self, other: N, reduce: F) -> BasicTask<I, V>
    where
        N: Task<I, U> + 'static,
        F: Fn(O, U) -> V + Send + Sync + 'static,
        I: Clone + Send + 'static,
        O: Send + 'static,
        U: Send + 'static,
        V: 'static,
    {
        combinator::in_parallel(self, other, reduce)
    }

    /// [`TaskExt::in_parallel`] with explicit [`AggregateOptions`].
    fn in_parallel_with<U, V, N, F>(
        self,
        other: N,
        options: AggregateOptions,
        reduce: F,
    ) -> BasicTask<I, V>
    where
        N: Task<I, U> + 'static,
        F: Fn(O, U) -> V + Send + Sync + 'static,
        I: Clone + Send + 'static,
        O: Send + 'static,
        U: Send + 'static,
        V: 'static,
    {
        combinator::in_parallel_with(self, other, options, reduce)
    }

    /// Erase the concrete type behind a cheap shared handle.
    fn shared(self) -> SharedTask<I, O>
    where
        I: 'static,
        O: 'static,
    {
        Arc::new(self)
    }

    /// Perform once and await the outcome instead of supplying callbacks.
    ///
    /// The task starts before this function returns; the future merely
    /// waits for delivery. If the task drops its completion without
    /// delivering, the future resolves to a failure rather than pending
    /// forever.
    fn perform_async(&self, input: I) -> impl Future<Output = TaskResult<O>> + Send
    where
        O: Send + 'static,
    {
        let (completion, receiver) = Completion::channel();
        self.perform(input, completion);
        async move {
            match receiver.await {
                Ok(result) => result,
                Err(_closed) => Err(TaskError::failure(
                    "task dropped its completion without delivering an outcome",
                )),
            }
        }
    }
}

impl<I, O, T> TaskExt<I, O> for T where T: Task<I, O> + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_method_chain_reads_left_to_right() {
        let pipeline = BasicTask::from_fn(|n: u32| Ok(n + 1))
            .map(|n| n * 2)
            .then(BasicTask::from_fn(|n: u32| Ok(format!("{n}"))));
        assert_eq!(pipeline.perform_async(4).await.unwrap(), "10");
    }

    #[tokio::test]
    async fn test_in_parallel_method_mixes_output_types() {
        let length = BasicTask::from_fn(|s: String| Ok(s.len()));
        let upper = BasicTask::from_fn(|s: String| Ok(s.to_uppercase()));
        let combined = length.in_parallel(upper, |len, text: String| format!("{text}:{len}"));
        assert_eq!(
            combined.perform_async("abc".to_string()).await.unwrap(),
            "ABC:3"
        );
    }

    #[tokio::test]
    async fn test_shared_tasks_compose_without_moving() {
        let base = BasicTask::from_fn(|n: u32| Ok(n * 2)).shared();
        let once = base.clone().map(|n| n + 1);
        let twice = base.then(BasicTask::from_fn(|n: u32| Ok(n + 2)));
        assert_eq!(once.perform_async(5).await.unwrap(), 11);
        assert_eq!(twice.perform_async(5).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_perform_async_surfaces_dropped_completion() {
        let broken = BasicTask::new(|_: u32, completion: Completion<u32>| {
            drop(completion);
        });
        let error = broken.perform_async(1).await.unwrap_err();
        assert!(error.to_string().contains("without delivering"));
    }
}
