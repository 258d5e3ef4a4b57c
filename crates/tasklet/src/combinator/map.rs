//! Output transformation.

use std::sync::Arc;

use crate::basic::BasicTask;
use crate::completion::Completion;
use crate::error::TaskResult;
use crate::task::Task;

/// Transform a task's successful output with a plain function.
///
/// `transform` only runs on success; a failure passes through untouched.
pub(crate) fn map<I, O, P, T, F>(task: T, transform: F) -> BasicTask<I, P>
where
    T: Task<I, O> + 'static,
    F: Fn(O) -> P + Send + Sync + 'static,
    I: 'static,
    O: 'static,
    P: 'static,
{
    let task = Arc::new(task);
    let transform = Arc::new(transform);
    BasicTask::new(move |input: I, completion: Completion<P>| {
        let transform = Arc::clone(&transform);
        let link = Completion::from_fn(move |result: TaskResult<O>| {
            completion.resolve(result.map(|value| (*transform)(value)));
        });
        task.perform(input, link);
    })
}
