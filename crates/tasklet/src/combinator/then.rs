//! Sequential composition.

use std::sync::Arc;

use crate::basic::BasicTask;
use crate::completion::Completion;
use crate::error::TaskResult;
use crate::task::Task;

/// Chain two tasks: the first task's output becomes the second's input.
///
/// If the first task fails, the second never starts and the failure is
/// delivered unchanged as the chain's outcome.
pub(crate) fn then<I, M, O, A, B>(first: A, second: B) -> BasicTask<I, O>
where
    A: Task<I, M> + 'static,
    B: Task<M, O> + 'static,
    I: 'static,
    M: 'static,
    O: 'static,
{
    let first = Arc::new(first);
    let second = Arc::new(second);
    BasicTask::new(move |input: I, completion: Completion<O>| {
        let second = Arc::clone(&second);
        let link = Completion::from_fn(move |result: TaskResult<M>| match result {
            Ok(intermediate) => second.perform(intermediate, completion),
            Err(error) => completion.fail(error),
        });
        first.perform(input, link);
    })
}
