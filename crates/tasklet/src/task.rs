//! The core [`Task`] abstraction.

use std::sync::Arc;

use crate::completion::Completion;

/// An asynchronous unit of work from `I` to `O`.
///
/// [`Task::perform`] hands the input to the task together with a
/// [`Completion`] through which the task reports exactly one outcome.
/// Delivery may happen synchronously before `perform` returns or from
/// another thread later; callers must not assume either.
///
/// A task is passive. Nothing runs until `perform` is called, and every
/// call is an independent invocation with its own completion.
pub trait Task<I, O>: Send + Sync {
    /// Start one invocation of this task.
    fn perform(&self, input: I, completion: Completion<O>);
}

/// A reference-counted, type-erased task.
///
/// Useful for storing heterogeneous task implementations in one
/// collection, e.g. the task list handed to [`crate::parallel`].
pub type SharedTask<I, O> = Arc<dyn Task<I, O>>;

impl<I, O, T> Task<I, O> for Arc<T>
where
    T: Task<I, O> + ?Sized,
{
    fn perform(&self, input: I, completion: Completion<O>) {
        (**self).perform(input, completion)
    }
}

impl<I, O, T> Task<I, O> for Box<T>
where
    T: Task<I, O> + ?Sized,
{
    fn perform(&self, input: I, completion: Completion<O>) {
        (**self).perform(input, completion)
    }
}
