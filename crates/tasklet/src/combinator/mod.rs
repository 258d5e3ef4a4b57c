//! Combinators for composing tasks.
//!
//! Everything here produces a new [`BasicTask`](crate::BasicTask) that
//! drives its sub-tasks according to one composition rule:
//!
//! - [`TaskExt::then`](crate::TaskExt::then) runs two tasks in sequence,
//!   feeding the first output into the second task.
//! - [`TaskExt::map`](crate::TaskExt::map) transforms a task's output with
//!   a plain function.
//! - [`parallel`] runs a uniform list of tasks concurrently and reduces
//!   the outputs, in submission order, into one value.
//! - [`TaskExt::in_parallel`](crate::TaskExt::in_parallel) runs two
//!   differently-typed tasks concurrently and reduces their two outputs
//!   into one value.
//!
//! The parallel forms have `_with` variants taking [`AggregateOptions`]
//! for callers that need a non-default delivery context or deadline.

mod join;
mod map;
mod parallel;
mod then;

pub use parallel::{parallel, parallel_with};

pub(crate) use join::{in_parallel, in_parallel_with};
pub(crate) use map::map;
pub(crate) use then::then;

use std::sync::Mutex;
use std::time::Duration;

use crate::completion::Completion;
use crate::context::CompletionContext;

/// How long an aggregate waits for its sub-tasks before giving up.
///
/// Sub-tasks are arbitrary callback-driven work; one that never calls
/// back would otherwise pin the aggregate's completion forever.
pub const DEFAULT_AGGREGATE_DEADLINE: Duration = Duration::from_secs(60);

/// Tuning knobs for [`parallel_with`] and
/// [`TaskExt::in_parallel_with`](crate::TaskExt::in_parallel_with).
#[derive(Clone, Debug)]
pub struct AggregateOptions {
    /// Where the aggregate outcome is delivered.
    pub context: CompletionContext,
    /// How long to wait for all sub-tasks before failing with
    /// [`TaskError::Timeout`](crate::TaskError::Timeout).
    pub deadline: Duration,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            context: CompletionContext::default(),
            deadline: DEFAULT_AGGREGATE_DEADLINE,
        }
    }
}

impl AggregateOptions {
    /// Options with the default context and deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver the aggregate outcome on `context`.
    pub fn with_context(mut self, context: CompletionContext) -> Self {
        self.context = context;
        self
    }

    /// Fail the aggregate if sub-tasks are still pending after `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Guards an aggregate's completion so that exactly one outcome fires.
///
/// Whichever path claims the completion first (all-success, first
/// failure, or the deadline) delivers it; every later path gets `None`
/// and stands down.
pub(crate) struct OutcomeGate<O> {
    slot: Mutex<Option<Completion<O>>>,
}

impl<O> OutcomeGate<O> {
    pub(crate) fn new(completion: Completion<O>) -> Self {
        Self {
            slot: Mutex::new(Some(completion)),
        }
    }

    /// Claim the completion, if no other path has claimed it yet.
    pub(crate) fn take(&self) -> Option<Completion<O>> {
        self.slot.lock().unwrap().take()
    }

    /// `true` once some path has claimed the completion.
    pub(crate) fn is_spent(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}

/// What the record path tells the deadline waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Every sub-task succeeded; collect and deliver.
    Complete,
    /// A failure already claimed the outcome; stand down.
    Aborted,
}
