//! Error types shared by every task in the crate.
//!
//! A task finishes in exactly one of two ways: it succeeds with an output
//! value or it fails with a [`TaskError`]. Combinators never invent their
//! own failure values; they carry a sub-task's error through unchanged or
//! report that an aggregate ran out of time.

use std::time::Duration;

use thiserror::Error;

/// Outcome of a single task invocation.
pub type TaskResult<T> = Result<T, TaskError>;

/// The failure side of a [`TaskResult`].
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task (or one of its sub-tasks) reported an application error.
    ///
    /// The underlying error is carried unchanged so callers can downcast
    /// it back to the concrete type the failing task reported.
    #[error("{0}")]
    Failure(Box<dyn std::error::Error + Send + Sync>),

    /// A parallel aggregate gave up waiting for its sub-tasks.
    #[error("parallel aggregate timed out after {0:?}")]
    Timeout(Duration),
}

impl TaskError {
    /// Wrap any error value as a task failure.
    pub fn failure<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TaskError::Failure(error.into())
    }

    /// `true` when the error came from an aggregate deadline rather than
    /// from a sub-task.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout(_))
    }
}
