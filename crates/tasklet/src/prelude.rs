//! Prelude module for common task imports
//!
//! This module provides a convenient way to import the most commonly used
//! types and traits for building and composing tasks.
//!
//! # Usage
//!
//! ```rust
//! use tasklet::prelude::*;
//!
//! // Now you have access to the task trait, combinators, and error types
//! ```

// Core task types
pub use crate::{BasicTask, Completion, SharedTask, Task, TaskExt};

// Outcome types
pub use crate::{TaskError, TaskResult};

// Parallel aggregation
pub use crate::{
    AggregateOptions, CompletionContext, DEFAULT_AGGREGATE_DEADLINE, parallel, parallel_with,
};

// Additional commonly used types
pub use std::sync::Arc;
