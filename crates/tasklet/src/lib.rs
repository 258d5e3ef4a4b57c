//! # tasklet
//!
//! Composable asynchronous units of work.
//!
//! A [`Task`] transforms an input into an output and reports the outcome
//! through a single-use [`Completion`] callback instead of a return
//! value. That one contract is enough to compose small tasks into larger
//! ones:
//!
//! - **Sequencing** with [`TaskExt::then`]: feed one task's output into
//!   the next, short-circuiting on failure.
//! - **Mapping** with [`TaskExt::map`]: reshape a task's output with a
//!   plain function.
//! - **Parallel aggregation** with [`parallel`]: run a list of tasks
//!   concurrently and reduce their outputs in submission order.
//! - **Heterogeneous joins** with [`TaskExt::in_parallel`]: run two tasks
//!   with different output types and combine the results.
//!
//! Composites are tasks themselves, so every combinator nests freely.
//!
//! ## Quick start
//!
//! ```rust
//! use tasklet::{BasicTask, TaskExt, TaskResult};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fetch_name = BasicTask::from_async(|_: ()| async { Ok("Fernando".to_string()) });
//! let greet = BasicTask::from_fn(|name: String| -> TaskResult<String> {
//!     Ok(format!("Hello {name}!"))
//! });
//!
//! let greeting = fetch_name.then(greet);
//! assert_eq!(greeting.perform_async(()).await.unwrap(), "Hello Fernando!");
//! # }
//! ```
//!
//! ## Delivery guarantees
//!
//! Every invocation delivers exactly one outcome: success or failure,
//! never both, never twice. Parallel aggregates keep that guarantee even
//! when several sub-tasks fail at once, and they fail with
//! [`TaskError::Timeout`] instead of hanging when a sub-task never calls
//! back. See [`AggregateOptions`] for the deadline and delivery-context
//! knobs.

pub mod basic;
pub mod combinator;
pub mod completion;
pub mod context;
pub mod error;
pub mod ext;
pub mod prelude;
pub mod task;

pub use basic::BasicTask;
pub use combinator::{AggregateOptions, DEFAULT_AGGREGATE_DEADLINE, parallel, parallel_with};
pub use completion::Completion;
pub use context::CompletionContext;
pub use error::{TaskError, TaskResult};
pub use ext::TaskExt;
pub use task::{SharedTask, Task};
