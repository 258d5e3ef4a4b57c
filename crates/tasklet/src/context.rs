//! Where aggregate outcomes are delivered.
//!
//! Parallel aggregates collect sub-task outcomes on whatever threads those
//! sub-tasks complete on, then hand the combined outcome to a completion
//! context. This keeps delivery off arbitrary worker threads unless the
//! caller explicitly opts in with [`CompletionContext::Inline`].

use tokio::runtime::Handle;

/// Execution context on which a parallel aggregate delivers its outcome.
#[derive(Clone, Debug, Default)]
pub enum CompletionContext {
    /// Deliver on the tokio runtime that was current when `perform` ran.
    #[default]
    Caller,
    /// Deliver inline on whichever thread determined the outcome.
    Inline,
    /// Deliver on a specific runtime.
    Runtime(Handle),
}

impl CompletionContext {
    /// Pin the context down to something dispatchable.
    ///
    /// `Caller` is resolved against the runtime current at perform time,
    /// not at delivery time.
    pub(crate) fn resolve(&self) -> ResolvedContext {
        match self {
            CompletionContext::Caller => ResolvedContext::Runtime(Handle::current()),
            CompletionContext::Inline => ResolvedContext::Inline,
            CompletionContext::Runtime(handle) => ResolvedContext::Runtime(handle.clone()),
        }
    }
}

/// A context with `Caller` already pinned to a concrete runtime.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedContext {
    Inline,
    Runtime(Handle),
}

impl ResolvedContext {
    /// Run `deliver` on this context.
    pub(crate) fn dispatch<F>(&self, deliver: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            ResolvedContext::Inline => deliver(),
            ResolvedContext::Runtime(handle) => {
                handle.spawn(async move { deliver() });
            }
        }
    }
}
