// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Error handling for the analyzer.
//!
//! The core analysis itself is total over well-formed ASTs (`spec.md` §7): an unresolved name
//! substitutes the dynamic node, a function definition missing its declared name skips the
//! binding step, and any AST kind the walker doesn't special-case just recurses generically. None
//! of that is represented as a [`Result::Err`] anywhere in [`crate::walker`] or [`crate::graph`].
//!
//! [`AnalyzerError`] instead covers the handful of ways a *caller* can misuse the public API in a
//! way that deserves a typed error: building an [`crate::ast::Bindings`] table with a duplicate
//! declaration, or the saturation loop being cancelled mid-flight.

use std::time::Duration;
use std::time::Instant;

use thiserror::Error;

/// Errors a caller of this crate's API can encounter.
#[derive(Clone, Debug, Error)]
pub enum AnalyzerError {
    /// [`crate::ast::Bindings::declare`] was asked to create a second binding for a name that
    /// was already declared. The reference analysis does not model re-declaration (`spec.md`
    /// §3's "Invariants": "Re-declaration is not modeled"), so this is rejected rather than
    /// silently shadowing the earlier binding.
    #[error("name already declared: {0}")]
    DuplicateDeclaration(String),

    /// Saturation was aborted by a [`CancellationFlag`].
    #[error(transparent)]
    Cancelled(#[from] CancellationError),
}

/// Trait to signal that the execution is cancelled.
///
/// The propagation engine's worklist drain (`spec.md` §4.4) is the one part of this crate that
/// can, for a pathological or very large input, run for a long time before reaching the fixed
/// point; `FlowGraph::apply` checks this flag between work items so a long-running analysis can
/// be aborted cooperatively without corrupting the graph (the drain simply stops; everything
/// already saturated remains valid, since facts are only ever added, never retracted).
pub trait CancellationFlag {
    fn check(&self, at: &'static str) -> Result<(), CancellationError>;
}

pub struct NoCancellation;
impl CancellationFlag for NoCancellation {
    fn check(&self, _at: &'static str) -> Result<(), CancellationError> {
        Ok(())
    }
}

pub struct CancelAfterDuration {
    limit: Duration,
    start: Instant,
}

impl CancelAfterDuration {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            start: Instant::now(),
        }
    }
}

impl CancellationFlag for CancelAfterDuration {
    fn check(&self, at: &'static str) -> Result<(), CancellationError> {
        if self.start.elapsed() > self.limit {
            return Err(CancellationError(at));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Error)]
#[error("cancelled at \"{0}\"")]
pub struct CancellationError(pub &'static str);
