// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! `flow-graphs` computes, for every declared name in a JavaScript-like program, the set of
//! function literals and object members that may flow into it.
//!
//! The analysis is a flow-insensitive, field-sensitive points-to analysis: statement order within
//! a scope is ignored, but object member names are tracked individually rather than collapsed
//! into a single "any field" fact. It's expressed as an incremental graph saturation, not as a
//! classic fixed-point-over-sets solver:
//!
//! - A [`graph::FlowGraph`] is a set of [`graph::Node`]s, each an abstract value (a function
//!   literal, an object literal, a variable, a member, a parameter, a return value, or the single
//!   process-wide "dynamic" sink that absorbs anything whose key or identity can't be resolved
//!   statically).
//! - [`walker::seed`] performs a single pre-order traversal of the program's AST, creating nodes
//!   and `connect-to` edges from the syntactic constructs it recognizes (assignment, function
//!   definitions, object literals, name references, indexing, variable declarations, `||`).
//! - [`engine`] drains a worklist of deferred propagation callbacks until nothing changes. Once
//!   two nodes are connected, the engine lazily mirrors any future structural growth (a new
//!   function, a new member, a new parameter, a new return value, a new dynamic member) from
//!   source to sink, and in some cases symmetrically.
//!
//! Downstream tree-shaking (deciding what to delete) is out of scope for this crate: it reads the
//! saturated graph's per-[`ast::Name`] function and member sets and does the actual pruning.

pub mod arena;
#[macro_use]
mod debugging;
pub mod ast;
#[cfg(feature = "serde")]
pub mod ast_json;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interner;
pub mod walker;

pub use error::CancelAfterDuration;
pub use error::CancellationError;
pub use error::CancellationFlag;
pub use error::NoCancellation;
