// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The AST contract the seeding walker consumes.
//!
//! Parsing and constructing this tree is out of scope for this crate — a real embedding would
//! build it from a JavaScript parser's own tree, after resolving unqualified identifiers to
//! declaration sites. This module defines the minimal shape the walker needs so the analysis is
//! independently testable, and so the `cli` feature has something to deserialize from JSON.

use std::fmt;
use std::fmt::Debug;

use crate::arena::fresh_id;

/// A program-unique identity for a declared binding (a `function` statement's name, or a `var`
/// declaration's name).
///
/// Equality and hashing are identity, not spelling: two `Name`s are equal only if they were
/// minted by the same [`Bindings::declare`] call. `spec.md` §3 is explicit about this ("Equality
/// is identity, not spelling") because two variables named `x` in different scopes must not be
/// confused with one another.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name {
    id: std::num::NonZeroU32,
}

impl Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name(#{})", self.id)
    }
}

/// Mints fresh [`Name`]s and remembers the human-readable spelling used when declaring each one,
/// purely for diagnostics (`Debug`/CLI display) — spelling never participates in `Name` equality.
#[derive(Default)]
pub struct Bindings {
    spellings: std::collections::HashMap<u32, String>,
}

impl Bindings {
    pub fn new() -> Bindings {
        Bindings::default()
    }

    /// Declares a fresh binding with the given spelling. Every call returns a distinct [`Name`],
    /// even if the spelling repeats (shadowing and re-declaration are a scoping concern the
    /// embedder resolves before building this tree; `spec.md` doesn't model it, see
    /// `error::AnalyzerError::DuplicateDeclaration` for the one place this crate rejects a
    /// caller trying to reuse a `Name` value itself).
    pub fn declare<S: Into<String>>(&mut self, spelling: S) -> Name {
        let id = fresh_id();
        self.spellings.insert(id.get(), spelling.into());
        Name { id }
    }

    pub fn spelling(&self, name: Name) -> &str {
        self.spellings
            .get(&name.id.get())
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }
}

/// A binary operation. Only assignment and logical-or get dedicated seeding rules (`spec.md`
/// §4.3); everything else is modeled opaquely as `Other` and recursed into generically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    /// `lhs = rhs`
    Assign,
    /// `a || b`
    LogicalOr,
    /// Any other binary operator (`+`, `===`, `instanceof`, ...) — modeled as an opaque
    /// value-producing operation.
    Other,
}

/// A function definition, optionally carrying a declared name (an anonymous function expression
/// has none).
pub struct FunctionDef {
    pub name: Option<Name>,
    pub body: Vec<Ast>,
}

/// The label of an object-literal property: an identifier, a string literal, or (for a computed
/// key like `{ [k]: v }`) an arbitrary expression.
pub enum PropertyLabel {
    Identifier(String),
    StringLiteral(String),
    Computed(Box<Ast>),
}

pub struct Property {
    pub label: PropertyLabel,
    pub value: Ast,
}

pub struct ObjectLiteral {
    pub properties: Vec<Property>,
}

/// `var name = init?`. `init`, if present, is still walked (for its side effects elsewhere in
/// the program) — but per the preserved reference behavior (`spec.md` §9), its result is *not*
/// connected into `name`'s node. See [`crate::walker::seed`]'s `Ast::VarDecl` arm.
pub struct VarDecl {
    pub name: Name,
    pub init: Option<Box<Ast>>,
}

/// The AST kinds the seeding walker recognizes, plus a generic catch-all for everything else.
///
/// `spec.md` §3 describes "name reference (identifier, optionally qualified by another
/// expression)" as a single conceptual construct; this crate represents the unqualified and
/// qualified cases as two distinct variants (`Identifier` and `Member`) because they carry
/// different payloads (a resolved binding vs. a member-name string) and keeping them separate
/// makes the walker's match arms line up directly with `spec.md` §4.3's rule list.
pub enum Ast {
    Binary {
        op: BinOp,
        left: Box<Ast>,
        right: Box<Ast>,
    },
    Function(FunctionDef),
    Object(ObjectLiteral),
    VarDecl(VarDecl),
    /// An unqualified name reference. `None` models a reference to a name with no binding (an
    /// undeclared or out-of-scope identifier) — `spec.md` §7's "unknown-name" case.
    Identifier(Option<Name>),
    /// A qualified reference `object.name`.
    Member { object: Box<Ast>, name: String },
    /// An array/index access `object[index]`.
    Index { object: Box<Ast>, index: Box<Ast> },
    StringLiteral(String),
    /// A sequence of statements — used for function bodies and the program root.
    Block(Vec<Ast>),
    /// Any construct the walker doesn't special-case (`if`, loops, `try`, calls, `return`,
    /// `throw`, ...). The walker recurses into `children` generically and contributes nothing
    /// of its own (`spec.md` §4.3's "Any other construct" rule, §7's "unmodeled-construct").
    Other(Vec<Ast>),
}
