// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! JSON surface syntax for [`crate::ast::Ast`], gated behind the `serde` feature.
//!
//! [`crate::ast::Name`] is an opaque, arena-minted identity — it can't be deserialized directly,
//! since there's nothing in a JSON document that *is* a `Name`. Instead, declarations and
//! references in the JSON surface syntax name bindings by an arbitrary string id, and
//! [`lower`] resolves those strings to real [`crate::ast::Name`]s as it walks the document: the
//! first `FunctionDef`/`VarDecl` to declare a given id mints a fresh binding, and an `Identifier`
//! referencing an id that was never declared lowers to `None` (`spec.md` §7's "unknown-name"
//! case) rather than an error. This is a deliberately simple resolver — real scope rules
//! (shadowing, hoisting, block scoping) are exactly the "AST construction" concern `spec.md` §1
//! places out of scope; it exists only so the demonstration CLI (`crate::bin`) has something to
//! load a program from.

use std::collections::HashMap;

use serde::Deserialize;

use crate::ast;
use crate::error::AnalyzerError;

#[derive(Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum JsonBinOp {
    Assign,
    LogicalOr,
    Other,
}

impl From<JsonBinOp> for ast::BinOp {
    fn from(op: JsonBinOp) -> ast::BinOp {
        match op {
            JsonBinOp::Assign => ast::BinOp::Assign,
            JsonBinOp::LogicalOr => ast::BinOp::LogicalOr,
            JsonBinOp::Other => ast::BinOp::Other,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "label_kind", rename_all = "snake_case")]
pub enum JsonPropertyLabel {
    Identifier { name: String },
    StringLiteral { value: String },
    Computed { expr: Box<JsonAst> },
}

#[derive(Deserialize)]
pub struct JsonProperty {
    pub label: JsonPropertyLabel,
    pub value: JsonAst,
}

/// The on-disk JSON representation of [`crate::ast::Ast`]. Field names and the `kind` tag are
/// chosen for readability in hand-written test fixtures, not to mirror any particular
/// JavaScript-AST standard (ESTree and friends are a much larger surface than this analysis
/// needs).
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonAst {
    Binary {
        op: JsonBinOp,
        left: Box<JsonAst>,
        right: Box<JsonAst>,
    },
    Function {
        name: Option<String>,
        body: Vec<JsonAst>,
    },
    Object {
        properties: Vec<JsonProperty>,
    },
    VarDecl {
        name: String,
        init: Option<Box<JsonAst>>,
    },
    Identifier {
        name: String,
    },
    Member {
        object: Box<JsonAst>,
        name: String,
    },
    Index {
        object: Box<JsonAst>,
        index: Box<JsonAst>,
    },
    StringLiteral {
        value: String,
    },
    Block {
        body: Vec<JsonAst>,
    },
    Other {
        children: Vec<JsonAst>,
    },
}

/// Resolves string binding ids to [`ast::Name`]s as it lowers [`JsonAst`] into [`ast::Ast`].
#[derive(Default)]
struct Resolver {
    bindings: ast::Bindings,
    by_id: HashMap<String, ast::Name>,
}

impl Resolver {
    fn declare(&mut self, id: &str) -> Result<ast::Name, AnalyzerError> {
        if self.by_id.contains_key(id) {
            return Err(AnalyzerError::DuplicateDeclaration(id.to_string()));
        }
        let name = self.bindings.declare(id.to_string());
        self.by_id.insert(id.to_string(), name);
        Ok(name)
    }

    fn resolve(&self, id: &str) -> Option<ast::Name> {
        self.by_id.get(id).copied()
    }
}

/// Lowers a [`JsonAst`] document into [`ast::Ast`], returning the [`ast::Bindings`] table that
/// owns the `Name`s it minted along the way (needed later to print human-readable spellings in
/// CLI output).
pub fn lower(root: &JsonAst) -> Result<(ast::Ast, ast::Bindings), AnalyzerError> {
    let mut resolver = Resolver::default();
    let ast = lower_node(root, &mut resolver)?;
    Ok((ast, resolver.bindings))
}

fn lower_node(node: &JsonAst, resolver: &mut Resolver) -> Result<ast::Ast, AnalyzerError> {
    Ok(match node {
        JsonAst::Binary { op, left, right } => ast::Ast::Binary {
            op: (*op).into(),
            left: Box::new(lower_node(left, resolver)?),
            right: Box::new(lower_node(right, resolver)?),
        },
        JsonAst::Function { name, body } => {
            let name = name.as_deref().map(|id| resolver.declare(id)).transpose()?;
            let body = body
                .iter()
                .map(|n| lower_node(n, resolver))
                .collect::<Result<_, _>>()?;
            ast::Ast::Function(ast::FunctionDef { name, body })
        }
        JsonAst::Object { properties } => {
            let properties = properties
                .iter()
                .map(|p| {
                    Ok(ast::Property {
                        label: match &p.label {
                            JsonPropertyLabel::Identifier { name } => {
                                ast::PropertyLabel::Identifier(name.clone())
                            }
                            JsonPropertyLabel::StringLiteral { value } => {
                                ast::PropertyLabel::StringLiteral(value.clone())
                            }
                            JsonPropertyLabel::Computed { expr } => {
                                ast::PropertyLabel::Computed(Box::new(lower_node(expr, resolver)?))
                            }
                        },
                        value: lower_node(&p.value, resolver)?,
                    })
                })
                .collect::<Result<_, AnalyzerError>>()?;
            ast::Ast::Object(ast::ObjectLiteral { properties })
        }
        JsonAst::VarDecl { name, init } => {
            let name = resolver.declare(name)?;
            let init = init
                .as_deref()
                .map(|n| lower_node(n, resolver))
                .transpose()?
                .map(Box::new);
            ast::Ast::VarDecl(ast::VarDecl { name, init })
        }
        JsonAst::Identifier { name } => ast::Ast::Identifier(resolver.resolve(name)),
        JsonAst::Member { object, name } => ast::Ast::Member {
            object: Box::new(lower_node(object, resolver)?),
            name: name.clone(),
        },
        JsonAst::Index { object, index } => ast::Ast::Index {
            object: Box::new(lower_node(object, resolver)?),
            index: Box::new(lower_node(index, resolver)?),
        },
        JsonAst::StringLiteral { value } => ast::Ast::StringLiteral(value.clone()),
        JsonAst::Block { body } => ast::Ast::Block(
            body.iter()
                .map(|n| lower_node(n, resolver))
                .collect::<Result<_, _>>()?,
        ),
        JsonAst::Other { children } => ast::Ast::Other(
            children
                .iter()
                .map(|n| lower_node(n, resolver))
                .collect::<Result<_, _>>()?,
        ),
    })
}
