// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The AST seeding walker (`spec.md` §4.3): a single pre-order traversal that primes a
//! [`FlowGraph`] with the nodes and edges its syntactic constructs imply.
//!
//! The walker maintains one piece of per-call state, threaded through recursive calls rather
//! than stored on `self`: the list of [`Handle<Node>`]s produced by evaluating the
//! most-recently-visited expression (`spec.md` calls this `resultNodes`). A small inline vector
//! is enough since almost every construct produces zero or one node; `||` is the only rule that
//! can produce more.

use smallvec::SmallVec;
use smallvec::smallvec;

use crate::arena::Handle;
use crate::ast::Ast;
use crate::ast::BinOp;
use crate::ast::PropertyLabel;
use crate::graph::FlowGraph;
use crate::graph::Node;
use crate::engine::Worklist;

/// The nodes produced by evaluating one expression. Almost always zero or one entry.
type ResultNodes = SmallVec<[Handle<Node>; 2]>;

/// Seeds `graph` from `root`, the program's entry-point AST node. This is the "walker primes the
/// graph" half of [`FlowGraph::apply`][crate::graph::FlowGraph::apply]; the caller still needs to
/// drain `worklist` to reach the fixed point.
pub fn seed(graph: &mut FlowGraph, worklist: &mut Worklist, root: &Ast) {
    visit(graph, worklist, root);
}

fn union(a: ResultNodes, b: ResultNodes) -> ResultNodes {
    let mut result = a;
    for handle in b {
        if !result.contains(&handle) {
            result.push(handle);
        }
    }
    result
}

/// Visits every element of `children` in order, discarding each result but the last — this is
/// the "recurse into children with the default traversal" rule `spec.md` §4.3 gives both `Block`
/// and `Other`, and the body-traversal half of the `Function` rule.
fn visit_children(graph: &mut FlowGraph, worklist: &mut Worklist, children: &[Ast]) -> ResultNodes {
    let mut last = ResultNodes::new();
    for child in children {
        last = visit(graph, worklist, child);
    }
    last
}

fn visit(graph: &mut FlowGraph, worklist: &mut Worklist, node: &Ast) -> ResultNodes {
    match node {
        Ast::Binary { op: BinOp::Assign, left, right } => {
            let l = visit(graph, worklist, left);
            let r = visit(graph, worklist, right);
            for &l in &l {
                for &r in &r {
                    graph.connect_to(worklist, r, l);
                }
            }
            // Left as produced: an assignment used as a sub-expression yields the assigned-to
            // node(s), matching JavaScript's own `(lhs = rhs)` expression value.
            l
        }
        Ast::Binary { op: BinOp::LogicalOr, left, right } => {
            let a = visit(graph, worklist, left);
            let b = visit(graph, worklist, right);
            union(a, b)
        }
        Ast::Binary { op: BinOp::Other, left, right } => {
            visit(graph, worklist, left);
            visit(graph, worklist, right)
        }
        Ast::Function(def) => {
            let n = graph.create_function_node(def.name);
            graph.add_function(worklist, n, n);
            visit_children(graph, worklist, &def.body);
            smallvec![n]
        }
        Ast::Object(object) => {
            let n = graph.create_object_node();
            for property in &object.properties {
                match &property.label {
                    PropertyLabel::Identifier(s) | PropertyLabel::StringLiteral(s) => {
                        let values = visit(graph, worklist, &property.value);
                        let member = graph.get_member(worklist, n, s);
                        for v in values {
                            graph.connect_to(worklist, v, member);
                        }
                    }
                    PropertyLabel::Computed(key_expr) => {
                        visit(graph, worklist, key_expr);
                        let values = visit(graph, worklist, &property.value);
                        let dynamic = graph.get_dynamic_member(worklist, n);
                        for v in values {
                            graph.connect_to(worklist, v, dynamic);
                        }
                    }
                }
            }
            smallvec![n]
        }
        Ast::VarDecl(decl) => {
            graph.create_variable_node(decl.name);
            // The initializer is still walked, for whatever side effects it has elsewhere in the
            // program, but its result is deliberately *not* connected into the declared node's
            // node — the reference analysis this crate reproduces has this gap (`spec.md` §9),
            // and it's preserved verbatim rather than silently fixed.
            if let Some(init) = &decl.init {
                visit(graph, worklist, init);
            }
            ResultNodes::new()
        }
        Ast::Identifier(name) => {
            let resolved = name.and_then(|n| graph.node_for_name(n));
            match resolved {
                Some(n) => smallvec![n],
                None => {
                    copious_debugging!("unresolved identifier, substituting dynamic node");
                    smallvec![graph.dynamic_node()]
                }
            }
        }
        Ast::Member { object, name } => {
            let objects = visit(graph, worklist, object);
            let mut result = ResultNodes::new();
            for q in objects {
                let member = graph.get_member(worklist, q, name);
                if !result.contains(&member) {
                    result.push(member);
                }
            }
            result
        }
        Ast::Index { object, index } => {
            let objects = visit(graph, worklist, object);
            let mut result = ResultNodes::new();
            if let Ast::StringLiteral(s) = index.as_ref() {
                for a in objects {
                    let member = graph.get_member(worklist, a, s);
                    if !result.contains(&member) {
                        result.push(member);
                    }
                }
            } else {
                visit(graph, worklist, index);
                for a in objects {
                    let member = graph.get_dynamic_member(worklist, a);
                    if !result.contains(&member) {
                        result.push(member);
                    }
                }
            }
            result
        }
        Ast::StringLiteral(_) => ResultNodes::new(),
        Ast::Block(statements) => visit_children(graph, worklist, statements),
        Ast::Other(children) => {
            copious_debugging!("unmodeled construct, recursing generically");
            visit_children(graph, worklist, children)
        }
    }
}
