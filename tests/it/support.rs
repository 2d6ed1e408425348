// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Small builders for hand-writing `Ast` fixtures without spelling out every enum variant at
//! each call site.

#![allow(dead_code)]

use flow_graphs::ast::Ast;
use flow_graphs::ast::BinOp;
use flow_graphs::ast::FunctionDef;
use flow_graphs::ast::Name;
use flow_graphs::ast::ObjectLiteral;
use flow_graphs::ast::Property;
use flow_graphs::ast::PropertyLabel;
use flow_graphs::ast::VarDecl;

pub fn func(name: Option<Name>, body: Vec<Ast>) -> Ast {
    Ast::Function(FunctionDef { name, body })
}

pub fn var(name: Name, init: Option<Ast>) -> Ast {
    Ast::VarDecl(VarDecl {
        name,
        init: init.map(Box::new),
    })
}

pub fn id(name: Option<Name>) -> Ast {
    Ast::Identifier(name)
}

pub fn member(object: Ast, name: &str) -> Ast {
    Ast::Member {
        object: Box::new(object),
        name: name.to_string(),
    }
}

pub fn index(object: Ast, index: Ast) -> Ast {
    Ast::Index {
        object: Box::new(object),
        index: Box::new(index),
    }
}

pub fn assign(lhs: Ast, rhs: Ast) -> Ast {
    Ast::Binary {
        op: BinOp::Assign,
        left: Box::new(lhs),
        right: Box::new(rhs),
    }
}

pub fn or(a: Ast, b: Ast) -> Ast {
    Ast::Binary {
        op: BinOp::LogicalOr,
        left: Box::new(a),
        right: Box::new(b),
    }
}

pub fn string(s: &str) -> Ast {
    Ast::StringLiteral(s.to_string())
}

pub fn object(properties: Vec<(&str, Ast)>) -> Ast {
    Ast::Object(ObjectLiteral {
        properties: properties
            .into_iter()
            .map(|(label, value)| Property {
                label: PropertyLabel::Identifier(label.to_string()),
                value,
            })
            .collect(),
    })
}

pub fn block(statements: Vec<Ast>) -> Ast {
    Ast::Block(statements)
}
