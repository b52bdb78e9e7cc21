//! Untyped AST produced by the parser, before name resolution and type
//! checking.

use std::fmt;

/// An expression node. `offset` is the byte offset used for diagnostics: the
/// operator for unary/binary nodes, the method name for calls, the token
/// start otherwise.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr {
    pub kind: ExprKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExprKind {
    /// String literal: `"Chaos Orb"`
    Str(String),

    /// Integer literal: `6`
    Int(i64),

    /// Float literal: `1.5`
    Float(f64),

    /// Boolean literal: `true` / `false`
    Bool(bool),

    /// Bare identifier: a schema field or a rarity name, resolved later.
    Ident(String),

    /// `!expr` or `-expr`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `lhs op rhs`
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Method call: `BaseName.Contains("Essence")`
    MethodCall {
        recv: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not, // !
    Neg, // -
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,  // ||
    And, // &&
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Le,  // <=
    Gt,  // >
    Ge,  // >=
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Rem, // %
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Or => write!(f, "||"),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::Ne => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Ge => write!(f, ">="),
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Rem => write!(f, "%"),
        }
    }
}
