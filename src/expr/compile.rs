//! Type-checked compilation of parsed expressions.
//!
//! Lowering resolves identifiers against the item schema, checks operand
//! types, and rejects anything that cannot be evaluated. A rule that
//! compiles can only fail at match time for the two runtime faults:
//! reading an absent optional field and integer division by zero.

use crate::item::{Field, Item, Rarity, Value, ValueKind};

use super::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use super::error::{EvalError, ParseError};
use super::{eval, parser};

/// A compiled rule expression, ready to evaluate against items.
#[derive(Debug, Clone)]
pub struct Predicate {
    root: TypedExpr,
}

impl Predicate {
    /// Evaluate the predicate against one item.
    pub fn eval(&self, item: &Item) -> Result<bool, EvalError> {
        Ok(matches!(
            eval::evaluate(&self.root, item)?,
            Value::Bool(true)
        ))
    }
}

/// Compile one rule block into a typed predicate.
///
/// Errors carry the byte offset of the offending token or operator within
/// `source`.
pub fn compile(source: &str) -> Result<Predicate, ParseError> {
    let expr = parser::parse(source)?;
    let (root, kind) = lower(&expr)?;
    if kind != ValueKind::Bool {
        return Err(ParseError::new(
            format!("rule must evaluate to true or false, found {kind}"),
            expr.offset,
        ));
    }
    Ok(Predicate { root })
}

/// Expression tree after identifier resolution and type checking.
#[derive(Debug, Clone)]
pub(crate) enum TypedExpr {
    Const(Value),
    Field(Field),
    Not(Box<TypedExpr>),
    Neg(Box<TypedExpr>),
    And(Box<TypedExpr>, Box<TypedExpr>),
    Or(Box<TypedExpr>, Box<TypedExpr>),
    Cmp {
        op: CmpOp,
        lhs: Box<TypedExpr>,
        rhs: Box<TypedExpr>,
    },
    Arith {
        op: ArithOp,
        lhs: Box<TypedExpr>,
        rhs: Box<TypedExpr>,
    },
    StrCall {
        method: StrMethod,
        recv: Box<TypedExpr>,
        arg: Box<TypedExpr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// String predicates, resolved from the method name without regard to case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrMethod {
    Contains,
    StartsWith,
    EndsWith,
}

impl StrMethod {
    fn resolve(name: &str) -> Option<StrMethod> {
        if name.eq_ignore_ascii_case("contains") {
            return Some(StrMethod::Contains);
        }
        if name.eq_ignore_ascii_case("startswith") {
            return Some(StrMethod::StartsWith);
        }
        if name.eq_ignore_ascii_case("endswith") {
            return Some(StrMethod::EndsWith);
        }
        None
    }

    fn name(self) -> &'static str {
        match self {
            StrMethod::Contains => "Contains",
            StrMethod::StartsWith => "StartsWith",
            StrMethod::EndsWith => "EndsWith",
        }
    }
}

fn lower(expr: &Expr) -> Result<(TypedExpr, ValueKind), ParseError> {
    match &expr.kind {
        ExprKind::Str(s) => Ok((TypedExpr::Const(Value::Str(s.clone())), ValueKind::Str)),
        ExprKind::Int(n) => Ok((TypedExpr::Const(Value::Int(*n)), ValueKind::Int)),
        ExprKind::Float(n) => Ok((TypedExpr::Const(Value::Float(*n)), ValueKind::Float)),
        ExprKind::Bool(b) => Ok((TypedExpr::Const(Value::Bool(*b)), ValueKind::Bool)),
        ExprKind::Ident(name) => lower_ident(name, expr.offset),
        ExprKind::Unary { op, operand } => lower_unary(*op, operand, expr.offset),
        ExprKind::Binary { op, lhs, rhs } => lower_binary(*op, lhs, rhs, expr.offset),
        ExprKind::MethodCall { recv, method, args } => {
            lower_method(recv, method, args, expr.offset)
        }
    }
}

/// Identifiers resolve to item fields first, then to bare rarity names
/// (`Unique`).
fn lower_ident(name: &str, offset: usize) -> Result<(TypedExpr, ValueKind), ParseError> {
    if let Some(field) = Field::resolve(name) {
        return Ok((TypedExpr::Field(field), field.kind()));
    }
    if let Some(rarity) = Rarity::from_name(name) {
        return Ok((TypedExpr::Const(Value::Rarity(rarity)), ValueKind::Rarity));
    }
    Err(ParseError::new(
        format!("unknown identifier `{name}`"),
        offset,
    ))
}

fn lower_unary(
    op: UnaryOp,
    operand: &Expr,
    offset: usize,
) -> Result<(TypedExpr, ValueKind), ParseError> {
    let (inner, kind) = lower(operand)?;
    match op {
        UnaryOp::Not => {
            if kind != ValueKind::Bool {
                return Err(ParseError::new(
                    format!("operator `{op}` expects a boolean, found {kind}"),
                    offset,
                ));
            }
            Ok((TypedExpr::Not(Box::new(inner)), ValueKind::Bool))
        }
        UnaryOp::Neg => {
            if !kind.is_numeric() {
                return Err(ParseError::new(
                    format!("operator `{op}` expects a number, found {kind}"),
                    offset,
                ));
            }
            Ok((TypedExpr::Neg(Box::new(inner)), kind))
        }
    }
}

fn lower_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    offset: usize,
) -> Result<(TypedExpr, ValueKind), ParseError> {
    let (lhs_t, lk) = lower(lhs)?;
    let (rhs_t, rk) = lower(rhs)?;
    let lhs = Box::new(lhs_t);
    let rhs = Box::new(rhs_t);

    let node = match op {
        BinaryOp::And | BinaryOp::Or => {
            if let Some(kind) = [lk, rk].into_iter().find(|k| *k != ValueKind::Bool) {
                return Err(ParseError::new(
                    format!("operator `{op}` expects boolean operands, found {kind}"),
                    offset,
                ));
            }
            if op == BinaryOp::And {
                TypedExpr::And(lhs, rhs)
            } else {
                TypedExpr::Or(lhs, rhs)
            }
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            if lk != rk && !(lk.is_numeric() && rk.is_numeric()) {
                return Err(ParseError::new(
                    format!("cannot compare {lk} and {rk} with `{op}`"),
                    offset,
                ));
            }
            let op = if op == BinaryOp::Eq { CmpOp::Eq } else { CmpOp::Ne };
            TypedExpr::Cmp { op, lhs, rhs }
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordered = (lk.is_numeric() && rk.is_numeric())
                || (lk == ValueKind::Rarity && rk == ValueKind::Rarity);
            if !ordered {
                return Err(ParseError::new(
                    format!("operator `{op}` expects numbers or rarities, found {lk} and {rk}"),
                    offset,
                ));
            }
            let op = match op {
                BinaryOp::Lt => CmpOp::Lt,
                BinaryOp::Le => CmpOp::Le,
                BinaryOp::Gt => CmpOp::Gt,
                _ => CmpOp::Ge,
            };
            TypedExpr::Cmp { op, lhs, rhs }
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            if !(lk.is_numeric() && rk.is_numeric()) {
                return Err(ParseError::new(
                    format!("operator `{op}` expects numeric operands, found {lk} and {rk}"),
                    offset,
                ));
            }
            let kind = if lk == ValueKind::Int && rk == ValueKind::Int {
                ValueKind::Int
            } else {
                ValueKind::Float
            };
            let op = match op {
                BinaryOp::Add => ArithOp::Add,
                BinaryOp::Sub => ArithOp::Sub,
                BinaryOp::Mul => ArithOp::Mul,
                BinaryOp::Div => ArithOp::Div,
                _ => ArithOp::Rem,
            };
            return Ok((TypedExpr::Arith { op, lhs, rhs }, kind));
        }
    };
    Ok((node, ValueKind::Bool))
}

fn lower_method(
    recv: &Expr,
    method: &str,
    args: &[Expr],
    offset: usize,
) -> Result<(TypedExpr, ValueKind), ParseError> {
    let Some(resolved) = StrMethod::resolve(method) else {
        return Err(ParseError::new(
            format!("unknown method `{method}`; expected Contains, StartsWith or EndsWith"),
            offset,
        ));
    };

    let (recv_t, recv_kind) = lower(recv)?;
    if recv_kind != ValueKind::Str {
        return Err(ParseError::new(
            format!(
                "method `{}` is only available on strings, found {recv_kind}",
                resolved.name()
            ),
            offset,
        ));
    }

    let [arg] = args else {
        return Err(ParseError::new(
            format!("method `{}` takes exactly one string argument", resolved.name()),
            offset,
        ));
    };
    let (arg_t, arg_kind) = lower(arg)?;
    if arg_kind != ValueKind::Str {
        return Err(ParseError::new(
            format!(
                "method `{}` takes a string argument, found {arg_kind}",
                resolved.name()
            ),
            arg.offset,
        ));
    }

    Ok((
        TypedExpr::StrCall {
            method: resolved,
            recv: Box::new(recv_t),
            arg: Box::new(arg_t),
        },
        ValueKind::Bool,
    ))
}
