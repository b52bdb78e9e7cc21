//! Runtime evaluation of compiled expressions.

use crate::item::{Item, Value};

use super::compile::{ArithOp, CmpOp, StrMethod, TypedExpr};
use super::error::EvalError;

/// Walk a typed expression against one item.
///
/// The only runtime faults are reading an optional field the item does not
/// carry and integer division or remainder by zero. Everything else was
/// ruled out when the rule compiled.
pub(crate) fn evaluate(expr: &TypedExpr, item: &Item) -> Result<Value, EvalError> {
    match expr {
        TypedExpr::Const(value) => Ok(value.clone()),
        TypedExpr::Field(field) => field
            .get(item)
            .ok_or(EvalError::MissingField(field.name())),
        TypedExpr::Not(operand) => {
            let value = evaluate(operand, item)?;
            Ok(Value::Bool(!as_bool(&value)))
        }
        TypedExpr::Neg(operand) => {
            let value = evaluate(operand, item)?;
            Ok(match value {
                Value::Int(n) => Value::Int(n.wrapping_neg()),
                Value::Float(n) => Value::Float(-n),
                other => other,
            })
        }
        TypedExpr::And(lhs, rhs) => {
            if !as_bool(&evaluate(lhs, item)?) {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool(&evaluate(rhs, item)?)))
        }
        TypedExpr::Or(lhs, rhs) => {
            if as_bool(&evaluate(lhs, item)?) {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool(&evaluate(rhs, item)?)))
        }
        TypedExpr::Cmp { op, lhs, rhs } => {
            let lhs = evaluate(lhs, item)?;
            let rhs = evaluate(rhs, item)?;
            Ok(Value::Bool(compare(*op, &lhs, &rhs)))
        }
        TypedExpr::Arith { op, lhs, rhs } => {
            let lhs = evaluate(lhs, item)?;
            let rhs = evaluate(rhs, item)?;
            arith(*op, &lhs, &rhs)
        }
        TypedExpr::StrCall { method, recv, arg } => {
            let recv = evaluate(recv, item)?;
            let arg = evaluate(arg, item)?;
            let (Value::Str(haystack), Value::Str(needle)) = (&recv, &arg) else {
                // unreachable under typing
                return Ok(Value::Bool(false));
            };
            let result = match method {
                StrMethod::Contains => haystack.contains(needle.as_str()),
                StrMethod::StartsWith => haystack.starts_with(needle.as_str()),
                StrMethod::EndsWith => haystack.ends_with(needle.as_str()),
            };
            Ok(Value::Bool(result))
        }
    }
}

fn as_bool(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

// Lowering guarantees numeric operands here.
fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(n) => *n,
        _ => f64::NAN,
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> bool {
    use std::cmp::Ordering;

    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        (Value::Rarity(a), Value::Rarity(b)) => a.partial_cmp(b),
        _ => as_f64(lhs).partial_cmp(&as_f64(rhs)),
    };

    match op {
        CmpOp::Eq => ordering == Some(Ordering::Equal),
        CmpOp::Ne => ordering != Some(Ordering::Equal),
        CmpOp::Lt => ordering == Some(Ordering::Less),
        CmpOp::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ordering == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    }
}

/// Integer pairs stay integer, anything else promotes to float. Integer
/// division and remainder by zero fault; float division follows IEEE and
/// never does. Integer overflow wraps.
fn arith(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let n = match op {
            ArithOp::Add => a.wrapping_add(*b),
            ArithOp::Sub => a.wrapping_sub(*b),
            ArithOp::Mul => a.wrapping_mul(*b),
            ArithOp::Div => {
                if *b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.wrapping_div(*b)
            }
            ArithOp::Rem => {
                if *b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.wrapping_rem(*b)
            }
        };
        return Ok(Value::Int(n));
    }

    let a = as_f64(lhs);
    let b = as_f64(rhs);
    let n = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
        ArithOp::Rem => a % b,
    };
    Ok(Value::Float(n))
}
