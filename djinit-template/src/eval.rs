//! Expression evaluation against a [`Lookup`] scope.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::context::Lookup;
use crate::error::ExprError;
use crate::expr::{CmpOp, Expr};
use crate::value::{is_truthy, type_name};

/// Evaluate `expr`, resolving names through `scope`.
pub fn evaluate<L: Lookup + ?Sized>(expr: &Expr, scope: &L) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Name(name) => scope
            .lookup(name)
            .cloned()
            .ok_or_else(|| ExprError::UndefinedName(name.clone())),
        Expr::Attr(target, name) => {
            let target = evaluate(target, scope)?;
            match target {
                Value::Object(mut map) => map.remove(name).ok_or_else(|| {
                    ExprError::MissingAttribute {
                        ty: "dict",
                        name: name.clone(),
                    }
                }),
                other => Err(ExprError::MissingAttribute {
                    ty: type_name(&other),
                    name: name.clone(),
                }),
            }
        }
        Expr::Index(target, index) => {
            let target = evaluate(target, scope)?;
            let index = evaluate(index, scope)?;
            subscript(target, &index)
        }
        Expr::Neg(inner) => match evaluate(inner, scope)? {
            Value::Number(n) => negate(&n),
            other => Err(ExprError::TypeMismatch {
                op: "unary -",
                left: type_name(&other),
                right: type_name(&other),
            }),
        },
        Expr::Not(inner) => Ok(Value::Bool(!is_truthy(&evaluate(inner, scope)?))),
        // `and`/`or` yield the operand that decided the result.
        Expr::And(left, right) => {
            let left = evaluate(left, scope)?;
            if !is_truthy(&left) {
                return Ok(left);
            }
            evaluate(right, scope)
        }
        Expr::Or(left, right) => {
            let left = evaluate(left, scope)?;
            if is_truthy(&left) {
                return Ok(left);
            }
            evaluate(right, scope)
        }
        Expr::Compare(op, left, right) => {
            let left = evaluate(left, scope)?;
            let right = evaluate(right, scope)?;
            compare(*op, &left, &right).map(Value::Bool)
        }
    }
}

/// Evaluate `expr` for a condition: its truthiness.
pub fn eval_condition<L: Lookup + ?Sized>(expr: &Expr, scope: &L) -> Result<bool, ExprError> {
    evaluate(expr, scope).map(|v| is_truthy(&v))
}

fn subscript(target: Value, index: &Value) -> Result<Value, ExprError> {
    match (target, index) {
        (Value::Object(mut map), Value::String(key)) => map
            .remove(key)
            .ok_or_else(|| ExprError::MissingKey(format!("'{key}'"))),
        (Value::Array(mut items), Value::Number(n)) => {
            let i = n.as_i64().ok_or_else(|| ExprError::TypeMismatch {
                op: "[]",
                left: "list",
                right: "float",
            })?;
            let pos = resolve_index(i, items.len())?;
            Ok(items.swap_remove(pos))
        }
        (Value::String(s), Value::Number(n)) => {
            let i = n.as_i64().ok_or_else(|| ExprError::TypeMismatch {
                op: "[]",
                left: "str",
                right: "float",
            })?;
            let chars: Vec<char> = s.chars().collect();
            let pos = resolve_index(i, chars.len())?;
            Ok(Value::String(chars[pos].to_string()))
        }
        (target, index) => Err(ExprError::TypeMismatch {
            op: "[]",
            left: type_name(&target),
            right: type_name(index),
        }),
    }
}

fn resolve_index(i: i64, len: usize) -> Result<usize, ExprError> {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let pos = if i < 0 { len_i + i } else { i };
    if pos < 0 || pos >= len_i {
        return Err(ExprError::IndexOutOfRange(i));
    }
    usize::try_from(pos).map_err(|_| ExprError::IndexOutOfRange(i))
}

fn negate(n: &Number) -> Result<Value, ExprError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Number(match i.checked_neg() {
            Some(neg) => neg.into(),
            None => i.unsigned_abs().into(),
        }));
    }
    if let Some(neg) = n.as_u64().and_then(|u| 0i64.checked_sub_unsigned(u)) {
        return Ok(Value::Number(neg.into()));
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(-f))
        .map(Value::Number)
        .ok_or_else(|| ExprError::InvalidNumber(n.to_string()))
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    match op {
        CmpOp::Eq => Ok(values_equal(left, right)),
        CmpOp::Ne => Ok(!values_equal(left, right)),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ordering = order(op, left, right)?;
            Ok(match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => l == r,
            _ => l.as_f64() == r.as_f64(),
        },
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        _ => left == right,
    }
}

fn order(op: CmpOp, left: &Value, right: &Value) -> Result<Ordering, ExprError> {
    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => l.as_f64().zip(r.as_f64()).and_then(|(l, r)| l.partial_cmp(&r)),
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    };
    ordering.ok_or(ExprError::TypeMismatch {
        op: op.symbol(),
        left: type_name(left),
        right: type_name(right),
    })
}

fn contains(container: &Value, needle: &Value) -> Result<bool, ExprError> {
    match (container, needle) {
        (Value::String(hay), Value::String(n)) => Ok(hay.contains(n.as_str())),
        (Value::Array(items), _) => Ok(items.iter().any(|item| values_equal(item, needle))),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        _ => Err(ExprError::TypeMismatch {
            op: "in",
            left: type_name(needle),
            right: type_name(container),
        }),
    }
}
