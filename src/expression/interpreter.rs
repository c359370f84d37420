//! Tree-walking evaluation of parsed expressions against a [`Scope`].
//!
//! The scope is the only addressable memory: identifiers resolve in it and
//! assignments write to it. Nested structures are read-only.

use std::rc::Rc;

use serde_json::{Map, Value as Json};

use super::EvalError;
use super::parser::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::value::{Value, type_name};
use crate::scope::Scope;

pub(crate) fn eval(expr: &Expr, scope: &mut Scope) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(json) => Ok(Value::Json(json.clone())),
        Expr::Undefined => Ok(Value::Undefined),
        Expr::Ident(name) => scope.get(name).cloned().ok_or_else(|| EvalError::UnresolvedIdentifier {
            name: name.clone(),
        }),
        Expr::Member(..) | Expr::Index(..) => eval_access(expr, scope),
        Expr::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval(item, scope)?.into_json());
            }
            Ok(Value::Json(Json::Array(values)))
        }
        Expr::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), eval(value, scope)?.into_json());
            }
            Ok(Value::Json(Json::Object(map)))
        }
        Expr::Unary(op, operand) => {
            let operand = eval(operand, scope)?;
            match op {
                UnaryOp::Not => Ok(Value::bool(!operand.is_truthy())),
                UnaryOp::Neg => numeric(-operand.to_number()),
                UnaryOp::Plus => numeric(operand.to_number()),
            }
        }
        Expr::Binary(op, left, right) => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            binary(*op, &left, &right)
        }
        Expr::Logical(op, left, right) => {
            let left = eval(left, scope)?;
            match (op, left.is_truthy()) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                _ => eval(right, scope),
            }
        }
        Expr::Conditional(test, consequent, alternate) => {
            if eval(test, scope)?.is_truthy() {
                eval(consequent, scope)
            } else {
                eval(alternate, scope)
            }
        }
        Expr::Assign(name, value) => {
            let value = eval(value, scope)?;
            scope.set(name.clone(), value.clone());
            Ok(value)
        }
        Expr::Sequence(statements) => {
            let mut last = Value::Undefined;
            for statement in statements {
                last = eval(statement, scope)?;
            }
            Ok(last)
        }
    }
}

/// One step of a member/index chain.
enum Access<'e> {
    Member(&'e str),
    Index(&'e Expr),
}

/// Evaluate a chain such as `rows[i].cells[0]`.
///
/// The chain is walked by reference from the base value, so only the value it
/// finally selects is copied. Key expressions are evaluated left to right after
/// the base.
fn eval_access(expr: &Expr, scope: &mut Scope) -> Result<Value, EvalError> {
    let mut accesses = Vec::new();
    let mut base = expr;
    loop {
        match base {
            Expr::Member(object, property) => {
                accesses.push(Access::Member(property.as_str()));
                base = object.as_ref();
            }
            Expr::Index(object, key) => {
                accesses.push(Access::Index(key.as_ref()));
                base = object.as_ref();
            }
            _ => break,
        }
    }
    accesses.reverse();

    let base = match base {
        Expr::Ident(name) => scope.get_shared(name).ok_or_else(|| EvalError::UnresolvedIdentifier {
            name: name.clone(),
        })?,
        other => Rc::new(eval(other, scope)?),
    };

    let mut keys = Vec::with_capacity(accesses.len());
    for access in accesses {
        keys.push(match access {
            Access::Member(property) => property.to_string(),
            Access::Index(key) => property_key(&eval(key, scope)?),
        });
    }

    walk(&base, &keys)
}

/// Follow `keys` from `base`, borrowing through objects and arrays.
fn walk(base: &Value, keys: &[String]) -> Result<Value, EvalError> {
    let Some((last, path)) = keys.split_last() else {
        return Ok(base.clone());
    };
    let Value::Json(root) = base else {
        return get_property(base, &keys[0]);
    };
    let mut current = root;

    for (depth, key) in path.iter().enumerate() {
        match child(current, key) {
            Some(next) => current = next,
            None => {
                let value = json_property(current, key)?;
                return keys[depth + 1..].iter().try_fold(value, |value, key| get_property(&value, key));
            }
        }
    }

    json_property(current, last)
}

/// Borrow a nested object entry or array element.
fn child<'j>(json: &'j Json, property: &str) -> Option<&'j Json> {
    match json {
        Json::Object(map) => map.get(property),
        Json::Array(items) => array_index(property).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Property access (`object.name` or `object[key]`).
fn get_property(object: &Value, property: &str) -> Result<Value, EvalError> {
    match object {
        Value::Json(json) => json_property(json, property),
        Value::Undefined => Err(EvalError::Type {
            message: format!("cannot read property '{property}' of undefined"),
        }),
    }
}

fn json_property(json: &Json, property: &str) -> Result<Value, EvalError> {
    match json {
        Json::Null => Err(EvalError::Type {
            message: format!("cannot read property '{property}' of null"),
        }),
        Json::Object(map) => Ok(map.get(property).cloned().map_or(Value::Undefined, Value::Json)),
        Json::Array(items) => {
            if property == "length" {
                return Ok(Value::Json(Json::from(items.len())));
            }
            Ok(array_index(property)
                .and_then(|i| items.get(i))
                .cloned()
                .map_or(Value::Undefined, Value::Json))
        }
        Json::String(s) => {
            if property == "length" {
                return Ok(Value::Json(Json::from(s.chars().count())));
            }
            Ok(array_index(property)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, Value::string))
        }
        Json::Bool(_) | Json::Number(_) => Ok(Value::Undefined),
    }
}

/// Canonical property key of an index value (`ToPropertyKey`).
fn property_key(key: &Value) -> String {
    key.to_text()
}

fn array_index(property: &str) -> Option<usize> {
    if property.len() > 1 && property.starts_with('0') {
        return None;
    }
    property.parse().ok()
}

fn numeric(n: f64) -> Result<Value, EvalError> {
    Value::number(n).ok_or_else(|| EvalError::Type {
        message: "arithmetic result is not a finite number".to_string(),
    })
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            if left.is_stringish() || right.is_stringish() {
                Ok(Value::string(left.to_text() + &right.to_text()))
            } else {
                numeric(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => numeric(left.to_number() - right.to_number()),
        BinaryOp::Mul => numeric(left.to_number() * right.to_number()),
        BinaryOp::Div => numeric(left.to_number() / right.to_number()),
        BinaryOp::Rem => numeric(left.to_number() % right.to_number()),
        BinaryOp::Lt => Ok(Value::bool(compare(left, right, |o| o.is_lt()))),
        BinaryOp::Le => Ok(Value::bool(compare(left, right, |o| o.is_le()))),
        BinaryOp::Gt => Ok(Value::bool(compare(left, right, |o| o.is_gt()))),
        BinaryOp::Ge => Ok(Value::bool(compare(left, right, |o| o.is_ge()))),
        BinaryOp::StrictEq => Ok(Value::bool(strict_equals(left, right))),
        BinaryOp::StrictNe => Ok(Value::bool(!strict_equals(left, right))),
        BinaryOp::LooseEq => Ok(Value::bool(loose_equals(left, right))),
        BinaryOp::LooseNe => Ok(Value::bool(!loose_equals(left, right))),
    }
}

/// Relational comparison: lexicographic for two strings, numeric otherwise.
/// Any comparison involving NaN is false.
fn compare(left: &Value, right: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Value::Json(Json::String(a)), Value::Json(Json::String(b))) = (left, right) {
        return accept(a.cmp(b));
    }
    left.to_number().partial_cmp(&right.to_number()).is_some_and(accept)
}

fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Json(Json::Number(a)), Value::Json(Json::Number(b))) => a.as_f64() == b.as_f64(),
        (Value::Json(a), Value::Json(b)) => type_name(a) == type_name(b) && a == b,
        _ => false,
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    if left.is_nullish() || right.is_nullish() {
        return left.is_nullish() && right.is_nullish();
    }
    match (left, right) {
        (Value::Json(a), Value::Json(b)) if type_name(a) == type_name(b) => strict_equals(left, right),
        (Value::Json(Json::Array(_) | Json::Object(_)), _)
        | (_, Value::Json(Json::Array(_) | Json::Object(_))) => left.to_text() == right.to_text(),
        _ => left.to_number() == right.to_number(),
    }
}
