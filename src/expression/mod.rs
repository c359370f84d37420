//! Embedded evaluator for template expressions.
//!
//! Directive values and `{{ }}` markers contain expressions written for the
//! client-side runtime. At build time only a small, safe subset is interpreted:
//!
//! - literals: numbers, quoted strings, `true`, `false`, `null`, `undefined`,
//!   array `[a, b]` and object `{key: value}` literals
//! - identifiers (`[A-Za-z_$][A-Za-z0-9_$]*`), member access `a.b`, index access `a[b]`,
//!   `.length` on arrays and strings
//! - unary `! - +`, arithmetic `* / % + -`, comparisons `< <= > >= == != === !==`,
//!   short-circuit `&&` and `||`, the conditional operator `a ? b : c`
//! - assignment to a plain identifier (`item = items[i]`) and statement sequences
//!   (`a = 1; b = 2; a + b`)
//!
//! The [`Scope`] passed in is the only memory an expression can reach. Anything
//! outside the subset (function calls, filters written with `|`, bitwise
//! operators) fails with an [`EvalError`], which callers treat as "leave this for
//! the client".
//!
//! # Examples
//!
//! ```rust
//! use ng_expander::expression::{Value, evaluate};
//! use ng_expander::scope::Scope;
//! use serde_json::json;
//!
//! let mut scope = Scope::from_json(json!({"user": {"name": "Ada"}})).unwrap();
//! assert_eq!(evaluate("'Hello ' + user.name", &mut scope).unwrap(), Value::string("Hello Ada"));
//! assert!(evaluate("user.name | uppercase", &mut scope).is_err());
//! ```

mod interpreter;
mod lexer;
mod parser;
mod value;

pub use value::Value;
pub(crate) use value::type_name;

use thiserror::Error;

use crate::scope::Scope;

/// Why an expression could not be evaluated at build time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The expression is not well-formed
    #[error("syntax error at offset {position}: {message}")]
    Syntax {
        /// What went wrong
        message: String,
        /// Byte offset into the expression
        position: usize,
    },

    /// An identifier is not bound in the scope
    #[error("'{name}' is not defined")]
    UnresolvedIdentifier {
        /// The missing identifier
        name: String,
    },

    /// A runtime type error, e.g. reading a property of `undefined`
    #[error("type error: {message}")]
    Type {
        /// What went wrong
        message: String,
    },

    /// A construct outside the supported subset
    #[error("unsupported construct: {construct}")]
    Unsupported {
        /// Description of the construct
        construct: String,
    },
}

/// Evaluate `source` against `scope`.
///
/// Assignments inside the expression write to `scope`; derive a child scope
/// first when the caller's bindings must stay untouched.
pub fn evaluate(source: &str, scope: &mut Scope) -> Result<Value, EvalError> {
    let expr = parser::parse(source)?;
    interpreter::eval(&expr, scope)
}
