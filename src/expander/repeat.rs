//! `ng-repeat` expressions and loop-variable materialization.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as Json;

use crate::expression::{EvalError, Value, evaluate};
use crate::scope::Scope;

/// Key variable bound when the expression names only the value (`item in items`).
pub const DEFAULT_KEY_NAME: &str = "i";

/// Position of the item within the collection.
pub const INDEX_NAME: &str = "$index";

/// `<lhs> in <collection><rest>`; the collection ends at the first whitespace.
static REPEAT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(.*?) in (\S*)(.*?)$").ok());

static KEY_VALUE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\((\w+),\s?(\w+)\)$").ok());

static VALUE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^(\w+)$").ok());

/// The parts of a repeat expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatDescriptor {
    pub key_name: String,
    pub value_name: String,
    pub collection_expr: String,
}

impl RepeatDescriptor {
    /// Parse `(key, value) in collection` or `value in collection`.
    ///
    /// Anything after the collection token (e.g. `track by item.id`) is ignored.
    /// Returns `None` for every other shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ng_expander::expander::RepeatDescriptor;
    ///
    /// let d = RepeatDescriptor::parse("(k, v) in data.rows track by k").unwrap();
    /// assert_eq!((d.key_name.as_str(), d.value_name.as_str()), ("k", "v"));
    /// assert_eq!(d.collection_expr, "data.rows");
    ///
    /// assert!(RepeatDescriptor::parse("items").is_none());
    /// ```
    pub fn parse(expression: &str) -> Option<Self> {
        let captures = REPEAT_PATTERN.as_ref()?.captures(expression.trim())?;
        let lhs = captures[1].trim();
        let collection_expr = captures[2].trim().to_string();
        if collection_expr.is_empty() {
            return None;
        }

        if let Some(pair) = KEY_VALUE_PATTERN.as_ref()?.captures(lhs) {
            return Some(Self {
                key_name: pair[1].to_string(),
                value_name: pair[2].to_string(),
                collection_expr,
            });
        }

        let single = VALUE_PATTERN.as_ref()?.captures(lhs)?;
        Some(Self {
            key_name: DEFAULT_KEY_NAME.to_string(),
            value_name: single[1].to_string(),
            collection_expr,
        })
    }

    /// The statements that bind one item's loop variables:
    /// `K = key`, `V = C[K]` and `$index = position`.
    pub(crate) fn binding_statements(&self, key: &LoopKey, position: usize) -> [String; 3] {
        [
            format!("{} = {}", self.key_name, key.literal()),
            format!("{} = {}[{}]", self.value_name, self.collection_expr, self.key_name),
            format!("{INDEX_NAME} = {position}"),
        ]
    }
}

/// One key of an enumerated collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoopKey {
    Index(usize),
    Name(String),
}

impl LoopKey {
    /// The key as an expression literal.
    fn literal(&self) -> String {
        match self {
            Self::Index(i) => i.to_string(),
            Self::Name(name) => Json::String(name.clone()).to_string(),
        }
    }
}

impl std::fmt::Display for LoopKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Keys of `collection` in enumeration order: array and string indices, object
/// keys in insertion order. Other values have no keys.
pub(crate) fn loop_keys(collection: &Value) -> Vec<LoopKey> {
    match collection {
        Value::Json(Json::Array(items)) => (0..items.len()).map(LoopKey::Index).collect(),
        Value::Json(Json::Object(map)) => map.keys().cloned().map(LoopKey::Name).collect(),
        Value::Json(Json::String(s)) => (0..s.chars().count()).map(LoopKey::Index).collect(),
        _ => Vec::new(),
    }
}

/// A repeat item ready to be instantiated.
#[derive(Debug)]
pub(crate) struct RepeatItem {
    /// Scope with the loop variables bound
    pub scope: Scope,
    /// Hidden element restating the bindings for the client-side runtime
    pub marker: String,
    /// Trace label, `repeat V = C[key]`
    pub label: String,
}

/// Bind the loop variables of every item of `collection`, each in its own scope
/// derived from `repeat_scope`.
pub(crate) fn materialize(
    descriptor: &RepeatDescriptor,
    collection: &Value,
    repeat_scope: &Scope,
) -> Result<Vec<RepeatItem>, EvalError> {
    loop_keys(collection)
        .into_iter()
        .enumerate()
        .map(|(position, key)| {
            let mut scope = repeat_scope.derive();
            let statements = descriptor.binding_statements(&key, position);
            for statement in &statements {
                evaluate(statement, &mut scope)?;
            }
            Ok::<_, EvalError>(RepeatItem {
                scope,
                marker: binding_marker(&statements),
                label: format!(
                    "repeat {} = {}[{key}]",
                    descriptor.value_name, descriptor.collection_expr
                ),
            })
        })
        .collect()
}

/// `<span style="display: none">[[K = k; V = C[K]; $index = n ;""]]</span>`
fn binding_marker(statements: &[String; 3]) -> String {
    format!(
        "<span style=\"display: none\">[[{}; {}; {} ;\"\"]]</span>",
        statements[0], statements[1], statements[2]
    )
}
