//! Variable bindings visible to template expressions.
//!
//! A [`Scope`] maps names to [`Value`]s. Every directive that introduces names
//! (a repeat item, an include) works in a *derived* scope: a one-level copy of its
//! parent, so writes in the child never show up in the parent or in siblings.
//! Nested values are shared behind [`Rc`] and never mutated in place; the
//! expression language can only rebind top-level names.
//!
//! # Examples
//!
//! ```rust
//! use ng_expander::expression::Value;
//! use ng_expander::scope::Scope;
//! use serde_json::json;
//!
//! let parent = Scope::from_json(json!({"title": "Hi"})).unwrap();
//! let mut child = parent.derive();
//! child.set("title".to_string(), Value::string("Bye"));
//!
//! assert_eq!(parent.get("title"), Some(&Value::string("Hi")));
//! assert_eq!(child.get("title"), Some(&Value::string("Bye")));
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::core::ExpandError;
use crate::expression::Value;

/// A set of named bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Rc<Value>>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope from a JSON object; each top-level key becomes a binding.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::InvalidScope`] when `json` is not an object.
    pub fn from_json(json: Json) -> Result<Self, ExpandError> {
        let Json::Object(map) = json else {
            return Err(ExpandError::InvalidScope {
                found: crate::expression::type_name(&json).to_string(),
            });
        };

        let bindings = map
            .into_iter()
            .map(|(name, value)| (name, Rc::new(Value::Json(value))))
            .collect();
        Ok(Self {
            bindings,
        })
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(Rc::as_ref)
    }

    /// Look up a binding without copying its value.
    pub(crate) fn get_shared(&self, name: &str) -> Option<Rc<Value>> {
        self.bindings.get(name).cloned()
    }

    /// Bind `name`, replacing any earlier binding in this scope only.
    pub fn set(&mut self, name: String, value: Value) {
        self.bindings.insert(name, Rc::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// A child scope holding the same bindings.
    ///
    /// Only the binding table is copied; the values themselves are shared.
    pub fn derive(&self) -> Self {
        self.clone()
    }
}
