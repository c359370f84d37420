//! ng-expander - build-time pre-rendering for ng templates
//!
//! Given a root template and a possibly incomplete scope, ng-expander resolves every
//! directive and expression it can and leaves the rest in place, so the client-side
//! runtime can finish rendering with fuller data.
//!
//! # What gets expanded
//!
//! - `<ng-view>` placeholders receive the configured view template
//! - `<ng-include src="expr">` elements become `<noop>` wrappers holding the included
//!   template; `ng-include="expr"` attributes fill their element's content
//! - `ng-repeat="v in items"` elements are cloned once per item, each clone prefixed with
//!   a hidden marker restating its loop bindings for the client
//! - `ng-bind` / `ng-bind-html` set element content when the expression is known
//! - `{{ expr }}` markers are replaced when the value is truthy and kept otherwise
//!
//! # Modules
//!
//! - [`expander`] - the recursive instantiation engine and directive passes
//! - [`expression`] - the expression subset evaluated against a scope
//! - [`scope`] - variable scopes and their derivation
//! - [`markup`] - a lenient, lossless HTML tree
//! - [`loader`] - template sources (filesystem, HTTP)
//! - [`config`] - library options and the `ngexpand.toml` file
//! - [`core`] - error types and diagnostics
//! - [`cli`] - the `ngexpand` command
//!
//! # Example
//!
//! ```rust,no_run
//! use ng_expander::{ExpandOptions, expand};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), ng_expander::ExpandError> {
//! let options = ExpandOptions::default()
//!     .with_src_dir("site")
//!     .with_scope(json!({"user": {"name": "Ada"}, "items": [1, 2]}));
//! let html = expand("index.html", options).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Command-line usage
//!
//! ```bash
//! ngexpand index.html --src-dir site --scope scope.json -o dist/index.html
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod expander;
pub mod expression;
pub mod loader;
pub mod markup;
pub mod scope;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::ExpandOptions;
pub use crate::core::ExpandError;
pub use crate::expander::{Expander, expand};
