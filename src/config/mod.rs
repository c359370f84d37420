//! Expansion options and the optional configuration file.
//!
//! [`ExpandOptions`] is what the library consumes. The CLI builds it from an
//! [`ExpanderConfig`] (the `ngexpand.toml` file merged with command-line flags).
//!
//! # Examples
//!
//! ```rust
//! use ng_expander::config::ExpandOptions;
//! use serde_json::json;
//!
//! let options = ExpandOptions::default()
//!     .with_scope(json!({"title": "Hi"}))
//!     .with_view_template("views/home.html")
//!     .with_src_dir("site");
//! assert!(options.base_url.is_none());
//! ```

mod file;
mod parser;

pub use file::ExpanderConfig;
pub use parser::{parse_config, parse_scope_file};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::path::PathBuf;

/// Options for one expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    /// Initial scope; must be a JSON object. Defaults to `{}`.
    pub scope: Json,

    /// Template instantiated into `<ng-view>` placeholders. Without it the
    /// placeholders are left untouched.
    pub view_template: Option<String>,

    /// Directory template references are resolved against.
    pub src_dir: Option<PathBuf>,

    /// When set, templates are fetched over HTTP relative to this URL and
    /// `src_dir` is ignored.
    pub base_url: Option<String>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            scope: Json::Object(Map::new()),
            view_template: None,
            src_dir: None,
            base_url: None,
        }
    }
}

impl ExpandOptions {
    #[must_use]
    pub fn with_scope(mut self, scope: Json) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_view_template(mut self, reference: impl Into<String>) -> Self {
        self.view_template = Some(reference.into());
        self
    }

    #[must_use]
    pub fn with_src_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.src_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}
