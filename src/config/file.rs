//! The `ngexpand.toml` configuration file.
//!
//! Every key is optional. Command-line flags override file values through
//! [`ExpanderConfig::merge`]:
//!
//! ```toml
//! template = "index.html"
//! view_template = "views/home.html"
//! src_dir = "site"
//! # base_url = "http://localhost:8080"   # fetch over HTTP instead of reading src_dir
//! scope_file = "scope.json"
//!
//! [scope]
//! title = "Home"
//! user = { name = "Ada" }
//! ```
//!
//! Relative `src_dir` and `scope_file` paths are resolved against the directory
//! holding the configuration file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::path::{Path, PathBuf};

use super::parser::{parse_config, parse_scope_file};
use super::ExpandOptions;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpanderConfig {
    /// Root template reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Reference instantiated into `<ng-view>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// JSON file holding the initial scope object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_file: Option<PathBuf>,

    /// Inline scope entries; they win over keys from `scope_file`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub scope: Map<String, Json>,
}

impl ExpanderConfig {
    /// Load a configuration file, resolving its relative paths against the
    /// file's own directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config: Self = parse_config(path)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.src_dir = config.src_dir.map(|dir| base.join(dir));
        config.scope_file = config.scope_file.map(|file| base.join(file));

        Ok(config)
    }

    /// Overlay `overrides` on top of `self`: every value set in `overrides` wins.
    /// Inline scope tables are merged one level deep.
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        self.template = overrides.template.or(self.template);
        self.view_template = overrides.view_template.or(self.view_template);
        self.src_dir = overrides.src_dir.or(self.src_dir);
        self.base_url = overrides.base_url.or(self.base_url);
        self.scope_file = overrides.scope_file.or(self.scope_file);
        self.scope.extend(overrides.scope);
        self
    }

    /// Build the library options, reading `scope_file` if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope file cannot be read or is not a JSON object.
    pub async fn to_options(&self) -> Result<ExpandOptions> {
        let mut scope = match &self.scope_file {
            Some(file) => match parse_scope_file(file).await? {
                Json::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };
        scope.extend(self.scope.clone());

        let mut options = ExpandOptions::default().with_scope(Json::Object(scope));
        options.view_template = self.view_template.clone();
        options.src_dir = self.src_dir.clone();
        options.base_url = self.base_url.clone();
        Ok(options)
    }
}
