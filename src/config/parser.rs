//! Reading configuration and scope files.
//!
//! Both readers attach the file path to every failure so that the CLI can report
//! which file was at fault:
//!
//! ```text
//! Failed to parse scope file: site/scope.json
//! Caused by:
//!     expected `,` or `}` at line 3 column 5
//! ```

use anyhow::{Context, Result};
use serde_json::Value as Json;
use std::path::Path;

use crate::core::ExpandError;
use crate::expression::type_name;

/// Parse a TOML file into any deserializable type.
///
/// # Examples
///
/// ```rust,no_run
/// use ng_expander::config::{ExpanderConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: ExpanderConfig = parse_config(Path::new("ngexpand.toml"))?;
/// println!("root template: {:?}", config.template);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Read a JSON scope file. The top-level value must be an object.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or holds
/// anything other than an object ([`ExpandError::InvalidScope`]).
pub async fn parse_scope_file(path: &Path) -> Result<Json> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scope file: {}", path.display()))?;

    let scope: Json = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scope file: {}", path.display()))?;

    if !scope.is_object() {
        return Err(ExpandError::InvalidScope {
            found: type_name(&scope).to_string(),
        })
        .with_context(|| format!("Invalid scope file: {}", path.display()));
    }

    Ok(scope)
}
