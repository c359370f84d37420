//! Command-line interface for ngexpand.
//!
//! `ngexpand` pre-renders one root template and writes the merged markup to
//! stdout or to a file:
//!
//! ```bash
//! # Expand site/index.html with a scope read from scope.json
//! ngexpand index.html --src-dir site --scope scope.json
//!
//! # Fill <ng-view> from views/home.html and write the result to a file
//! ngexpand index.html --src-dir site --view-template views/home.html -o dist/index.html
//!
//! # Fetch every template from a running server instead of the filesystem
//! ngexpand index.html --base-url http://localhost:8080
//!
//! # Take everything from a configuration file, overriding the output only
//! ngexpand --config ngexpand.toml -o dist/index.html
//! ```
//!
//! # Option precedence
//!
//! Values given on the command line win over values from `--config`. The scope is
//! assembled from the configuration's `scope_file`, then its inline `[scope]`
//! table, then the `--scope` file, later sources overriding earlier keys.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `RUST_LOG` takes precedence;
//! otherwise `--verbose` selects `debug`, `--quiet` selects `error`, and the
//! default is `warn`.


use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{ExpanderConfig, parse_scope_file};
use crate::core::ErrorContext;

/// Runtime settings derived from global flags.
///
/// Kept separate from [`Cli`] so tests can check flag handling without touching
/// the global subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default filter directive used when `RUST_LOG` is not set.
    pub log_level: Option<String>,
}

impl CliConfig {
    /// Install the `tracing` subscriber. Only the first call in a process has an
    /// effect.
    pub fn init_logging(&self) {
        let filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(self.log_level.as_deref().unwrap_or("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "ngexpand",
    about = "Pre-render ng templates with whatever scope is available at build time",
    version,
    long_about = "Expands includes, views, repeats and binds that can be resolved from the given scope \
                  and leaves everything else for the client-side runtime."
)]
pub struct Cli {
    /// Root template reference, relative to --src-dir or --base-url
    pub template: Option<String>,

    /// JSON file holding the initial scope object
    #[arg(long, value_name = "FILE")]
    pub scope: Option<PathBuf>,

    /// Template instantiated into every <ng-view> placeholder
    #[arg(long, value_name = "REF")]
    pub view_template: Option<String>,

    /// Directory template references are resolved against
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Fetch templates over HTTP from this URL instead of the filesystem
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the output here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Log expansion progress (equivalent to RUST_LOG=debug)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run the expansion described by the parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or scope cannot be read, no template
    /// was named, the expansion fails, or the output cannot be written.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
        }
    }

    /// Like [`Cli::execute`] but with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let expander_config = self.resolve_config().await?;
        let template = expander_config.template.clone().ok_or_else(|| {
            anyhow!(
                ErrorContext::new("No template to expand")
                    .with_suggestion("Pass a template reference, e.g. `ngexpand index.html`, or set `template` in the configuration file")
            )
        })?;

        let options = expander_config.to_options().await?;
        debug!("Expanding {template} with options {options:?}");

        let output = crate::expand(&template, options)
            .await
            .with_context(|| format!("Failed to expand {template}"))?;

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
                }
                tokio::fs::write(path, output)
                    .await
                    .with_context(|| format!("Failed to write output: {}", path.display()))?;
                debug!("Wrote {}", path.display());
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(output.as_bytes())
                    .and_then(|()| stdout.flush())
                    .context("Failed to write output to stdout")?;
            }
        }

        Ok(())
    }

    /// Merge the configuration file, if any, with the command-line flags.
    async fn resolve_config(&self) -> Result<ExpanderConfig> {
        let base = match &self.config {
            Some(path) => ExpanderConfig::load_from(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
            None => ExpanderConfig::default(),
        };

        let mut overrides = ExpanderConfig {
            template: self.template.clone(),
            view_template: self.view_template.clone(),
            src_dir: self.src_dir.clone(),
            base_url: self.base_url.clone(),
            ..ExpanderConfig::default()
        };

        if let Some(scope_path) = &self.scope {
            overrides.scope = match parse_scope_file(scope_path).await? {
                serde_json::Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
        }

        Ok(base.merge(overrides))
    }
}
