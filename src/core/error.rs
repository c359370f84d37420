//! Error handling for ng-expander
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`ExpandError`]) for everything that can abort an expansion
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and suggestions for CLI users
//!
//! # Fatal versus recoverable failures
//!
//! Only failures that make the merged output impossible to produce are represented here:
//! a template that cannot be fetched, or a scope that is not a mapping. Everything that
//! concerns a single directive or expression (an unparsable repeat expression, a bind
//! expression referencing data the scope does not have, an interpolation that cannot be
//! evaluated) is recovered where it happens and never surfaces as an [`ExpandError`]; the
//! affected markup is left in place for the client-side runtime.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ng_expander::core::{ExpandError, ErrorContext, user_friendly_error};
//!
//! fn load() -> Result<String, ExpandError> {
//!     Err(ExpandError::NotFound {
//!         reference: "partials/header.html".to_string(),
//!         location: "site/partials/header.html".to_string(),
//!     })
//! }
//!
//! if let Err(e) = load() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for expansion operations.
///
/// Each variant aborts the whole expansion: a failure of any fetch (main template,
/// view template, include target) propagates through every enclosing pass and rejects
/// the top-level call. Partial output is never returned alongside an error.
#[derive(Error, Debug)]
pub enum ExpandError {
    /// The template reference could not be resolved to an existing document.
    ///
    /// # Fields
    /// - `reference`: The reference as written in the template or options
    /// - `location`: The resolved file path or URL that was tried
    #[error("Template not found: {reference} (looked at {location})")]
    NotFound {
        /// The reference as written in the template or options
        reference: String,
        /// The resolved file path or URL that was tried
        location: String,
    },

    /// Reading a template from the filesystem failed for a reason other than absence.
    #[error("Failed to read template '{reference}' from {location}: {source}")]
    Io {
        /// The reference as written in the template or options
        reference: String,
        /// The resolved file path
        location: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Fetching a template over the network failed.
    #[error("Failed to fetch template from {url}: {reason}")]
    Network {
        /// The URL that was requested
        url: String,
        /// Transport error or HTTP status description
        reason: String,
    },

    /// A scope was supplied that is not a key/value mapping.
    #[error("Invalid scope: expected a JSON object, found {found}")]
    InvalidScope {
        /// JSON type name of the rejected value
        found: String,
    },

    /// Options or configuration are unusable.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl ExpandError {
    /// Whether the error means the referenced template does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error wrapper that adds user-facing details and suggestions.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions are displayed in green in the terminal.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details about why the error occurred.
    ///
    /// Details are displayed in yellow in the terminal.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`ExpandError`] variants get tailored suggestions; configuration parse
/// errors are recognised through the error chain; everything else is shown with its
/// full `anyhow` context chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(ctx) = cause.downcast_ref::<ErrorContext>() {
            return ErrorContext {
                error: format!("{error:#}"),
                suggestion: ctx.suggestion.clone(),
                details: ctx.details.clone(),
            };
        }
        if let Some(expand_error) = cause.downcast_ref::<ExpandError>() {
            return create_error_context(expand_error, &error);
        }
        if let Some(toml_error) = cause.downcast_ref::<toml::de::Error>() {
            return ErrorContext::new(format!("{error:#}"))
                .with_details(toml_error.to_string())
                .with_suggestion("Check the TOML syntax of the configuration file");
        }
        if let Some(json_error) = cause.downcast_ref::<serde_json::Error>() {
            return ErrorContext::new(format!("{error:#}"))
                .with_details(format!("JSON error at line {}", json_error.line()))
                .with_suggestion("The scope file must contain a single JSON object");
        }
    }

    ErrorContext::new(format!("{error:#}"))
}

fn create_error_context(expand_error: &ExpandError, error: &anyhow::Error) -> ErrorContext {
    let ctx = ErrorContext::new(format!("{error:#}"));
    match expand_error {
        ExpandError::NotFound {
            ..
        } => ctx
            .with_details("Template references are resolved relative to --src-dir, or to --base-url when it is set")
            .with_suggestion("Check the include path and the source directory"),
        ExpandError::Io {
            ..
        } => ctx.with_suggestion("Check file permissions on the template tree"),
        ExpandError::Network {
            ..
        } => ctx
            .with_details("All templates are fetched over HTTP when a base URL is configured")
            .with_suggestion("Check that the server is reachable and the base URL is correct"),
        ExpandError::InvalidScope {
            ..
        } => ctx.with_suggestion("Provide the scope as a JSON object, e.g. {\"title\": \"Home\"}"),
        ExpandError::Config {
            ..
        } => ctx.with_suggestion("Run with --help to see the accepted options"),
    }
}
