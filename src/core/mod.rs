//! Core types shared across ng-expander
//!
//! - [`ExpandError`] - the fatal error type of an expansion
//! - [`ErrorContext`] - user-facing error wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any error into an [`ErrorContext`]
//! - [`TraceNode`] - diagnostic label and depth threaded through recursive passes

pub mod error;
pub mod trace;

pub use error::{ErrorContext, ExpandError, user_friendly_error};
pub use trace::TraceNode;
