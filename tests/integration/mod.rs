//! Integration test suite for ng-expander
//!
//! End-to-end expansions through the public API, the filesystem and HTTP loaders,
//! and the `ngexpand` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **scenarios**: the reference expansions (interpolation, repeat, missing include,
//!   unresolved bind, view placeholder)
//! - **directives**: includes, binds and repeats in combination
//! - **concurrency**: fragment order under out-of-order fetch completion
//! - **filesystem**: templates read from a source directory
//! - **http**: templates fetched from a loopback server
//! - **large_collections**: repeats over thousands of items
//! - **cli**: the `ngexpand` binary

mod cli;
mod concurrency;
mod directives;
mod filesystem;
mod http;
mod large_collections;
mod scenarios;
