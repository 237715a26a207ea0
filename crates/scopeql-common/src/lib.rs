//! Common utilities for scopeql
//!
//! This crate provides the error type shared by the scopeql crates.

pub mod error;

pub use error::{ScopeQlError, Result};
