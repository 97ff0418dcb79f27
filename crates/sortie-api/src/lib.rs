//! Shared types for sortie
//!
//! This crate defines what the status engine consumes and what UI layers
//! receive back:
//! - The normalized session record
//! - Lifecycle status and its display label
//! - List views, filter tabs and row bands

mod types;

pub use types::*;
