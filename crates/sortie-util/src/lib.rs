//! Shared utilities for sortie
//!
//! This crate provides:
//! - ID types (SessionId, SessionCode)
//! - Time utilities (mockable clock, date/time parsing, Russian display formats)
//! - Error types
//! - Default paths for the schedule file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
