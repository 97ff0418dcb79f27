//! Session status engine for sortie
//!
//! This crate is the heart of sortie, containing:
//! - Status derivation (Upcoming -> Open -> Closing -> Closed -> Completed)
//! - Countdown and registration-window display helpers that agree with it
//! - The board: per-tick evaluation, filters, archive, change events
//! - Session and pilot code generation and key checks
//! - Pilot registration and dispatcher verification
//!
//! Nothing here reads the clock; every evaluation takes `now` explicitly.

mod board;
mod cache;
mod codes;
mod display;
mod drafts;
mod events;
mod participants;
mod status;

pub use board::*;
pub use cache::*;
pub use codes::*;
pub use display::*;
pub use drafts::*;
pub use events::*;
pub use participants::*;
pub use status::*;
