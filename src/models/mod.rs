//! Data models for the event listing application.
//!
//! Field names serialize in camelCase to match the frontend and the on-disk store layout.

mod event;
mod weather;

pub use event::*;
pub use weather::*;
