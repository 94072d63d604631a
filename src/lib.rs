//! Devtrack: a personal project/task tracker with a JSON-RPC tool bridge
//! for AI agents.
//!
//! The interesting surface lives in [`gateway`]: a closed catalog of tools,
//! a validating dispatcher, and the fuzzy task matcher. [`api`] mounts the
//! gateway over HTTP.

pub mod api;
pub mod gateway;

// Re-export the core crate so binaries and tests reach models and the
// database through one crate.
pub use devtrack_core::{db, models};
