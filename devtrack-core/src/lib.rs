//! Core library for Devtrack.
//!
//! This crate provides the domain models and database operations for Devtrack,
//! independent of any transport layer (HTTP, agent gateway, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use devtrack_core::db::Database;
//! use devtrack_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let projects = db.get_all_projects()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
