//! # ChoreBoard Shared Library
//!
//! This crate contains the database layer and domain models shared by the
//! ChoreBoard API server and any auxiliary binaries.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migration runner
//! - `models`: database models (users, homes, tasks) and their operations

pub mod db;
pub mod models;

/// Current version of the ChoreBoard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
