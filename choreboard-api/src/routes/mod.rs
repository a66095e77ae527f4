//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: health check endpoint
//! - `auth`: session sync (user bootstrap from resolved identity)
//! - `users`: current-user endpoint
//! - `homes`: home creation, membership, ranking
//! - `tasks`: task creation, listing, update, completion

pub mod auth;
pub mod health;
pub mod homes;
pub mod tasks;
pub mod users;
