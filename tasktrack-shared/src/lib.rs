//! # TaskTrack Shared Library
//!
//! This crate contains the types, store access, and authentication logic
//! used by the TaskTrack API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, tasks, settings) and their queries
//! - `auth`: Password hashing, session tokens, secret resolution, middleware helpers
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
