/// API route handlers, organized by resource
///
/// - `health`: Health check
/// - `auth`: Registration and login
/// - `tasks`: Owner-scoped task CRUD
/// - `settings`: Settings reads and admin-only writes

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod settings;
pub mod tasks;

/// Confirmation body for deletions
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
