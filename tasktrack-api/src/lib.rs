//! # TaskTrack API Server Library
//!
//! HTTP surface for TaskTrack: accounts, personal tasks, and admin-managed
//! settings.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body extractor with `ApiError` rejections
//! - `middleware`: Bearer authentication and the admin gate
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
