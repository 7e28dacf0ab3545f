//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the relay and health endpoints
//! - The relay handler (decode target, fetch, rewrite, respond)
//! - CORS and request logging middleware

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
