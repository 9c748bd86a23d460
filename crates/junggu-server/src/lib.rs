//! # junggu-server
//!
//! Axum HTTP server for the places page.
//!
//! - Session lifecycle: create, view, end
//! - Filter toggles and chat submits against a session
//! - Render model for the external map collaborator
//! - Health check and graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod render;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, JungguServer};
pub use shutdown::ShutdownCoordinator;
