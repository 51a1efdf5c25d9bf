//! Core module — server configuration, state and lifecycle
//!
//! # Module structure
//!
//! - [`Config`] — env-driven server configuration
//! - [`ServerState`] — application context holding every service
//! - [`Server`] — HTTP server with graceful shutdown
//! - [`BackgroundTasks`] — panic-catching background task registry

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
