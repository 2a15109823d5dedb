//! Valorant daily storefront server library.
//!
//! This crate provides the server as a library so the binary, the CLI and
//! the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
mod filters;
pub mod login;
pub mod middleware;
pub mod riot;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{DsfConfig, Variant};
pub use routes::build_router;
pub use state::AppState;
