//! Valorant DSF Core - Shared types library.
//!
//! This crate provides the types used across all Valorant DSF components:
//! - `server` - Desktop and web hosts serving the storefront UI
//! - `cli` - Terminal host for login checks and store lookups
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! HTTP clients. Token parsing and the price/item join live here so every host
//! renders the same store.
//!
//! # Modules
//!
//! - [`types`] - Identity tokens, storefront payload, display items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
