//! JSON and SSE API handlers.

pub mod events;
pub mod login;
pub mod store;
