//! Normalized entity store for the admin console.
//!
//! Mirrors the backend's users and companies client-side, keeps them in
//! sync through intent/outcome actions, and exposes pure selectors.

pub mod api;
pub mod config;
pub mod domain;
pub mod notify;
pub mod search;
pub mod store;
