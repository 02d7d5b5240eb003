// src/services/mod.rs
//! Business logic and API.

pub mod api_server;
pub mod issuer;
pub mod verifier;
