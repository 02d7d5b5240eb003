// src/models/mod.rs
//! Data structures shared across the certificate system.

pub mod certificate;
