// src/blockchain/mod.rs
//! Blockchain interaction layer.

pub mod ethereum_client;
