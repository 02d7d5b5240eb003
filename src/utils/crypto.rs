// src/utils/crypto.rs
//! Cryptographic utilities for certificate identity.
//!
//! Uses SHA-256 for all operations, matching the digest the on-ledger
//! registry contract keys records by.

use sha2::{Digest, Sha256};

/// Computes a SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the digest.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
