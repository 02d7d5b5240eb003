// src/storage/mod.rs
//! Content-addressable artifact storage.

pub mod pinata_client;

use crate::error::CertError;
use async_trait::async_trait;
use std::path::Path;

/// The content-addressable store certificate PDFs are published to.
///
/// Issuance depends on the returned reference: if a publish fails, nothing
/// may be written to the ledger, so the ledger never points at an
/// unreachable artifact.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Publishes the file at `path` and returns its content-addressed
    /// reference.
    async fn publish(&self, path: &Path) -> Result<String, CertError>;
}
