// src/contracts/mod.rs
//! Smart contract interfaces.
//!
//! Defines the [`LedgerClient`] collaborator boundary the issuance and
//! verification services are written against, and the concrete
//! [`certificate_registry::CertificateRegistry`] implementation backed by
//! the deployed registry contract.

pub mod certificate_registry;

use crate::error::CertError;
use crate::models::certificate::{CertificateFields, LedgerRecord};
use async_trait::async_trait;

/// Ledger execution metadata for a confirmed issuance transaction.
#[derive(Debug, Clone)]
pub struct LedgerReceipt {
    /// Transaction hash, 0x-prefixed
    pub tx_hash: String,
    /// Gas consumed by the transaction
    pub gas_used: u64,
    /// Wall-clock time from submission to confirmed inclusion
    pub latency_ms: u64,
}

/// The external ledger the certificate system writes to and reads from.
///
/// Calls are synchronous from the core's viewpoint and attempted at most
/// once; the implementation owns confirmation-wait semantics. Idempotence
/// on duplicate identifiers is a property of the ledger, not of this crate:
/// the core performs no pre-check for an existing record before issuing.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Records a certificate on the ledger, blocking until the ledger
    /// confirms inclusion.
    async fn issue(
        &self,
        id: &str,
        fields: &CertificateFields,
        artifact_ref: &str,
    ) -> Result<LedgerReceipt, CertError>;

    /// Returns whether the ledger currently considers the identifier's
    /// record valid. `Ok(false)` covers both "no record" and "record marked
    /// invalid"; use [`LedgerClient::get_certificate`] to distinguish them.
    async fn is_verified(&self, id: &str) -> Result<bool, CertError>;

    /// Fetches the full record for an identifier, or `None` if the ledger
    /// has never seen it.
    async fn get_certificate(&self, id: &str) -> Result<Option<LedgerRecord>, CertError>;
}
