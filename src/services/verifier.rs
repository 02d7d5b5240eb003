// src/services/verifier.rs
//! Certificate verification service.
//!
//! Implements the verification protocol: a pure read against the ledger
//! that distinguishes three outcomes (never issued, issued but marked
//! invalid, and valid with the stored fields for display). All three input
//! channels (manual entry, PDF extraction, QR decode) funnel through
//! [`Verifier::verify_source`], so their behavior for a given certificate
//! cannot diverge after resolution.

use crate::contracts::LedgerClient;
use crate::error::CertError;
use crate::models::certificate::{LedgerRecord, VerificationResult};
use crate::resolver::Resolve;
use std::sync::Arc;

/// Certificate verifier backed by the ledger collaborator.
pub struct Verifier {
    ledger: Arc<dyn LedgerClient>,
}

impl Verifier {
    /// Constructs a new Verifier instance.
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Verifies an identifier against the ledger.
    ///
    /// # Returns
    /// - `VerificationResult::NotFound` when no record exists ("never
    ///   issued / wrong ID")
    /// - `VerificationResult::Invalid` when a record exists but is marked
    ///   invalid ("issued but revoked/tampered")
    /// - `VerificationResult::Valid(fields)` for a valid record, with the
    ///   stored fields
    ///
    /// # Errors
    /// Returns `CertError::Ledger` only when the ledger itself cannot be
    /// queried; an unknown identifier is an outcome, not an error.
    pub async fn verify(&self, certificate_id: &str) -> Result<VerificationResult, CertError> {
        match self.ledger.get_certificate(certificate_id).await? {
            None => Ok(VerificationResult::NotFound),
            Some(record) if !record.valid => Ok(VerificationResult::Invalid),
            Some(record) => Ok(VerificationResult::Valid(record.fields)),
        }
    }

    /// Resolves a source to an identifier and verifies it.
    ///
    /// This is the single shared path all three input channels go through;
    /// the convergence property of the channels is enforced structurally
    /// here rather than by duplicated branching.
    pub async fn verify_source(
        &self,
        source: &dyn Resolve,
    ) -> Result<VerificationResult, CertError> {
        let id = source.resolve()?;
        self.verify(id.as_str()).await
    }

    /// Fetches the raw stored record for display ("view certificate").
    pub async fn get_record(
        &self,
        certificate_id: &str,
    ) -> Result<Option<LedgerRecord>, CertError> {
        self.ledger.get_certificate(certificate_id).await
    }
}
