// src/services/issuer.rs
//! Certificate Issuer Service
//!
//! Implements the issuance protocol: derive the identifier, render the PDF
//! with the identifier as QR payload, publish the artifact to the content
//! store, then record the certificate on the ledger and block until the
//! ledger confirms inclusion.
//!
//! Ordering is load-bearing: the store publish happens strictly before the
//! ledger call, and a publish failure aborts the whole issuance, so a
//! ledger record can never point at an unreachable artifact. The ledger
//! call is attempted at most once; an automatic retry could double-issue
//! if the ledger is not idempotent on the identifier.

use crate::artifact::renderer::CertificateRenderer;
use crate::contracts::LedgerClient;
use crate::error::CertError;
use crate::models::certificate::{CertificateFields, IssueReceipt};
use crate::storage::ContentStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for issuing certificates against the ledger.
pub struct CertificateIssuer {
    /// The external ledger records are written to
    ledger: Arc<dyn LedgerClient>,

    /// Content-addressable store the PDF is published to
    store: Arc<dyn ContentStore>,

    /// Renderer producing the certificate artifact
    renderer: CertificateRenderer,

    /// Directory rendered PDFs are written into
    workdir: PathBuf,
}

impl CertificateIssuer {
    /// Creates a new CertificateIssuer instance.
    ///
    /// # Arguments
    /// * `ledger` - Ledger collaborator for the issue call
    /// * `store` - Content store for artifact publication
    /// * `renderer` - PDF renderer
    /// * `workdir` - Directory for rendered artifacts
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn ContentStore>,
        renderer: CertificateRenderer,
        workdir: PathBuf,
    ) -> Self {
        Self {
            ledger,
            store,
            renderer,
            workdir,
        }
    }

    /// Issues a certificate for the given fields.
    ///
    /// # Process Flow
    /// 1. Validate all four fields non-empty (before any I/O)
    /// 2. Derive the identifier from the canonical fields
    /// 3. Render the PDF embedding the identifier as a QR payload
    /// 4. Publish the PDF to the content store
    /// 5. Record `(id, fields, artifact_ref)` on the ledger, blocking for
    ///    the receipt
    ///
    /// The rendered PDF is left at `IssueReceipt::artifact_path` so the
    /// caller can attach it to a notification; the caller owns cleanup.
    ///
    /// # Errors
    /// - `CertError::Validation` if a field is empty (nothing touched)
    /// - `CertError::Render` if the PDF cannot be produced
    /// - `CertError::StoreUnavailable` if the publish fails (ledger
    ///   untouched)
    /// - `CertError::Ledger` if the ledger rejects or times out (no retry)
    pub async fn issue(&self, fields: CertificateFields) -> Result<IssueReceipt, CertError> {
        fields.validate()?;

        let certificate_id = fields.derive_id();
        log::info!(
            "issuing certificate {} for uid {}",
            certificate_id,
            fields.uid
        );

        let artifact_path = self
            .workdir
            .join(format!("certificate-{}.pdf", &certificate_id.as_str()[..16]));
        self.renderer
            .render(&fields, &certificate_id, &artifact_path)?;

        let artifact_ref = self.store.publish(&artifact_path).await?;

        let ledger_receipt = self
            .ledger
            .issue(certificate_id.as_str(), &fields, &artifact_ref)
            .await?;

        log::info!(
            "certificate {} recorded in tx {} ({} gas, {} ms)",
            certificate_id,
            ledger_receipt.tx_hash,
            ledger_receipt.gas_used,
            ledger_receipt.latency_ms
        );

        Ok(IssueReceipt {
            certificate_id,
            artifact_ref,
            artifact_path,
            tx_hash: ledger_receipt.tx_hash,
            gas_used: ledger_receipt.gas_used,
            ledger_latency_ms: ledger_receipt.latency_ms,
            issued_at: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_fields, MockLedger, MockStore};
    use std::sync::atomic::Ordering;

    fn issuer_with(ledger: Arc<MockLedger>, store: Arc<MockStore>) -> CertificateIssuer {
        CertificateIssuer::new(
            ledger,
            store,
            CertificateRenderer::new(None),
            std::env::temp_dir(),
        )
    }

    #[tokio::test]
    async fn test_issue_returns_receipt_with_derived_identifier() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MockStore::new());
        let issuer = issuer_with(ledger.clone(), store.clone());

        let fields = sample_fields();
        let receipt = issuer.issue(fields.clone()).await.unwrap();

        assert_eq!(receipt.certificate_id, fields.derive_id());
        assert_eq!(receipt.artifact_ref, MockStore::HASH);
        assert!(receipt.artifact_path.exists());
        assert_eq!(ledger.issue_calls.load(Ordering::SeqCst), 1);

        std::fs::remove_file(&receipt.artifact_path).unwrap();
    }

    #[tokio::test]
    async fn test_empty_field_fails_before_any_io() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MockStore::new());
        let issuer = issuer_with(ledger.clone(), store.clone());

        let mut fields = sample_fields();
        fields.candidate_name.clear();

        let err = issuer.issue(fields).await.unwrap_err();
        assert!(matches!(err, CertError::Validation("candidate_name")));
        assert_eq!(store.publish_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ledger.issue_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_before_the_ledger() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MockStore::failing());
        let issuer = issuer_with(ledger.clone(), store);

        let err = issuer.issue(sample_fields()).await.unwrap_err();
        assert!(matches!(err, CertError::StoreUnavailable(_)));
        assert_eq!(ledger.issue_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ledger_failure_surfaces_without_retry() {
        let ledger = Arc::new(MockLedger::failing());
        let store = Arc::new(MockStore::new());
        let issuer = issuer_with(ledger.clone(), store);

        let err = issuer.issue(sample_fields()).await.unwrap_err();
        assert!(matches!(err, CertError::Ledger(_)));
        assert_eq!(ledger.issue_calls.load(Ordering::SeqCst), 1);
    }
}
