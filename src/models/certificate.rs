// src/models/certificate.rs
//! Certificate data model and identity derivation.
//!
//! A certificate's identity is the SHA-256 digest of its four canonical
//! fields concatenated byte-for-byte in fixed order (uid, candidate name,
//! course name, organization name) with no separators. That identifier is
//! the sole key used both to write and to query ledger state, so any change
//! to any field produces a different certificate.

use crate::error::CertError;
use crate::utils::crypto::hash_data;
use serde::{Deserialize, Serialize};

/// The four canonical fields of a certificate.
///
/// Field order is fixed and significant: it feeds the identity function.
/// All four are required non-empty at the issuance boundary (see
/// [`CertificateFields::validate`]); the identity function itself accepts
/// whatever it is given.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CertificateFields {
    /// Candidate's unique identifier within the issuing organization
    pub uid: String,

    /// Full name of the candidate the certificate is issued to
    pub candidate_name: String,

    /// Name of the completed course
    pub course_name: String,

    /// Name of the issuing organization
    pub org_name: String,
}

impl CertificateFields {
    pub fn new(
        uid: impl Into<String>,
        candidate_name: impl Into<String>,
        course_name: impl Into<String>,
        org_name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            candidate_name: candidate_name.into(),
            course_name: course_name.into(),
            org_name: org_name.into(),
        }
    }

    /// Checks that all four fields are present before issuance touches any
    /// external collaborator.
    ///
    /// # Errors
    /// Returns `CertError::Validation` naming the first empty field.
    pub fn validate(&self) -> Result<(), CertError> {
        if self.uid.is_empty() {
            return Err(CertError::Validation("uid"));
        }
        if self.candidate_name.is_empty() {
            return Err(CertError::Validation("candidate_name"));
        }
        if self.course_name.is_empty() {
            return Err(CertError::Validation("course_name"));
        }
        if self.org_name.is_empty() {
            return Err(CertError::Validation("org_name"));
        }
        Ok(())
    }

    /// Derives the certificate identifier from the canonical fields.
    ///
    /// Pure function: concatenates uid, candidate name, course name and
    /// organization name in that order with no separators, hashes with
    /// SHA-256, and hex-encodes the digest (64 lowercase characters).
    ///
    /// No trimming, case folding, or format validation is applied. Known
    /// weakness carried over from the on-ledger contract: because the
    /// concatenation has no separators, shifting bytes across a field
    /// boundary (e.g. uid "U1A"/"lice" vs "U1"/"Alice") collides. Fixing it
    /// would change every identifier already recorded on the ledger.
    pub fn derive_id(&self) -> CertificateId {
        let mut data = String::with_capacity(
            self.uid.len()
                + self.candidate_name.len()
                + self.course_name.len()
                + self.org_name.len(),
        );
        data.push_str(&self.uid);
        data.push_str(&self.candidate_name);
        data.push_str(&self.course_name);
        data.push_str(&self.org_name);

        CertificateId(hex::encode(hash_data(data.as_bytes())))
    }
}

/// A certificate identifier: 64 lowercase hex characters of a SHA-256
/// digest. This exact string is the QR payload and the ledger key, with no
/// additional encoding or prefix.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CertificateId(pub String);

impl CertificateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CertificateId {
    fn from(s: String) -> Self {
        CertificateId(s)
    }
}

/// A certificate record as stored on the ledger.
///
/// Created once at issuance; the fields are immutable after that. The
/// `valid` flag may later be flipped by ledger-side governance, which this
/// system only ever reads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// The certificate identifier the record is keyed by
    pub id: CertificateId,

    /// The canonical fields as recorded at issuance
    pub fields: CertificateFields,

    /// Content-addressed pointer to the stored PDF artifact
    pub artifact_ref: String,

    /// Whether the ledger currently considers the record valid
    pub valid: bool,
}

/// Outcome of verifying an identifier against the ledger.
///
/// `NotFound` ("never issued / wrong ID") and `Invalid` ("issued but
/// revoked or tampered with") are deliberately distinct variants; they must
/// produce different user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// No ledger record exists for the identifier
    NotFound,

    /// A record exists but its `valid` flag is false
    Invalid,

    /// A valid record exists; carries the stored fields for display
    Valid(CertificateFields),
}

/// Execution metadata returned to the caller after a confirmed issuance.
#[derive(Debug, Clone)]
pub struct IssueReceipt {
    /// Identifier under which the certificate was recorded
    pub certificate_id: CertificateId,

    /// Content-addressed reference of the published PDF
    pub artifact_ref: String,

    /// Local path of the rendered PDF (kept so the caller can attach it to
    /// a notification before cleaning up)
    pub artifact_path: std::path::PathBuf,

    /// Hash of the ledger transaction that recorded the certificate
    pub tx_hash: String,

    /// Gas consumed by the ledger transaction
    pub gas_used: u64,

    /// Wall-clock time spent waiting for ledger confirmation
    pub ledger_latency_ms: u64,

    /// Timestamp of the confirmed issuance
    pub issued_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CertificateFields {
        CertificateFields::new("U1", "Alice", "CS101", "Acme")
    }

    #[test]
    fn test_derive_matches_known_vector() {
        // sha256("U1AliceCS101Acme")
        assert_eq!(
            sample().derive_id().as_str(),
            "53a2995ab5a7df4e1051002c1939f2e4c5f8646e010fdbaf66ec94446ee9ac29"
        );
    }

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(sample().derive_id(), sample().derive_id());
    }

    #[test]
    fn test_any_field_change_changes_the_id() {
        let base = sample().derive_id();

        let mut other = sample();
        other.uid = "U2".into();
        assert_ne!(other.derive_id(), base);

        let mut other = sample();
        other.candidate_name = "Bob".into();
        assert_ne!(other.derive_id(), base);

        let mut other = sample();
        other.course_name = "CS102".into();
        assert_ne!(other.derive_id(), base);

        let mut other = sample();
        other.org_name = "Acme Inc".into();
        assert_ne!(other.derive_id(), base);
    }

    #[test]
    fn test_no_trimming_or_normalization() {
        let mut padded = sample();
        padded.candidate_name = " Alice".into();
        assert_ne!(padded.derive_id(), sample().derive_id());

        let mut lower = sample();
        lower.candidate_name = "alice".into();
        assert_ne!(lower.derive_id(), sample().derive_id());
    }

    #[test]
    fn test_empty_fields_are_permitted_by_derive() {
        let empty = CertificateFields::new("", "", "", "");
        // sha256 of the empty string
        assert_eq!(
            empty.derive_id().as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // ...but rejected at the issuance boundary
        assert!(matches!(empty.validate(), Err(CertError::Validation("uid"))));
    }

    #[test]
    fn test_field_boundary_shift_collides() {
        // Documents the separator-free concatenation weakness: different
        // field splits of the same byte stream share an identifier.
        let shifted = CertificateFields::new("U1A", "lice", "CS101", "Acme");
        assert_eq!(shifted.derive_id(), sample().derive_id());
    }

    #[test]
    fn test_validate_reports_first_empty_field() {
        let mut fields = sample();
        fields.course_name.clear();
        assert!(matches!(
            fields.validate(),
            Err(CertError::Validation("course_name"))
        ));
        assert!(sample().validate().is_ok());
    }
}
