// src/error.rs
//! Error taxonomy for the certificate system.
//!
//! Every failure a request can hit maps onto one of these variants so the
//! API boundary can turn it into a human-readable message plus an actionable
//! suggestion. Verification outcomes (`NotFound` / `Invalid`) are *not*
//! errors; they live in [`crate::models::certificate::VerificationResult`]
//! so the two can never be collapsed into one message.

use thiserror::Error;

/// All failure modes of the issuance and verification protocols.
#[derive(Debug, Error)]
pub enum CertError {
    /// A required certificate field was missing or empty. Raised at the
    /// issuance boundary before any I/O happens.
    #[error("missing required field: {0}")]
    Validation(&'static str),

    /// Certificate PDF could not be produced. Aborts issuance before the
    /// content store or the ledger is touched.
    #[error("certificate rendering failed: {0}")]
    Render(String),

    /// The content store rejected or failed the artifact publish. Issuance
    /// aborts here so no ledger record can point at an unreachable artifact.
    #[error("artifact store unavailable: {0}")]
    StoreUnavailable(String),

    /// A ledger call failed, was rejected, or timed out. Surfaced to the
    /// caller with no automatic retry (a retry could double-issue).
    #[error("ledger call failed: {0}")]
    Ledger(String),

    /// The uploaded document or scanned image did not yield certificate
    /// data: the PDF text layout did not match the positional contract, or
    /// the QR decode produced no payload.
    #[error("not a valid certificate document: {0}")]
    Extraction(String),

    /// Email delivery failed. Never fails an already-confirmed issuance;
    /// callers log and report it independently.
    #[error("notification delivery failed: {0}")]
    Notification(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CertError {
    /// Actionable suggestion to show next to the error message, mirroring
    /// the guidance the verification portal displays for each failure.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CertError::Validation(_) => {
                Some("Fill in UID, candidate name, course name and organization name.")
            }
            CertError::StoreUnavailable(_) => {
                Some("The artifact store could not be reached. Try again once it is available; nothing was written to the ledger.")
            }
            CertError::Ledger(_) => {
                Some("The ledger did not confirm the operation. Check the node connection before retrying manually.")
            }
            CertError::Extraction(_) => {
                Some("Upload the official, unmodified certificate PDF, or scan the QR code on its top-right corner.")
            }
            CertError::Notification(_) => {
                Some("The certificate was issued; resend the email once the mail server is reachable.")
            }
            CertError::Render(_) | CertError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages_are_distinct() {
        let store = CertError::StoreUnavailable("timeout".into());
        let ledger = CertError::Ledger("reverted".into());
        assert_ne!(store.to_string(), ledger.to_string());
        assert!(store.suggestion().is_some());
        assert!(ledger.suggestion().is_some());
    }

    #[test]
    fn test_extraction_message_names_the_document() {
        let err = CertError::Extraction("only 2 text lines".into());
        assert!(err.to_string().contains("not a valid certificate document"));
    }
}
