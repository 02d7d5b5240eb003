// src/testing.rs
//! In-memory collaborator doubles shared by the module tests.

use crate::contracts::{LedgerClient, LedgerReceipt};
use crate::error::CertError;
use crate::models::certificate::{CertificateFields, CertificateId, LedgerRecord};
use crate::storage::ContentStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sample_fields() -> CertificateFields {
    CertificateFields::new("U1", "Alice", "CS101", "Acme")
}

/// In-memory ledger with call counters and a governance-side revoke knob.
pub struct MockLedger {
    records: Mutex<HashMap<String, LedgerRecord>>,
    fail_issue: bool,
    pub issue_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail_issue: false,
            issue_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    /// A ledger whose issue call always fails (rejection / timeout).
    pub fn failing() -> Self {
        Self {
            fail_issue: true,
            ..Self::new()
        }
    }

    /// Seeds a valid record, bypassing the issue path.
    pub fn insert(&self, id: &CertificateId, fields: &CertificateFields, artifact_ref: &str) {
        self.records.lock().unwrap().insert(
            id.as_str().to_string(),
            LedgerRecord {
                id: id.clone(),
                fields: fields.clone(),
                artifact_ref: artifact_ref.to_string(),
                valid: true,
            },
        );
    }

    /// Flips a record's validity flag, as ledger-side governance would.
    pub fn revoke(&self, id: &CertificateId) {
        if let Some(record) = self.records.lock().unwrap().get_mut(id.as_str()) {
            record.valid = false;
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn issue(
        &self,
        id: &str,
        fields: &CertificateFields,
        artifact_ref: &str,
    ) -> Result<LedgerReceipt, CertError> {
        self.issue_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_issue {
            return Err(CertError::Ledger("transaction reverted".into()));
        }
        self.records.lock().unwrap().insert(
            id.to_string(),
            LedgerRecord {
                id: CertificateId(id.to_string()),
                fields: fields.clone(),
                artifact_ref: artifact_ref.to_string(),
                valid: true,
            },
        );
        Ok(LedgerReceipt {
            tx_hash: format!("0x{:064x}", self.issue_calls.load(Ordering::SeqCst)),
            gas_used: 21_000,
            latency_ms: 1,
        })
    }

    async fn is_verified(&self, id: &str) -> Result<bool, CertError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(id)
            .map(|r| r.valid)
            .unwrap_or(false))
    }

    async fn get_certificate(&self, id: &str) -> Result<Option<LedgerRecord>, CertError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().get(id).cloned())
    }
}

/// In-memory content store returning a fixed hash, with a failure mode.
pub struct MockStore {
    fail: bool,
    pub publish_calls: AtomicUsize,
    pub published: Mutex<Vec<PathBuf>>,
}

impl MockStore {
    pub const HASH: &'static str = "QmMockArtifactHash";

    pub fn new() -> Self {
        Self {
            fail: false,
            publish_calls: AtomicUsize::new(0),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn publish(&self, path: &Path) -> Result<String, CertError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CertError::StoreUnavailable("pinning service down".into()));
        }
        self.published.lock().unwrap().push(path.to_path_buf());
        Ok(Self::HASH.to_string())
    }
}
