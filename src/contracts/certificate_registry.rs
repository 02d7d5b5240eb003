// src/contracts/certificate_registry.rs
//! Certificate Registry smart contract interface.
//!
//! Provides a high-level API for the on-chain certificate registry.
//! Supports recording certificates and querying their verification status,
//! keyed by the SHA-256 certificate identifier.

use crate::blockchain::ethereum_client::EthereumClient;
use crate::contracts::{LedgerClient, LedgerReceipt};
use crate::error::CertError;
use crate::models::certificate::{CertificateFields, CertificateId, LedgerRecord};
use async_trait::async_trait;
use ethers_core::types::Address;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Compile-time included ABI of the deployed registry contract.
const REGISTRY_ABI: &[u8] = include_bytes!("abi/CertificateRegistry.json");

/// Certificate Registry smart contract wrapper.
///
/// This struct provides methods to interact with the registry contract:
/// - Record new certificates (`generateCertificate`)
/// - Check validity (`isVerified`)
/// - Fetch full records (`getCertificate`)
pub struct CertificateRegistry {
    /// Client for interacting with the chain
    client: Arc<EthereumClient>,

    /// Address of the deployed registry contract
    contract_address: Address,
}

impl CertificateRegistry {
    /// Creates a new CertificateRegistry instance.
    ///
    /// # Arguments
    /// * `client` - Configured Ethereum client
    /// * `contract_address` - Hex string of the registry contract address
    ///
    /// # Errors
    /// Returns `CertError::Ledger` if the address string is malformed.
    pub fn new(client: Arc<EthereumClient>, contract_address: &str) -> Result<Self, CertError> {
        Ok(Self {
            client,
            contract_address: Address::from_str(contract_address)
                .map_err(|e| CertError::Ledger(format!("invalid contract address: {}", e)))?,
        })
    }
}

#[async_trait]
impl LedgerClient for CertificateRegistry {
    /// Records a certificate on-chain and blocks until the transaction
    /// receipt is available, so gas usage and latency can be reported.
    async fn issue(
        &self,
        id: &str,
        fields: &CertificateFields,
        artifact_ref: &str,
    ) -> Result<LedgerReceipt, CertError> {
        let start = Instant::now();

        let receipt = self
            .client
            .send_transaction(
                self.contract_address,
                REGISTRY_ABI,
                "generateCertificate",
                (
                    id.to_string(),
                    fields.uid.clone(),
                    fields.candidate_name.clone(),
                    fields.course_name.clone(),
                    fields.org_name.clone(),
                    artifact_ref.to_string(),
                ),
            )
            .await?;

        Ok(LedgerReceipt {
            tx_hash: format!("{:#x}", receipt.transaction_hash),
            gas_used: receipt.gas_used.unwrap_or_default().as_u64(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Checks the validity flag for an identifier.
    async fn is_verified(&self, id: &str) -> Result<bool, CertError> {
        self.client
            .query_contract(
                self.contract_address,
                REGISTRY_ABI,
                "isVerified",
                id.to_string(),
            )
            .await
    }

    /// Fetches the stored record for an identifier.
    ///
    /// The contract returns an `exists` flag rather than reverting on an
    /// unknown identifier, which is what lets the verification protocol
    /// distinguish "never issued" from "issued but invalid".
    async fn get_certificate(&self, id: &str) -> Result<Option<LedgerRecord>, CertError> {
        let (exists, uid, candidate_name, course_name, org_name, ipfs_hash, valid): (
            bool,
            String,
            String,
            String,
            String,
            String,
            bool,
        ) = self
            .client
            .query_contract(
                self.contract_address,
                REGISTRY_ABI,
                "getCertificate",
                id.to_string(),
            )
            .await?;

        if !exists {
            return Ok(None);
        }

        Ok(Some(LedgerRecord {
            id: CertificateId(id.to_string()),
            fields: CertificateFields {
                uid,
                candidate_name,
                course_name,
                org_name,
            },
            artifact_ref: ipfs_hash,
            valid,
        }))
    }
}
