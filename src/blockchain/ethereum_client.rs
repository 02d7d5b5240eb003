// src/blockchain/ethereum_client.rs
//! Ethereum JSON-RPC client implementation.
//!
//! Provides a high-level interface for interacting with the chain the
//! certificate registry is deployed on: transaction sending with receipt
//! confirmation, read-only contract queries, and wallet management.

use crate::error::CertError;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers_contract::Contract;
use ethers_core::abi::{Abi, Detokenize, Tokenize};
use ethers_core::types::{Address, TransactionReceipt, U256};
use std::sync::Arc;

/// Ethereum client for managing wallet and contract interactions.
///
/// This client provides:
/// - Wallet management from a hex-encoded private key
/// - Transaction sending that blocks until the receipt is available
/// - Read-only contract query functionality
#[derive(Clone)]
pub struct EthereumClient {
    /// JSON-RPC provider (read path)
    provider: Arc<Provider<Http>>,
    /// Provider wrapped with a signing wallet (write path)
    signer: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl EthereumClient {
    /// Creates a new Ethereum client instance.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint URL
    /// * `private_key` - Hex-encoded private key (with or without 0x prefix)
    ///
    /// # Errors
    /// Returns `CertError::Ledger` if:
    /// - The RPC URL is malformed
    /// - The private key is invalid
    /// - The chain ID cannot be retrieved
    pub async fn new(rpc_url: &str, private_key: &str) -> Result<Self, CertError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| CertError::Ledger(format!("invalid RPC URL: {}", e)))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| CertError::Ledger(format!("failed to fetch chain id: {}", e)))?
            .as_u64();

        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| CertError::Ledger(format!("invalid private key: {}", e)))?
            .with_chain_id(chain_id);

        let signer = Arc::new(SignerMiddleware::new(provider.clone(), wallet));

        Ok(Self {
            provider: Arc::new(provider),
            signer,
        })
    }

    /// Gets the wallet's address.
    #[allow(dead_code)]
    pub fn address(&self) -> Address {
        self.signer.signer().address()
    }

    /// Sends a transaction to a smart contract and waits for inclusion.
    ///
    /// Blocking by design: the caller needs the receipt to report success
    /// and gas cost, so there is no fire-and-forget path. The call is
    /// attempted at most once; retry policy, if any, belongs to the caller's
    /// collaborator contract.
    ///
    /// # Arguments
    /// * `contract_address` - Address of the target contract
    /// * `abi` - Contract ABI bytes
    /// * `method` - Method name to call
    /// * `params` - Method parameters
    ///
    /// # Returns
    /// The transaction receipt of the confirmed transaction.
    ///
    /// # Errors
    /// Returns `CertError::Ledger` if:
    /// - ABI loading fails
    /// - Method invocation fails
    /// - Transaction sending fails or the transaction is dropped before
    ///   a receipt is produced
    ///
    /// # Gas Usage
    /// Uses fixed gas limit of 3,000,000 (adjust based on contract requirements)
    pub async fn send_transaction(
        &self,
        contract_address: Address,
        abi: &[u8],
        method: &str,
        params: impl Tokenize,
    ) -> Result<TransactionReceipt, CertError> {
        let abi = Abi::load(abi)
            .map_err(|e| CertError::Ledger(format!("failed to load contract ABI: {}", e)))?;
        let contract = Contract::new(contract_address, abi, self.signer.clone());

        let call = contract
            .method::<_, ()>(method, params)
            .map_err(|e| CertError::Ledger(format!("{} call construction failed: {}", method, e)))?
            .gas(U256::from(3_000_000u64));

        let pending = call
            .send()
            .await
            .map_err(|e| CertError::Ledger(format!("{} transaction rejected: {}", method, e)))?;

        pending
            .await
            .map_err(|e| CertError::Ledger(format!("{} confirmation failed: {}", method, e)))?
            .ok_or_else(|| {
                CertError::Ledger(format!("{} transaction dropped before inclusion", method))
            })
    }

    /// Queries a smart contract (read-only operation).
    ///
    /// # Arguments
    /// * `contract_address` - Address of the target contract
    /// * `abi` - Contract ABI bytes
    /// * `method` - Method name to call
    /// * `params` - Method parameters
    ///
    /// # Returns
    /// Decoded return value from the contract call.
    ///
    /// # Errors
    /// Returns `CertError::Ledger` if ABI loading, method invocation, or
    /// return value decoding fails.
    pub async fn query_contract<R: Detokenize>(
        &self,
        contract_address: Address,
        abi: &[u8],
        method: &str,
        params: impl Tokenize,
    ) -> Result<R, CertError> {
        let abi = Abi::load(abi)
            .map_err(|e| CertError::Ledger(format!("failed to load contract ABI: {}", e)))?;
        let contract = Contract::new(contract_address, abi, self.provider.clone());

        contract
            .method::<_, R>(method, params)
            .map_err(|e| CertError::Ledger(format!("{} call construction failed: {}", method, e)))?
            .call()
            .await
            .map_err(|e| CertError::Ledger(format!("{} query failed: {}", method, e)))
    }
}
