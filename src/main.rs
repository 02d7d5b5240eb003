// src/main.rs

//! # Certificate System - Main Entry Point
//!
//! This module serves as the main entry point for the blockchain-backed
//! certificate issuance and verification system. It initializes all core
//! components and starts the API server.
//!
//! ## Architecture Overview
//! 1. **Blockchain Layer**: `EthereumClient` for the registry contract
//! 2. **Services Layer**: Certificate issuance, verification, and API endpoints
//! 3. **Storage Layer**: Pinata/IPFS for content-addressed PDF storage
//! 4. **Artifact Layer**: PDF rendering with embedded QR, text extraction
//!
//! ## Environment Variables Required
//! - `RPC_URL`: JSON-RPC endpoint of the chain (default: http://127.0.0.1:8545)
//! - `PRIVATE_KEY`: Issuer wallet private key
//! - `CERTIFICATE_REGISTRY_ADDRESS`: Deployed CertificateRegistry contract address
//! - `PINATA_API_KEY` / `PINATA_API_SECRET`: Pinning service credentials
//! - `SMTP_HOST`, `SENDER_EMAIL`, `SENDER_PASSWORD`: (Optional) notification mailer
//! - `INSTITUTE_LOGO_PATH`: (Optional) logo image for rendered certificates

use crate::artifact::renderer::CertificateRenderer;
use crate::blockchain::ethereum_client::EthereumClient;
use crate::contracts::certificate_registry::CertificateRegistry;
use crate::notify::mailer::Mailer;
use crate::services::api_server::ApiServer;
use crate::services::issuer::CertificateIssuer;
use crate::services::verifier::Verifier;
use crate::storage::pinata_client::PinataClient;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod artifact; // PDF rendering and text-layer extraction
mod blockchain; // Ethereum blockchain interactions
mod contracts; // Registry contract interface (ledger boundary)
mod error; // Failure taxonomy
mod models; // Data structures
mod notify; // Email notification
mod resolver; // The three identifier input channels
mod scanner; // Live QR-scan channel
mod services; // Business logic and API
mod storage; // Content-addressed artifact storage
mod utils; // Helper functions

#[cfg(test)]
mod testing; // Shared collaborator doubles

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Connect to the chain the registry is deployed on
/// 3. Initialize service components
/// 4. Start API server
///
/// # Panics
/// - If required environment variables are missing
/// - If the Ethereum client fails to initialize
/// - If the contract address is invalid
#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let rpc_url =
        std::env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
    let private_key = std::env::var("PRIVATE_KEY").expect("PRIVATE_KEY must be set in .env");

    let ethereum_client = EthereumClient::new(&rpc_url, &private_key)
        .await
        .expect("Failed to initialize EthereumClient - check network connection and private key");
    let ethereum_client = Arc::new(ethereum_client);

    let registry_address = std::env::var("CERTIFICATE_REGISTRY_ADDRESS")
        .expect("CERTIFICATE_REGISTRY_ADDRESS must be set in .env");
    let registry = Arc::new(
        CertificateRegistry::new(ethereum_client.clone(), &registry_address)
            .expect("Failed to initialize CertificateRegistry - verify contract address"),
    );

    let pinata_api_key =
        std::env::var("PINATA_API_KEY").expect("PINATA_API_KEY must be set in .env");
    let pinata_api_secret =
        std::env::var("PINATA_API_SECRET").expect("PINATA_API_SECRET must be set in .env");
    let pinata = Arc::new(PinataClient::new(pinata_api_key, pinata_api_secret));

    let logo_path = std::env::var("INSTITUTE_LOGO_PATH").ok().map(PathBuf::from);
    let renderer = CertificateRenderer::new(logo_path);

    // The mailer is optional; issuance works without notifications.
    let mailer = match (
        std::env::var("SMTP_HOST"),
        std::env::var("SENDER_EMAIL"),
        std::env::var("SENDER_PASSWORD"),
    ) {
        (Ok(host), Ok(email), Ok(password)) => Some(
            Mailer::new(&host, &email, &password)
                .expect("Failed to initialize mailer - check SMTP settings"),
        ),
        _ => {
            log::info!("mailer not configured; certificates will not be emailed");
            None
        }
    };

    let issuer = CertificateIssuer::new(
        registry.clone(),
        pinata,
        renderer,
        std::env::temp_dir(),
    );
    let verifier = Verifier::new(registry);

    let api_server = ApiServer::new(issuer, verifier, mailer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("API server running at http://{}", addr);
    log::info!("Available endpoints:");
    log::info!("- POST /issue-certificate");
    log::info!("- POST /verify-certificate");
    log::info!("- POST /verify-pdf");
    log::info!("- POST /verify-qr");
    log::info!("- GET  /certificate/:id");
    log::info!("- GET  /certificate/:id/qr");

    api_server.run(addr).await;
}
