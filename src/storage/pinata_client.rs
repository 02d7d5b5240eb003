// src/storage/pinata_client.rs
//! Pinata pinning-service client for IPFS artifact storage.
//!
//! Publishes certificate PDFs through Pinata's `pinFileToIPFS` endpoint and
//! returns the resulting CID, which becomes the certificate record's
//! content-addressed artifact reference.
//!
//! # Security Considerations
//! - Pinned content is public by default (IPFS is a public network)
//! - API credentials are passed as headers, never logged

use crate::error::CertError;
use crate::storage::ContentStore;
use async_trait::async_trait;
use std::path::Path;

/// Default Pinata API base URL.
const PINATA_API_URL: &str = "https://api.pinata.cloud";

/// Pinata HTTP client with API-key authentication.
#[derive(Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl PinataClient {
    /// Creates a client against the public Pinata API.
    ///
    /// # Arguments
    /// * `api_key` - Pinata API key
    /// * `api_secret` - Pinata API secret
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self::with_base_url(PINATA_API_URL.to_string(), api_key, api_secret)
    }

    /// Creates a client against an arbitrary base URL (used by tests to
    /// point at a local mock server).
    pub fn with_base_url(base_url: String, api_key: String, api_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            api_secret,
        }
    }
}

#[async_trait]
impl ContentStore for PinataClient {
    /// Uploads the file as a multipart request and returns the `IpfsHash`
    /// from Pinata's response.
    ///
    /// # Errors
    /// Returns `CertError::StoreUnavailable` if the request fails, the
    /// service answers with a non-success status, or the response carries
    /// no `IpfsHash`.
    async fn publish(&self, path: &Path) -> Result<String, CertError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certificate.pdf".to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(data).file_name(file_name));

        let response = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.base_url))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.api_secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CertError::StoreUnavailable(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CertError::StoreUnavailable(format!("unreadable response: {}", e)))?;

        if !status.is_success() {
            return Err(CertError::StoreUnavailable(format!(
                "pin request failed with status {}: {}",
                status, body
            )));
        }

        match body.get("IpfsHash").and_then(|h| h.as_str()) {
            Some(hash) => {
                log::info!("artifact pinned to IPFS with hash {}", hash);
                Ok(hash.to_string())
            }
            None => Err(CertError::StoreUnavailable(format!(
                "response carried no IpfsHash: {}",
                body
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_pdf() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.5 test artifact").unwrap();
        file
    }

    #[tokio::test]
    async fn test_publish_returns_ipfs_hash() {
        let _m = mockito::mock("POST", "/pinning/pinFileToIPFS")
            .match_header("pinata_api_key", "good-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"IpfsHash":"QmTestHash123","PinSize":1234}"#)
            .create();

        let client = PinataClient::with_base_url(
            mockito::server_url(),
            "good-key".into(),
            "secret".into(),
        );
        let file = temp_pdf();

        let hash = client.publish(file.path()).await.unwrap();
        assert_eq!(hash, "QmTestHash123");
    }

    #[tokio::test]
    async fn test_publish_failure_is_store_unavailable() {
        let _m = mockito::mock("POST", "/pinning/pinFileToIPFS")
            .match_header("pinata_api_key", "bad-key")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Invalid API key"}"#)
            .create();

        let client = PinataClient::with_base_url(
            mockito::server_url(),
            "bad-key".into(),
            "creds".into(),
        );
        let file = temp_pdf();

        let err = client.publish(file.path()).await.unwrap_err();
        assert!(matches!(err, CertError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_hash_in_response_is_store_unavailable() {
        let _m = mockito::mock("POST", "/pinning/pinFileToIPFS")
            .match_header("pinata_api_key", "no-hash-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"PinSize":1234}"#)
            .create();

        let client = PinataClient::with_base_url(
            mockito::server_url(),
            "no-hash-key".into(),
            "secret".into(),
        );
        let file = temp_pdf();

        let err = client.publish(file.path()).await.unwrap_err();
        assert!(matches!(err, CertError::StoreUnavailable(_)));
    }
}
