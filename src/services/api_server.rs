// src/services/api_server.rs
//! API Server for the certificate system
//!
//! This module provides the REST interface over the issuance and
//! verification protocols. Every failure is converted at this boundary
//! into a human-readable message plus an actionable suggestion; no request
//! failure is fatal to the process.
//!
//! The API is built using Axum and includes endpoints for:
//! - Certificate issuance (with optional email notification)
//! - Verification by typed identifier, uploaded PDF, or QR image
//! - Viewing a stored certificate record
//! - Downloading the QR code for an identifier

use crate::artifact::renderer::qr_pixels;
use crate::error::CertError;
use crate::models::certificate::{CertificateFields, VerificationResult};
use crate::notify::mailer::{certificate_email_body, Mailer};
use crate::resolver::{ManualEntry, PdfUpload, QrImage};
use crate::services::issuer::CertificateIssuer;
use crate::services::verifier::Verifier;
use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

// API request and response structures

/// Request payload for issuing a certificate
#[derive(Serialize, Deserialize)]
struct IssueCertificateRequest {
    uid: String,
    candidate_name: String,
    course_name: String,
    org_name: String,
    /// Optional recipient: the candidate
    student_email: Option<String>,
    /// Optional recipient: a third-party verifier
    verifier_email: Option<String>,
}

/// Response for a confirmed issuance
#[derive(Serialize, Deserialize)]
struct IssueCertificateResponse {
    certificate_id: String,
    artifact_ref: String,
    tx_hash: String,
    gas_used: u64,
    ledger_latency_ms: u64,
    /// Whether the notification email was delivered to all recipients
    emailed: bool,
}

/// Request payload for verifying a typed certificate identifier
#[derive(Serialize, Deserialize)]
struct VerifyCertificateRequest {
    certificate_id: String,
}

/// Response for any verification channel
#[derive(Serialize, Deserialize)]
struct VerifyCertificateResponse {
    /// One of "valid", "invalid", "not_found"
    status: String,
    /// Stored fields, present only for a valid certificate
    fields: Option<CertificateFields>,
    message: String,
    suggestion: Option<String>,
}

/// Response for the certificate view endpoint
#[derive(Serialize, Deserialize)]
struct CertificateRecordResponse {
    certificate_id: String,
    fields: CertificateFields,
    artifact_ref: String,
    valid: bool,
}

/// Error payload shared by all endpoints
#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    suggestion: Option<String>,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Service implementing the issuance protocol
    issuer: Arc<CertificateIssuer>,

    /// Service implementing the verification protocol
    verifier: Arc<Verifier>,

    /// Optional notification sender; issuance works without one
    mailer: Option<Arc<Mailer>>,
}

impl ApiServer {
    /// Creates a new instance of the API server
    pub fn new(
        issuer: CertificateIssuer,
        verifier: Verifier,
        mailer: Option<Mailer>,
    ) -> Self {
        ApiServer {
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
            mailer: mailer.map(Arc::new),
        }
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) {
        // Configure all API routes
        let app = Router::new()
            .route("/issue-certificate", post(Self::issue_certificate_handler))
            .route("/verify-certificate", post(Self::verify_certificate_handler))
            .route("/verify-pdf", post(Self::verify_pdf_handler))
            .route("/verify-qr", post(Self::verify_qr_handler))
            .route("/certificate/:id", get(Self::get_certificate_handler))
            .route("/certificate/:id/qr", get(Self::certificate_qr_handler))
            .with_state(Arc::new(self.clone()));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind API server address");

        axum::serve(listener, app)
            .await
            .expect("API server terminated unexpectedly");
    }

    /// Maps an error onto a status code and the shared error payload.
    fn error_response(err: &CertError) -> (StatusCode, Json<ErrorResponse>) {
        let status = match err {
            CertError::Validation(_) | CertError::Extraction(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: err.to_string(),
                suggestion: err.suggestion().map(String::from),
            }),
        )
    }

    /// Builds the channel-independent verification response.
    fn verification_response(outcome: VerificationResult) -> VerifyCertificateResponse {
        match outcome {
            VerificationResult::Valid(fields) => VerifyCertificateResponse {
                status: "valid".into(),
                fields: Some(fields),
                message: "Certificate validated successfully!".into(),
                suggestion: None,
            },
            VerificationResult::Invalid => VerifyCertificateResponse {
                status: "invalid".into(),
                fields: None,
                message: "Verification failed: the certificate record on the ledger is marked as invalid or has been tampered with.".into(),
                suggestion: Some(
                    "Ensure you are using the latest version of the certificate. If the issue persists, contact the issuing organization.".into(),
                ),
            },
            VerificationResult::NotFound => VerifyCertificateResponse {
                status: "not_found".into(),
                fields: None,
                message: "No certificate found for this ID on the ledger.".into(),
                suggestion: Some(
                    "Double-check the certificate ID for typos; it is a 64-character hexadecimal string.".into(),
                ),
            },
        }
    }

    // =====================
    // Issuance Handlers
    // =====================

    /// Issues a certificate and optionally emails the PDF
    ///
    /// # Endpoint
    /// POST /issue-certificate
    ///
    /// # Responses
    /// - 200 OK: Returns identifier, artifact ref and execution metadata
    /// - 400 Bad Request: Missing required field
    /// - 500 Internal Server Error: Store or ledger operation failed
    async fn issue_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<IssueCertificateRequest>,
    ) -> Response {
        let fields = CertificateFields {
            uid: payload.uid,
            candidate_name: payload.candidate_name,
            course_name: payload.course_name,
            org_name: payload.org_name,
        };

        let receipt = match state.issuer.issue(fields.clone()).await {
            Ok(receipt) => receipt,
            Err(e) => {
                log::error!("issuance failed: {}", e);
                return Self::error_response(&e).into_response();
            }
        };

        // Notification is best-effort; a confirmed issuance never fails here.
        let recipients: Vec<String> = [payload.student_email, payload.verifier_email]
            .into_iter()
            .flatten()
            .filter(|addr| !addr.is_empty())
            .collect();

        let mut emailed = false;
        if !recipients.is_empty() {
            if let Some(mailer) = &state.mailer {
                let subject =
                    format!("Certificate of Completion for {}", fields.candidate_name);
                let body = certificate_email_body(&fields, &receipt.certificate_id);
                match mailer
                    .send(&recipients, &subject, &body, &receipt.artifact_path)
                    .await
                {
                    Ok(()) => emailed = true,
                    Err(e) => log::warn!("notification failed: {}", e),
                }
            } else {
                log::warn!("recipients given but no mailer configured");
            }
        }

        // The artifact lives in the content store now; drop the local copy.
        if let Err(e) = std::fs::remove_file(&receipt.artifact_path) {
            log::warn!(
                "could not remove {}: {}",
                receipt.artifact_path.display(),
                e
            );
        }

        (
            StatusCode::OK,
            Json(IssueCertificateResponse {
                certificate_id: receipt.certificate_id.to_string(),
                artifact_ref: receipt.artifact_ref,
                tx_hash: receipt.tx_hash,
                gas_used: receipt.gas_used,
                ledger_latency_ms: receipt.ledger_latency_ms,
                emailed,
            }),
        )
            .into_response()
    }

    // =====================
    // Verification Handlers
    // =====================

    /// Verifies a typed certificate identifier (manual-entry channel)
    ///
    /// # Endpoint
    /// POST /verify-certificate
    async fn verify_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<VerifyCertificateRequest>,
    ) -> Response {
        let source = ManualEntry(payload.certificate_id);
        match state.verifier.verify_source(&source).await {
            Ok(outcome) => {
                (StatusCode::OK, Json(Self::verification_response(outcome))).into_response()
            }
            Err(e) => Self::error_response(&e).into_response(),
        }
    }

    /// Verifies an uploaded certificate PDF (extraction channel)
    ///
    /// # Endpoint
    /// POST /verify-pdf
    ///
    /// # Request Body
    /// Raw PDF bytes
    ///
    /// # Responses
    /// - 200 OK: Verification outcome
    /// - 400 Bad Request: Not a valid certificate document
    async fn verify_pdf_handler(
        State(state): State<Arc<ApiServer>>,
        body: Bytes,
    ) -> Response {
        let source = PdfUpload(&body);
        match state.verifier.verify_source(&source).await {
            Ok(outcome) => {
                (StatusCode::OK, Json(Self::verification_response(outcome))).into_response()
            }
            Err(e) => Self::error_response(&e).into_response(),
        }
    }

    /// Verifies a QR image (scan channel, single frame)
    ///
    /// # Endpoint
    /// POST /verify-qr
    ///
    /// # Request Body
    /// Raw image bytes (any format the image crate can load)
    async fn verify_qr_handler(
        State(state): State<Arc<ApiServer>>,
        body: Bytes,
    ) -> Response {
        let frame = match image::load_from_memory(&body) {
            Ok(img) => img.to_luma8(),
            Err(e) => {
                let err = CertError::Extraction(format!("unreadable image: {}", e));
                return Self::error_response(&err).into_response();
            }
        };

        let source = QrImage(&frame);
        match state.verifier.verify_source(&source).await {
            Ok(outcome) => {
                (StatusCode::OK, Json(Self::verification_response(outcome))).into_response()
            }
            Err(e) => Self::error_response(&e).into_response(),
        }
    }

    /// Returns the stored record for display
    ///
    /// # Endpoint
    /// GET /certificate/:id
    ///
    /// # Responses
    /// - 200 OK: Stored fields, artifact reference and validity flag
    /// - 404 Not Found: No record for the identifier
    async fn get_certificate_handler(
        Path(id): Path<String>,
        State(state): State<Arc<ApiServer>>,
    ) -> Response {
        match state.verifier.get_record(&id).await {
            Ok(Some(record)) => (
                StatusCode::OK,
                Json(CertificateRecordResponse {
                    certificate_id: record.id.to_string(),
                    fields: record.fields,
                    artifact_ref: record.artifact_ref,
                    valid: record.valid,
                }),
            )
                .into_response(),
            Ok(None) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "No certificate found with the provided ID.".into(),
                    suggestion: Some(
                        "Double-check the certificate ID for typos; it is a 64-character hexadecimal string.".into(),
                    ),
                }),
            )
                .into_response(),
            Err(e) => Self::error_response(&e).into_response(),
        }
    }

    /// Returns the QR code for an identifier as a PNG
    ///
    /// # Endpoint
    /// GET /certificate/:id/qr
    async fn certificate_qr_handler(Path(id): Path<String>) -> Response {
        let png = qr_pixels(&id).and_then(|(side, pixels)| {
            let img = image::GrayImage::from_raw(side, side, pixels)
                .ok_or_else(|| CertError::Render("QR buffer size mismatch".into()))?;
            let mut buf = std::io::Cursor::new(Vec::new());
            img.write_to(&mut buf, image::ImageOutputFormat::Png)
                .map_err(|e| CertError::Render(format!("PNG encoding failed: {}", e)))?;
            Ok(buf.into_inner())
        });

        match png {
            Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
            Err(e) => Self::error_response(&e).into_response(),
        }
    }
}
