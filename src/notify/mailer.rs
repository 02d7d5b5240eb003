// src/notify/mailer.rs
//! SMTP notification sender.
//!
//! Emails issued certificates to the student and/or verifier with the PDF
//! attached and the identifier in the body. Delivery is best-effort from
//! the issuance protocol's point of view: a confirmed ledger record never
//! becomes a failure because the mail server was down.

use crate::error::CertError;
use crate::models::certificate::{CertificateFields, CertificateId};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;

/// SMTP mailer with STARTTLS authentication.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl Mailer {
    /// Creates a mailer against the given SMTP relay.
    ///
    /// # Arguments
    /// * `smtp_host` - Relay hostname (STARTTLS on the submission port)
    /// * `sender_email` - From address, also the login username
    /// * `sender_password` - Login password / app password
    ///
    /// # Errors
    /// Returns `CertError::Notification` if the host or sender address is
    /// malformed.
    pub fn new(
        smtp_host: &str,
        sender_email: &str,
        sender_password: &str,
    ) -> Result<Self, CertError> {
        // Validate the address before the transport spawns its pool task.
        let sender = sender_email
            .parse::<Mailbox>()
            .map_err(|e| CertError::Notification(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
            .map_err(|e| CertError::Notification(format!("invalid SMTP relay: {}", e)))?
            .credentials(Credentials::new(
                sender_email.to_string(),
                sender_password.to_string(),
            ))
            .build();

        Ok(Self { transport, sender })
    }

    /// Sends a message with a file attachment to each recipient.
    ///
    /// # Errors
    /// Returns `CertError::Notification` on the first recipient that
    /// cannot be parsed or delivered.
    pub async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
        attachment_path: &Path,
    ) -> Result<(), CertError> {
        let data = tokio::fs::read(attachment_path).await?;
        let file_name = attachment_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "certificate.pdf".to_string());

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| CertError::Notification(e.to_string()))?;

        for recipient in recipients {
            let to = recipient
                .parse::<Mailbox>()
                .map_err(|e| CertError::Notification(format!("invalid recipient: {}", e)))?;

            let message = Message::builder()
                .from(self.sender.clone())
                .to(to)
                .subject(subject)
                .multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(body.to_string()))
                        .singlepart(
                            Attachment::new(file_name.clone())
                                .body(data.clone(), pdf_type.clone()),
                        ),
                )
                .map_err(|e| CertError::Notification(format!("message build failed: {}", e)))?;

            self.transport
                .send(message)
                .await
                .map_err(|e| CertError::Notification(format!("delivery failed: {}", e)))?;
            log::info!("certificate emailed to {}", recipient);
        }
        Ok(())
    }
}

/// Composes the notification body for an issued certificate.
pub fn certificate_email_body(fields: &CertificateFields, certificate_id: &CertificateId) -> String {
    format!(
        "Dear {},\n\n\
         Please find attached your certificate for completing the course: {}.\n\n\
         Your unique Certificate ID is: {}\n\n\
         This can be verified on our portal.\n\n\
         Best Regards,\n{}",
        fields.candidate_name, fields.course_name, certificate_id, fields.org_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_fields;

    #[test]
    fn test_body_carries_the_identifier_and_course() {
        let fields = sample_fields();
        let id = fields.derive_id();
        let body = certificate_email_body(&fields, &id);
        assert!(body.contains(id.as_str()));
        assert!(body.contains("CS101"));
        assert!(body.starts_with("Dear Alice,"));
    }

    #[tokio::test]
    async fn test_bad_sender_address_is_a_notification_error() {
        let err = Mailer::new("smtp.gmail.com", "not-an-address", "pw").err();
        assert!(matches!(err, Some(CertError::Notification(_))));
    }

    #[tokio::test]
    async fn test_valid_sender_address_builds_a_mailer() {
        assert!(Mailer::new("smtp.gmail.com", "issuer@acme.example", "pw").is_ok());
    }
}
