// src/resolver/mod.rs
//! Input normalizers: three independent paths to one identifier.
//!
//! A certificate identifier can arrive typed by hand, buried in a PDF's
//! text layer, or encoded in a QR code. Each channel implements [`Resolve`]
//! and yields a [`CertificateId`]; everything after resolution goes through
//! the single shared verification path, which is what makes the three
//! channels converge on identical behavior for the same certificate.

use crate::artifact::extractor::extract_certificate;
use crate::error::CertError;
use crate::models::certificate::CertificateId;
use crate::scanner::decode_frame;

/// A source a certificate identifier can be resolved from.
///
/// `Send + Sync` so a `&dyn Resolve` can be held across await points in
/// the async verification path.
pub trait Resolve: Send + Sync {
    /// Resolves this source to a certificate identifier.
    ///
    /// # Errors
    /// Returns `CertError::Extraction` if the source does not contain
    /// certificate data.
    fn resolve(&self) -> Result<CertificateId, CertError>;
}

/// Manual entry: the user types the identifier. Used as-is against the
/// ledger, with no transformation.
pub struct ManualEntry(pub String);

impl Resolve for ManualEntry {
    fn resolve(&self) -> Result<CertificateId, CertError> {
        Ok(CertificateId(self.0.clone()))
    }
}

/// Uploaded PDF: the four fields are read back by the positional contract
/// and the identifier re-derived from them.
pub struct PdfUpload<'a>(pub &'a [u8]);

impl Resolve for PdfUpload<'_> {
    fn resolve(&self) -> Result<CertificateId, CertError> {
        let fields = extract_certificate(self.0)?;
        Ok(fields.derive_id())
    }
}

/// QR image or camera frame: the decoded payload is the identifier
/// directly, with no re-derivation.
pub struct QrImage<'a>(pub &'a image::GrayImage);

impl Resolve for QrImage<'_> {
    fn resolve(&self) -> Result<CertificateId, CertError> {
        decode_frame(self.0)
            .map(CertificateId)
            .ok_or_else(|| CertError::Extraction("no QR payload found in image".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::renderer::{qr_pixels, CertificateRenderer};
    use crate::models::certificate::CertificateFields;

    fn sample() -> CertificateFields {
        CertificateFields::new("U1", "Alice", "CS101", "Acme")
    }

    #[test]
    fn test_manual_entry_is_passed_through_unchanged() {
        let id = ManualEntry("AbC123  ".into()).resolve().unwrap();
        assert_eq!(id.as_str(), "AbC123  ");
    }

    #[test]
    fn test_all_three_channels_yield_the_same_identifier() {
        let fields = sample();
        let expected = fields.derive_id();

        // Channel 1: manual entry of the known identifier
        let manual = ManualEntry(expected.as_str().to_string()).resolve().unwrap();

        // Channel 2: extraction from the rendered PDF
        let pdf = CertificateRenderer::new(None)
            .render_to_bytes(&fields, &expected)
            .unwrap();
        let from_pdf = PdfUpload(&pdf).resolve().unwrap();

        // Channel 3: QR decode of the embedded payload
        let (side, pixels) = qr_pixels(expected.as_str()).unwrap();
        let img = image::GrayImage::from_raw(side, side, pixels).unwrap();
        let from_qr = QrImage(&img).resolve().unwrap();

        assert_eq!(manual, expected);
        assert_eq!(from_pdf, expected);
        assert_eq!(from_qr, expected);
    }

    #[test]
    fn test_blank_image_is_an_extraction_error() {
        let img = image::GrayImage::from_pixel(64, 64, image::Luma([0xFFu8]));
        let err = QrImage(&img).resolve().unwrap_err();
        assert!(matches!(err, CertError::Extraction(_)));
    }
}
