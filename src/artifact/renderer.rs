// src/artifact/renderer.rs
//! Certificate PDF renderer.
//!
//! Builds a single-page letter-size PDF whose text layer follows the fixed
//! line layout documented in [`crate::artifact`], with the certificate
//! identifier embedded top-right as a scannable QR code. The QR payload is
//! exactly the 64-character hex identifier, nothing else.

use crate::error::CertError;
use crate::models::certificate::{CertificateFields, CertificateId};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use qrcode::QrCode;
use std::path::{Path, PathBuf};

/// Pixels per QR module in the rendered image.
const QR_SCALE: usize = 4;

/// Quiet-zone width around the QR code, in modules.
const QR_QUIET: usize = 4;

/// Renders a QR code into a raw 8-bit grayscale pixel buffer.
///
/// # Arguments
/// * `payload` - Text to encode (the certificate identifier)
///
/// # Returns
/// `(side_length, pixels)` where `pixels` is a square row-major buffer,
/// dark modules `0x00` on a `0xFF` background with a quiet zone.
pub fn qr_pixels(payload: &str) -> Result<(u32, Vec<u8>), CertError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| CertError::Render(format!("QR encoding failed: {}", e)))?;
    let modules = code.width();
    let colors = code.to_colors();

    let side = (modules + 2 * QR_QUIET) * QR_SCALE;
    let mut pixels = vec![0xFFu8; side * side];

    for y in 0..modules {
        for x in 0..modules {
            if colors[y * modules + x] == qrcode::Color::Dark {
                let px = (x + QR_QUIET) * QR_SCALE;
                let py = (y + QR_QUIET) * QR_SCALE;
                for dy in 0..QR_SCALE {
                    let row = (py + dy) * side + px;
                    pixels[row..row + QR_SCALE].fill(0x00);
                }
            }
        }
    }

    Ok((side as u32, pixels))
}

/// Certificate PDF renderer.
///
/// The rendered text layer is, line by line:
/// 0. organization name
/// 1. "Certificate of Completion"
/// 2. "This is to certify that"
/// 3. candidate name
/// 4. "with UID"
/// 5. UID
/// 6. "has successfully completed the course:"
/// 7. course name
///
/// [`crate::artifact::extractor`] depends on exactly this ordering.
pub struct CertificateRenderer {
    /// Optional institute logo drawn at the top of the page
    logo_path: Option<PathBuf>,
}

impl CertificateRenderer {
    pub fn new(logo_path: Option<PathBuf>) -> Self {
        Self { logo_path }
    }

    /// Renders the certificate and writes it to `output_path`.
    pub fn render(
        &self,
        fields: &CertificateFields,
        certificate_id: &CertificateId,
        output_path: &Path,
    ) -> Result<(), CertError> {
        let bytes = self.render_to_bytes(fields, certificate_id)?;
        std::fs::write(output_path, bytes)?;
        log::info!("certificate rendered at {}", output_path.display());
        Ok(())
    }

    /// Renders the certificate into an in-memory PDF.
    pub fn render_to_bytes(
        &self,
        fields: &CertificateFields,
        certificate_id: &CertificateId,
    ) -> Result<Vec<u8>, CertError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let (qr_side, qr_data) = qr_pixels(certificate_id.as_str())?;
        let qr_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => qr_side as i64,
                "Height" => qr_side as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            qr_data,
        ));

        let mut xobjects = dictionary! { "Qr" => qr_id };
        let logo = self.load_logo()?;
        let has_logo = logo.is_some();
        if let Some((width, height, rgb)) = logo {
            let logo_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width as i64,
                    "Height" => height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                rgb,
            ));
            xobjects.set("Logo", logo_id);
        }

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_bold,
                "F2" => font_regular,
            },
            "XObject" => xobjects,
        };

        let mut ops: Vec<Operation> = Vec::new();

        // QR code, 1.2in square, top-right corner
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                86.into(),
                0.into(),
                0.into(),
                86.into(),
                502.into(),
                682.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec!["Qr".into()]));
        ops.push(Operation::new("Q", vec![]));

        if has_logo {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new(
                "cm",
                vec![
                    110.into(),
                    0.into(),
                    0.into(),
                    110.into(),
                    72.into(),
                    660.into(),
                ],
            ));
            ops.push(Operation::new("Do", vec!["Logo".into()]));
            ops.push(Operation::new("Q", vec![]));
        }

        // Text layer. One Tj per line, in the order the extractor expects.
        let lines: [(&str, &str, i64); 8] = [
            (&fields.org_name, "F1", 15),
            ("Certificate of Completion", "F1", 25),
            ("This is to certify that", "F2", 14),
            (&fields.candidate_name, "F2", 14),
            ("with UID", "F2", 14),
            (&fields.uid, "F2", 14),
            ("has successfully completed the course:", "F2", 14),
            (&fields.course_name, "F2", 14),
        ];
        let mut y = 560i64;
        for (text, font, size) in lines {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
            ops.push(Operation::new("Td", vec![180.into(), y.into()]));
            ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
            ops.push(Operation::new("ET", vec![]));
            y -= if size > 14 { 50 } else { 34 };
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content
                .encode()
                .map_err(|e| CertError::Render(format!("content encoding failed: {}", e)))?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| CertError::Render(format!("PDF serialization failed: {}", e)))?;
        Ok(bytes)
    }

    /// Loads the configured logo as raw RGB pixels, if any.
    fn load_logo(&self) -> Result<Option<(u32, u32, Vec<u8>)>, CertError> {
        let Some(path) = &self.logo_path else {
            return Ok(None);
        };
        let img = image::open(path)
            .map_err(|e| CertError::Render(format!("logo {} unreadable: {}", path.display(), e)))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Some((width, height, img.into_raw())))
    }
}
