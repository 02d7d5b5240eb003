// src/artifact/extractor.rs
//! Certificate PDF text-layer extraction.
//!
//! Reads the four canonical fields back out of an uploaded certificate by
//! the fixed line-offset mapping: line 0 = organization name, line 3 =
//! candidate name, line 5 = UID, last line = course name. The mapping is
//! brittle against any change to the rendered layout; extraction fails
//! closed with `CertError::Extraction` rather than guessing.

use crate::artifact::{LINE_CANDIDATE, LINE_ORG, LINE_UID, MIN_LINES};
use crate::error::CertError;
use crate::models::certificate::CertificateFields;
use lopdf::content::Content;
use lopdf::{Document, Object};

/// Extracts the canonical certificate fields from a PDF's text layer.
///
/// Text show operations (`Tj`, and `TJ` arrays joined per operation) are
/// collected in content-stream order across all pages; each operation is
/// one line of the positional contract.
///
/// # Errors
/// Returns `CertError::Extraction` if the bytes are not a parseable PDF or
/// the text layer has fewer than the minimum plausible number of lines.
pub fn extract_certificate(pdf_bytes: &[u8]) -> Result<CertificateFields, CertError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| CertError::Extraction(format!("unreadable PDF: {}", e)))?;

    let mut lines: Vec<String> = Vec::new();
    let pages = doc.get_pages();
    for page_id in pages.values() {
        let data = doc
            .get_page_content(*page_id)
            .map_err(|e| CertError::Extraction(format!("unreadable page content: {}", e)))?;
        let content = Content::decode(&data)
            .map_err(|e| CertError::Extraction(format!("undecodable content stream: {}", e)))?;

        for op in &content.operations {
            match op.operator.as_str() {
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        lines.push(String::from_utf8_lossy(bytes).into_owned());
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        let mut line = String::new();
                        for part in parts {
                            if let Object::String(bytes, _) = part {
                                line.push_str(&String::from_utf8_lossy(bytes));
                            }
                        }
                        if !line.is_empty() {
                            lines.push(line);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if lines.len() < MIN_LINES {
        return Err(CertError::Extraction(format!(
            "expected at least {} text lines, found {}",
            MIN_LINES,
            lines.len()
        )));
    }

    Ok(CertificateFields {
        uid: lines[LINE_UID].clone(),
        candidate_name: lines[LINE_CANDIDATE].clone(),
        course_name: lines.last().cloned().unwrap_or_default(),
        org_name: lines[LINE_ORG].clone(),
    })
}
