// src/artifact/mod.rs
//! Certificate PDF production and text-layer extraction.
//!
//! The renderer and extractor share one positional contract: the PDF's
//! text layer is a fixed sequence of lines, and extraction reads fields
//! back by line offset. Any reflow of the rendered layout silently breaks
//! extraction, so the contract is pinned here in one place and exercised
//! by round-trip tests.

pub mod extractor;
pub mod renderer;

/// Line offset of the organization name (first line of the text layer).
pub const LINE_ORG: usize = 0;

/// Line offset of the candidate name.
pub const LINE_CANDIDATE: usize = 3;

/// Line offset of the UID.
pub const LINE_UID: usize = 5;

/// Minimum plausible number of text lines in a genuine certificate; the
/// course name is always the last line. Anything shorter is rejected as
/// "not a valid certificate document" rather than yielding garbage fields.
pub const MIN_LINES: usize = 8;
