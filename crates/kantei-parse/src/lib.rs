#![deny(unsafe_code)]

//! Segmentation and entry extraction for raw seimei-handan result text.
//!
//! The pipeline runs, per document:
//!
//! 1. [`split_sections`] cuts the text at known headers.
//! 2. [`detect_anchor`] finds the subject's full name inside each section.
//! 3. The compiled matchers of the section propose entry heads.
//! 4. Overlaps are settled by precedence, details are captured, and the
//!    resolver strips bleed and duplicates ([`resolve`]).
//! 5. [`assemble`] merges the sections into one [`ParseResult`].
//!
//! Everything is driven by a [`RuleTable`]; no subject name appears in code.

pub mod anchor;
pub mod assemble;
mod capture;
pub mod digest;
pub mod error;
pub mod matcher;
pub mod parser;
mod preamble;
pub mod resolver;
pub mod script;
pub mod splitter;

use kantei_model::{ParseReport, ParseResult, RawDocument};
use kantei_rules::RuleTable;

pub use crate::anchor::{MAX_NAME_CHARS, detect_anchor};
pub use crate::assemble::assemble;
pub use crate::error::{ParseError, Result};
pub use crate::matcher::EntryShape;
pub use crate::parser::{Parser, SectionParse};
pub use crate::resolver::{RawEntry, resolve};
pub use crate::splitter::{SectionSplit, split_sections};

/// Parse `raw_text` with `rules` and return the ordered entries.
pub fn parse(raw_text: &str, rules: &RuleTable) -> Result<ParseResult> {
    Ok(parse_with_report(raw_text, rules)?.result)
}

/// Parse `raw_text` and keep the preamble, section outlines and diagnostics.
pub fn parse_with_report(raw_text: &str, rules: &RuleTable) -> Result<ParseReport> {
    Ok(Parser::new(rules)?.parse(raw_text))
}

/// Parse a fetched document with an already compiled parser.
pub fn parse_document(document: &RawDocument, parser: &Parser) -> ParseReport {
    parser.parse_document(document)
}

/// Parse undecoded bytes; anything other than UTF-8 is rejected.
pub fn parse_bytes(bytes: Vec<u8>, parser: &Parser) -> Result<ParseReport> {
    let document = RawDocument::from_bytes(bytes)?;
    Ok(parser.parse_document(&document))
}
