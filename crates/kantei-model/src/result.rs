//! Parse output: the ordered entry list plus what the caller may want for
//! diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryCategory};
use crate::section::{SectionKind, SectionOutline, Span};

/// Ordered entries of one document, grouped by `(section order, position)`.
///
/// Rebuilt fresh for every parse and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParseResult {
    entries: Vec<Entry>,
}

impl ParseResult {
    /// Build a result, ordering entries by section order then position.
    pub fn new(mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(Entry::sort_key);
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn in_section(&self, kind: SectionKind) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.section == kind)
    }

    pub fn with_category(&self, category: EntryCategory) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl IntoIterator for ParseResult {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseResult {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Stroke tallies and the overall remark printed before the first section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preamble {
    /// Label (天格, 人格, ...) to stroke count.
    pub tallies: BTreeMap<String, u32>,
    pub remark: Option<String>,
}

impl Preamble {
    pub fn tally(&self, label: &str) -> Option<u32> {
        self.tallies.get(label).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty() && self.remark.is_none()
    }
}

/// Irregularities met while parsing. None of these abort the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Valid text without any known header.
    NoSectionsFound,
    /// A header occurred again after its first occurrence; only the first counts.
    DuplicateHeader { section: SectionKind, offset: usize },
    /// The section expects a whole-name entry but no anchor was detected.
    MissingAnchor { section: SectionKind },
    /// Text that matched no entry shape, or was cut from a detail.
    SkippedSpan {
        section: SectionKind,
        span: Span,
        text: String,
    },
    /// Two candidates overlapped; the higher-precedence one was kept.
    OverlapResolved {
        section: SectionKind,
        kept: Span,
        dropped: Span,
    },
    /// An entry identical to an earlier one was dropped.
    Deduplicated { section: SectionKind, span: Span },
}

impl Diagnostic {
    pub fn section(&self) -> Option<SectionKind> {
        match self {
            Diagnostic::NoSectionsFound => None,
            Diagnostic::DuplicateHeader { section, .. }
            | Diagnostic::MissingAnchor { section }
            | Diagnostic::SkippedSpan { section, .. }
            | Diagnostic::OverlapResolved { section, .. }
            | Diagnostic::Deduplicated { section, .. } => Some(*section),
        }
    }
}

/// Everything a single parse produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    /// Lowercase hex SHA-256 of the raw content.
    pub digest: String,
    pub preamble: Preamble,
    pub sections: Vec<SectionOutline>,
    pub result: ParseResult,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    pub fn skipped_spans(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::SkippedSpan { .. }))
    }

    pub fn is_partial(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingAnchor { .. }))
    }
}
