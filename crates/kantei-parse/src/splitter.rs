//! Section Splitter: cuts the document at known header strings.

use kantei_model::{Diagnostic, Section, SectionKind, Span};
use tracing::trace;

/// Sections found in a document plus the text in front of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSplit {
    /// Sections in encounter order.
    pub sections: Vec<Section>,
    /// Range before the first header; the whole text when no header is present.
    pub preamble: Span,
    pub diagnostics: Vec<Diagnostic>,
}

struct HeaderHit {
    kind: SectionKind,
    offset: usize,
    len: usize,
}

/// Partition `text` into sections by header string.
///
/// Each header counts at its first occurrence only. A section spans from the
/// end of its header to the next found header (or the end of the text), with
/// surrounding whitespace trimmed away. Headers that are absent yield no
/// section.
pub fn split_sections<'a, I>(text: &str, headers: I) -> SectionSplit
where
    I: IntoIterator<Item = (SectionKind, &'a str)>,
{
    let mut hits = Vec::new();
    let mut diagnostics = Vec::new();
    for (kind, header) in headers {
        let header = header.trim();
        if header.is_empty() {
            continue;
        }
        let mut occurrences = text.match_indices(header).map(|(offset, _)| offset);
        let Some(offset) = occurrences.next() else {
            continue;
        };
        hits.push(HeaderHit {
            kind,
            offset,
            len: header.len(),
        });
        diagnostics.extend(
            occurrences.map(|offset| Diagnostic::DuplicateHeader { section: kind, offset }),
        );
    }
    hits.sort_by_key(|hit| hit.offset);

    let preamble_end = hits.first().map_or(text.len(), |hit| hit.offset);
    let mut sections = Vec::with_capacity(hits.len());
    for (idx, hit) in hits.iter().enumerate() {
        let body_start = hit.offset + hit.len;
        let body_end = hits
            .get(idx + 1)
            .map_or(text.len(), |next| next.offset)
            .max(body_start);
        let span = trimmed_span(text, Span::new(body_start, body_end));
        trace!(section = %hit.kind, start = span.start, end = span.end, "section found");
        sections.push(Section {
            kind: hit.kind,
            text: text[span.start..span.end].to_string(),
            order: idx,
            span,
        });
    }

    SectionSplit {
        sections,
        preamble: Span::new(0, preamble_end),
        diagnostics,
    }
}

/// Shrink `span` so it neither starts nor ends with whitespace.
pub(crate) fn trimmed_span(text: &str, span: Span) -> Span {
    let slice = &text[span.start..span.end];
    let start = span.start + (slice.len() - slice.trim_start().len());
    let end = span.end - (slice.len() - slice.trim_end().len());
    Span::new(start, end.max(start))
}
