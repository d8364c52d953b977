//! Result Assembler: places section entries into the document.

use kantei_model::{Diagnostic, Entry, ParseResult, Section};

use crate::resolver::RawEntry;

/// Merge resolved section entries into one ordered result.
///
/// Spans move from section-relative to document offsets. Nothing is added or
/// removed.
pub fn assemble<'a, I>(sections: I) -> ParseResult
where
    I: IntoIterator<Item = (&'a Section, Vec<RawEntry>)>,
{
    let entries = sections
        .into_iter()
        .flat_map(|(section, raw)| {
            raw.into_iter().map(move |entry| Entry {
                category: entry.category,
                target: entry.target,
                evaluation_tag: entry.evaluation_tag,
                detail: entry.detail,
                section: section.kind,
                section_order: section.order,
                position: entry.position,
                span: entry.span.shift(section.span.start),
            })
        })
        .collect();
    ParseResult::new(entries)
}

/// Move a section-level diagnostic to document offsets.
pub(crate) fn shift_diagnostic(diagnostic: Diagnostic, offset: usize) -> Diagnostic {
    match diagnostic {
        Diagnostic::SkippedSpan {
            section,
            span,
            text,
        } => Diagnostic::SkippedSpan {
            section,
            span: span.shift(offset),
            text,
        },
        Diagnostic::OverlapResolved {
            section,
            kept,
            dropped,
        } => Diagnostic::OverlapResolved {
            section,
            kept: kept.shift(offset),
            dropped: dropped.shift(offset),
        },
        Diagnostic::Deduplicated { section, span } => Diagnostic::Deduplicated {
            section,
            span: span.shift(offset),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use kantei_model::{EntryCategory, SectionKind, Span};

    use super::*;
    use crate::matcher::EntryShape;

    fn section(kind: SectionKind, order: usize, start: usize) -> Section {
        Section {
            kind,
            text: String::new(),
            order,
            span: Span::new(start, start + 100),
        }
    }

    fn raw(kind: SectionKind, target: &str, position: usize) -> RawEntry {
        RawEntry {
            section: kind,
            shape: EntryShape::Labeled,
            category: EntryCategory::Total,
            target: target.to_string(),
            evaluation_tag: None,
            detail: String::new(),
            head: Span::new(0, 5),
            span: Span::new(0, 5),
            position,
        }
    }

    #[test]
    fn entries_follow_section_order_then_position() {
        let five = section(SectionKind::FiveElement, 0, 10);
        let stroke = section(SectionKind::StrokeCount, 1, 200);
        let result = assemble([
            (
                &stroke,
                vec![raw(SectionKind::StrokeCount, "総格:a", 0)],
            ),
            (
                &five,
                vec![
                    raw(SectionKind::FiveElement, "地格:b", 1),
                    raw(SectionKind::FiveElement, "人格:c", 0),
                ],
            ),
        ]);
        let targets: Vec<&str> = result.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["人格:c", "地格:b", "総格:a"]);
        assert_eq!(result.entries()[2].span, Span::new(200, 205));
    }

    #[test]
    fn shifts_section_diagnostics_only() {
        let skipped = Diagnostic::SkippedSpan {
            section: SectionKind::YinYang,
            span: Span::new(1, 2),
            text: "x".to_string(),
        };
        assert_eq!(
            shift_diagnostic(skipped, 10),
            Diagnostic::SkippedSpan {
                section: SectionKind::YinYang,
                span: Span::new(11, 12),
                text: "x".to_string(),
            }
        );
        let missing = Diagnostic::MissingAnchor {
            section: SectionKind::YinYang,
        };
        assert_eq!(shift_diagnostic(missing.clone(), 10), missing);
    }
}
