use kantei_model::{
    Anchor, Diagnostic, ParseReport, RawDocument, SectionKind, SectionOutline,
};
use kantei_rules::RuleTable;
use tracing::{debug, info, trace};

use crate::anchor;
use crate::assemble::{assemble, shift_diagnostic};
use crate::capture::DetailCapture;
use crate::digest::sha256_hex;
use crate::error::Result;
use crate::matcher::{DetailGuard, SectionRegistry};
use crate::preamble::PreambleExtractor;
use crate::resolver::{RawEntry, finalize, select_by_precedence};
use crate::splitter::{SectionSplit, split_sections};

/// What one section yielded. Spans are relative to the section text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionParse {
    pub anchor: Option<Anchor>,
    pub entries: Vec<RawEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A rule table compiled for repeated use.
///
/// Immutable after construction; share it freely between threads.
pub struct Parser {
    rules: RuleTable,
    registry: SectionRegistry,
    guard: DetailGuard,
    preamble: PreambleExtractor,
}

impl Parser {
    pub fn new(rules: &RuleTable) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            registry: SectionRegistry::from_table(rules)?,
            guard: DetailGuard::new(rules)?,
            preamble: PreambleExtractor::new(&rules.preamble)?,
            rules: rules.clone(),
        })
    }

    /// A parser over the embedded default table.
    pub fn builtin() -> Result<Self> {
        Self::new(&RuleTable::builtin()?)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn split(&self, raw_text: &str) -> SectionSplit {
        split_sections(raw_text, self.rules.headers())
    }

    pub fn parse_document(&self, document: &RawDocument) -> ParseReport {
        self.parse(document.content())
    }

    /// Parse a whole document. Never fails: irregular text yields fewer
    /// entries and more diagnostics.
    pub fn parse(&self, raw_text: &str) -> ParseReport {
        let digest = sha256_hex(raw_text.as_bytes());
        let split = self.split(raw_text);
        let mut diagnostics = split.diagnostics;
        if split.sections.is_empty() {
            diagnostics.push(Diagnostic::NoSectionsFound);
        }
        let preamble = self
            .preamble
            .extract(&raw_text[split.preamble.start..split.preamble.end]);

        let mut outlines = Vec::with_capacity(split.sections.len());
        let mut parts = Vec::with_capacity(split.sections.len());
        for section in &split.sections {
            let parsed = self.parse_section(section.kind, &section.text);
            debug!(
                section = %section.kind,
                order = section.order,
                entries = parsed.entries.len(),
                anchor = parsed.anchor.is_some(),
                "section parsed"
            );
            outlines.push(SectionOutline {
                kind: section.kind,
                order: section.order,
                span: section.span,
                anchor: parsed.anchor,
                entry_count: parsed.entries.len(),
            });
            diagnostics.extend(
                parsed
                    .diagnostics
                    .into_iter()
                    .map(|d| shift_diagnostic(d, section.span.start)),
            );
            parts.push((section, parsed.entries));
        }
        let result = assemble(parts);

        info!(
            digest = %digest,
            sections = outlines.len(),
            entries = result.len(),
            diagnostics = diagnostics.len(),
            "document parsed"
        );
        ParseReport {
            digest,
            preamble,
            sections: outlines,
            result,
            diagnostics,
        }
    }

    /// Parse one section's text in isolation.
    ///
    /// Kinds missing from the rule table yield nothing.
    pub fn parse_section(&self, kind: SectionKind, text: &str) -> SectionParse {
        let Some(compiled) = self.registry.get(kind) else {
            return SectionParse::default();
        };
        let spec = compiled.spec();
        let mut diagnostics = Vec::new();

        let anchor = anchor::find_anchor(text).map(|found| found.anchor);
        if anchor.is_none() && spec.expects_anchor {
            debug!(section = %kind, "no anchor found");
            diagnostics.push(Diagnostic::MissingAnchor { section: kind });
        }

        let candidates = compiled.candidates(text, anchor.as_ref());
        let (heads, dropped) = select_by_precedence(candidates);
        for (winner, loser) in dropped {
            trace!(section = %kind, shape = ?loser.shape, start = loser.head.start, "candidate dropped");
            diagnostics.push(Diagnostic::OverlapResolved {
                section: kind,
                kept: winner,
                dropped: loser.head,
            });
        }

        let keywords = self.rules.boundary_keywords();
        let capture = DetailCapture {
            section: kind,
            text,
            keywords: &keywords,
            guard: &self.guard,
        };
        let mut entries = Vec::new();
        for captured in capture.run(heads, &mut diagnostics) {
            let span = captured.span();
            let candidate = captured.candidate;
            let detail = text[captured.detail.start..captured.detail.end].to_string();
            let Some(category) = candidate.category else {
                // Boundary-only mention: its trailing text belongs to no entry.
                if !detail.is_empty() {
                    diagnostics.push(Diagnostic::SkippedSpan {
                        section: kind,
                        span: captured.detail,
                        text: detail,
                    });
                }
                continue;
            };
            entries.push(RawEntry {
                section: kind,
                shape: candidate.shape,
                category,
                target: text[candidate.target.start..candidate.target.end].to_string(),
                evaluation_tag: candidate.evaluation_tag,
                detail,
                head: candidate.head,
                span,
                position: 0,
            });
        }
        let entries = finalize(entries, &mut diagnostics);

        SectionParse {
            anchor,
            entries,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use kantei_model::EntryCategory;

    use super::*;

    fn parser() -> Parser {
        Parser::builtin().expect("builtin parser")
    }

    #[test]
    fn parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }

    #[test]
    fn expected_anchor_missing_is_flagged() {
        let parsed = parser().parse_section(
            SectionKind::FiveElement,
            "人格:条め\n【火-水】\n中年期の運勢は大凶。",
        );
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].category, EntryCategory::Personality);
        assert_eq!(
            parsed.diagnostics,
            vec![Diagnostic::MissingAnchor {
                section: SectionKind::FiveElement
            }]
        );
    }

    #[test]
    fn labeled_beats_anchor_at_same_offset() {
        let parsed = parser().parse_section(
            SectionKind::StrokeCount,
            "総格:上原 はま\n【画数17】\n失意の人生となる。",
        );
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].target, "総格:上原 はま");
        assert!(
            parsed
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::OverlapResolved { .. }))
        );
    }

    #[test]
    fn unknown_kind_yields_nothing() {
        let mut table = RuleTable::builtin().expect("builtin");
        table.sections.retain(|s| s.kind != SectionKind::YinYang);
        let parser = Parser::new(&table).expect("parser");
        assert_eq!(
            parser.parse_section(SectionKind::YinYang, "上原 はま\n本文。"),
            SectionParse::default()
        );
    }

    #[test]
    fn invalid_table_is_rejected() {
        let mut table = RuleTable::builtin().expect("builtin");
        table.sections[1].header = table.sections[0].header.clone();
        assert!(matches!(
            Parser::new(&table),
            Err(crate::ParseError::Rules(_))
        ));
    }
}
