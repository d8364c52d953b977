//! Detail capture over the accepted entry heads of one section.
//!
//! States: `ScanningForEntry -> CapturingDetail -> {EntryClosed, SectionEnded}`.
//! A detail runs from the end of its head to the earliest of the next head,
//! a boundary keyword, or the end of the section. It is then cut at the first
//! embedded label or tag token and trimmed.

use kantei_model::{Diagnostic, SectionKind, Span};
use tracing::trace;

use crate::matcher::{Candidate, DetailGuard};
use crate::splitter::trimmed_span;

/// A head together with its captured detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Captured {
    pub candidate: Candidate,
    /// Trimmed detail range; empty when the head has no trailing text.
    pub detail: Span,
}

impl Captured {
    /// Target start to detail end.
    pub fn span(&self) -> Span {
        let end = if self.detail.is_empty() {
            self.candidate.head.end
        } else {
            self.detail.end
        };
        Span::new(self.candidate.target.start, end)
    }
}

enum CaptureState {
    ScanningForEntry { cursor: usize },
    CapturingDetail { index: usize },
    EntryClosed { resume: usize },
    SectionEnded,
}

pub(crate) struct DetailCapture<'a> {
    pub section: SectionKind,
    pub text: &'a str,
    pub keywords: &'a [&'a str],
    pub guard: &'a DetailGuard,
}

impl DetailCapture<'_> {
    /// Capture a detail for every head. `heads` must not overlap.
    pub fn run(
        &self,
        mut heads: Vec<Candidate>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Captured> {
        heads.sort_by_key(|head| head.head.start);
        let mut heads = heads.into_iter().map(Some).collect::<Vec<_>>();
        let mut captured = Vec::with_capacity(heads.len());
        let mut state = CaptureState::ScanningForEntry { cursor: 0 };
        let mut next = 0;

        loop {
            state = match state {
                CaptureState::ScanningForEntry { cursor } => match heads.get(next) {
                    Some(Some(head)) => {
                        self.skip(cursor, head.head.start, diagnostics);
                        CaptureState::CapturingDetail { index: next }
                    }
                    _ => {
                        self.skip(cursor, self.text.len(), diagnostics);
                        CaptureState::SectionEnded
                    }
                },
                CaptureState::CapturingDetail { index } => {
                    let Some(candidate) = heads.get_mut(index).and_then(Option::take) else {
                        break;
                    };
                    next = index + 1;
                    let next_start = heads
                        .get(next)
                        .and_then(Option::as_ref)
                        .map(|head| head.head.start);
                    let limit = self.limit(candidate.head.end, next_start);
                    let detail = self.detail(candidate.head.end, limit, diagnostics);
                    trace!(
                        section = %self.section,
                        start = candidate.head.start,
                        detail_len = detail.len(),
                        "entry captured"
                    );
                    captured.push(Captured { candidate, detail });
                    match next_start {
                        Some(start) => {
                            self.skip(limit, start, diagnostics);
                            CaptureState::EntryClosed { resume: start }
                        }
                        None => {
                            self.skip(limit, self.text.len(), diagnostics);
                            CaptureState::SectionEnded
                        }
                    }
                }
                CaptureState::EntryClosed { resume } => {
                    CaptureState::ScanningForEntry { cursor: resume }
                }
                CaptureState::SectionEnded => break,
            };
        }
        captured
    }

    /// Earliest of the next head, a boundary keyword, or section end.
    fn limit(&self, from: usize, next_start: Option<usize>) -> usize {
        let hard_end = next_start.unwrap_or(self.text.len()).max(from);
        let window = &self.text[from..hard_end];
        self.keywords
            .iter()
            .filter_map(|keyword| window.find(keyword))
            .min()
            .map_or(hard_end, |offset| from + offset)
    }

    /// Cut at the first embedded token, report the remainder, trim.
    fn detail(&self, from: usize, limit: usize, diagnostics: &mut Vec<Diagnostic>) -> Span {
        let raw = Span::new(from, limit);
        let cut = self.guard.first_token(self.text, raw).unwrap_or(limit);
        self.skip(cut, limit, diagnostics);
        trimmed_span(self.text, Span::new(from, cut))
    }

    /// Report non-blank text that no entry claimed.
    fn skip(&self, start: usize, end: usize, diagnostics: &mut Vec<Diagnostic>) {
        if start >= end {
            return;
        }
        let span = trimmed_span(self.text, Span::new(start, end));
        if span.is_empty() {
            return;
        }
        trace!(section = %self.section, start = span.start, end = span.end, "skipped span");
        diagnostics.push(Diagnostic::SkippedSpan {
            section: self.section,
            span,
            text: self.text[span.start..span.end].to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use kantei_model::EntryCategory;
    use kantei_rules::RuleTable;

    use super::*;
    use crate::matcher::EntryShape;

    fn head(text: &str, target: &str, tag: Option<&str>) -> Candidate {
        let start = text.find(target).expect("target in text");
        let target_span = Span::new(start, start + target.len());
        let end = match tag {
            Some(tag) => text.find(&format!("{tag}】")).expect("tag in text") + tag.len() + "】".len(),
            None => target_span.end,
        };
        Candidate {
            shape: EntryShape::Labeled,
            category: Some(EntryCategory::Total),
            target: target_span,
            evaluation_tag: tag.map(str::to_string),
            head: Span::new(start, end),
        }
    }

    fn capture(text: &str, heads: Vec<Candidate>) -> (Vec<String>, Vec<Diagnostic>) {
        let table = RuleTable::builtin().expect("builtin");
        let guard = DetailGuard::new(&table).expect("guard");
        let keywords = table.boundary_keywords();
        let capture = DetailCapture {
            section: SectionKind::StrokeCount,
            text,
            keywords: &keywords,
            guard: &guard,
        };
        let mut diagnostics = Vec::new();
        let details = capture
            .run(heads, &mut diagnostics)
            .iter()
            .map(|c| text[c.detail.start..c.detail.end].to_string())
            .collect();
        (details, diagnostics)
    }

    #[test]
    fn detail_runs_to_next_head() {
        let text = "総格:上原 はま\n【画数17】\n失意の人生。\n地格:初め\n【画数9】\n初年運。";
        let heads = vec![
            head(text, "地格:初め", Some("画数9")),
            head(text, "総格:上原 はま", Some("画数17")),
        ];
        let (details, diagnostics) = capture(text, heads);
        assert_eq!(details, vec!["失意の人生。", "初年運。"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn trailer_keyword_ends_last_detail() {
        let text = "総格:上原 はま\n【画数17】\n失意の人生。\n姓名鑑定の使い方\nメニュー";
        let (details, diagnostics) = capture(text, vec![head(text, "総格:上原 はま", Some("画数17"))]);
        assert_eq!(details, vec!["失意の人生。"]);
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::SkippedSpan { text, .. }] if text == "姓名鑑定の使い方\nメニュー"
        ));
    }

    #[test]
    fn embedded_label_is_cut() {
        let text = "総格:上原 はま\n【画数17】\n失意の人生。人格：はま 続き";
        let (details, diagnostics) = capture(text, vec![head(text, "総格:上原 はま", Some("画数17"))]);
        assert_eq!(details, vec!["失意の人生。"]);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn label_without_content_has_empty_detail() {
        let text = "前置き。総格:上原 はま";
        let (details, diagnostics) = capture(text, vec![head(text, "総格:上原 はま", None)]);
        assert_eq!(details, vec![""]);
        assert!(matches!(
            &diagnostics[..],
            [Diagnostic::SkippedSpan { text, .. }] if text == "前置き。"
        ));
    }
}
