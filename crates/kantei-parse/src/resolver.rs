//! Boundary Resolver & Deduplicator.

use std::collections::HashSet;

use kantei_model::{Diagnostic, EntryCategory, SectionKind, Span};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::matcher::{Candidate, EntryShape};

/// An entry of one section before it is placed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub section: SectionKind,
    pub shape: EntryShape,
    pub category: EntryCategory,
    pub target: String,
    pub evaluation_tag: Option<String>,
    pub detail: String,
    /// Target plus tag.
    pub head: Span,
    /// Target start to detail end (section-relative while parsing).
    pub span: Span,
    pub position: usize,
}

/// Anything the precedence pass can order.
pub(crate) trait Ranked {
    fn span(&self) -> Span;
    fn rank(&self) -> u8;
}

impl Ranked for Candidate {
    fn span(&self) -> Span {
        self.head
    }

    /// A boundary-only anchor mention yields to every shape that produces an entry.
    fn rank(&self) -> u8 {
        match (self.shape, self.category) {
            (EntryShape::Anchor, None) => 0,
            (shape, _) => shape.rank() + 1,
        }
    }
}

impl Ranked for RawEntry {
    fn span(&self) -> Span {
        self.span
    }

    fn rank(&self) -> u8 {
        self.shape.rank()
    }
}

/// Keep a non-overlapping subset of `items`.
///
/// Higher rank wins; among equal rank the earlier start wins, then the longer
/// span. Returns the kept items in document order, and each dropped item with
/// the span that beat it.
pub(crate) fn select_by_precedence<T: Ranked>(mut items: Vec<T>) -> (Vec<T>, Vec<(Span, T)>) {
    items.sort_by_key(|item| {
        let span = item.span();
        (
            std::cmp::Reverse(item.rank()),
            span.start,
            std::cmp::Reverse(span.len()),
        )
    });
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut dropped = Vec::new();
    for item in items {
        let span = item.span();
        match kept.iter().find(|k| k.span().overlaps(&span)) {
            Some(winner) => dropped.push((winner.span(), item)),
            None => kept.push(item),
        }
    }
    kept.sort_by_key(|item| (item.span().start, item.span().end));
    (kept, dropped)
}

/// Apply precedence, strip bleed, drop empties and duplicates, then number
/// the survivors.
///
/// Running it again on its own output changes nothing.
pub fn resolve(entries: Vec<RawEntry>) -> Vec<RawEntry> {
    let mut diagnostics = Vec::new();
    resolve_entries(entries, &mut diagnostics)
}

pub(crate) fn resolve_entries(
    entries: Vec<RawEntry>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<RawEntry> {
    let (kept, dropped) = select_by_precedence(entries);
    for (winner, loser) in dropped {
        trace!(section = %loser.section, start = loser.span.start, "overlapping entry dropped");
        diagnostics.push(Diagnostic::OverlapResolved {
            section: loser.section,
            kept: winner,
            dropped: loser.span,
        });
    }
    finalize(kept, diagnostics)
}

/// Everything after precedence: discard empty targets, remove duplicates,
/// strip trailing copies of the next target, assign positions.
pub(crate) fn finalize(
    mut entries: Vec<RawEntry>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<RawEntry> {
    entries.retain(|entry| !entry.target.trim().is_empty());
    entries.sort_by_key(|entry| (entry.span.start, entry.span.end));
    loop {
        let before = entries.len();
        dedupe(&mut entries, diagnostics);
        let stripped = strip_bleed(&mut entries);
        if !stripped && entries.len() == before {
            break;
        }
    }
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.position = position;
    }
    entries
}

fn dedupe(entries: &mut Vec<RawEntry>, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<(EntryCategory, String, Option<String>, String)> = HashSet::new();
    entries.retain(|entry| {
        let key = (
            entry.category,
            entry.target.clone(),
            entry.evaluation_tag.clone(),
            entry.detail.clone(),
        );
        if seen.insert(key) {
            return true;
        }
        diagnostics.push(Diagnostic::Deduplicated {
            section: entry.section,
            span: entry.span,
        });
        false
    });
}

/// Remove a detail suffix that repeats the next entry's target. Returns
/// whether anything changed.
fn strip_bleed(entries: &mut [RawEntry]) -> bool {
    let mut changed = false;
    for idx in 1..entries.len() {
        let next_target = entries[idx].target.clone();
        let entry = &mut entries[idx - 1];
        while !next_target.is_empty() && entry.detail.ends_with(next_target.as_str()) {
            let old_len = entry.detail.len();
            let kept = entry.detail[..old_len - next_target.len()].trim_end().len();
            entry.detail.truncate(kept);
            let removed = old_len - kept;
            entry.span.end = entry.span.end.saturating_sub(removed).max(entry.head.end);
            changed = true;
        }
    }
    changed
}
