//! Entry Pattern Matchers.
//!
//! Each section's rule spec is compiled once into a list of matchers. A
//! matcher reports candidate entry heads (target plus optional tag); the
//! resolver later decides which candidates survive.
//!
//! # Architecture
//!
//! - `EntryMatcher` - trait for one entry shape
//! - `CompiledSection` - the matchers of one section plus its spec
//! - `SectionRegistry` - compiled sections keyed by kind

use std::collections::HashMap;
use std::sync::Arc;

use kantei_model::{Anchor, EntryCategory, SectionKind, Span};
use kantei_rules::{BareRule, RuleTable, SectionSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::anchor;
use crate::error::{Result, compile};
use crate::script::{self, COMPOSITE_JOINER, HSPACE, SCRIPT_CLASS};

/// The textual form an entry head takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryShape {
    /// `人格:条め`
    Labeled,
    /// `次・郎`
    Composite,
    /// The subject's full name.
    Anchor,
    /// A single token such as `め` or `争花`.
    Bare,
}

impl EntryShape {
    /// Specificity used to settle overlaps; higher wins.
    pub fn rank(self) -> u8 {
        match self {
            EntryShape::Labeled => 3,
            EntryShape::Composite => 2,
            EntryShape::Anchor => 1,
            EntryShape::Bare => 0,
        }
    }
}

/// A possible entry start inside one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub shape: EntryShape,
    /// `None` marks a boundary-only anchor mention.
    pub category: Option<EntryCategory>,
    pub target: Span,
    pub evaluation_tag: Option<String>,
    /// Target plus tag; detail capture starts at `head.end`.
    pub head: Span,
}

/// One entry shape of one section.
pub trait EntryMatcher: Send + Sync {
    fn shape(&self) -> EntryShape;

    /// Append every candidate found in `text`.
    fn find(&self, text: &str, anchor: Option<&Anchor>, out: &mut Vec<Candidate>);
}

fn longest_first_alternation<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let mut items: Vec<&str> = items.into_iter().collect();
    items.sort_by_key(|item| std::cmp::Reverse(item.len()));
    items.dedup();
    items
        .iter()
        .map(|item| regex::escape(item))
        .collect::<Vec<_>>()
        .join("|")
}

fn head_with_tag(text: &str, target: Span) -> (Option<String>, Span) {
    match script::tag_after(text, target.end) {
        Some((tag, end)) => (Some(tag), Span::new(target.start, end)),
        None => (None, target),
    }
}

/// A second target run is kept only when it is name-sized and nothing but a
/// tag, a line break or the end of text follows it.
fn closes_labeled_target(text: &str, run: &str, end: usize) -> bool {
    if run.chars().count() > anchor::MAX_NAME_CHARS {
        return false;
    }
    let rest = text[end..].trim_start_matches(script::is_horizontal_space);
    rest.is_empty() || rest.starts_with(['【', '\n', '\r'])
}

/// `LABEL:TARGET`. The target may carry a second, name-sized run after one
/// space when that run closes the head (tag, line break or end of text).
struct LabeledMatcher {
    pattern: Regex,
    categories: HashMap<String, EntryCategory>,
}

impl LabeledMatcher {
    fn new(spec: &SectionSpec) -> Result<Option<Self>> {
        if spec.labels.is_empty() {
            return Ok(None);
        }
        let labels = longest_first_alternation(spec.labels.iter().map(|r| r.label.as_str()));
        let class = &*SCRIPT_CLASS;
        let pattern = compile(format!(
            "({labels})[:：]{HSPACE}*({class}+)(?:{HSPACE}({class}+))?"
        ))?;
        let categories = spec
            .labels
            .iter()
            .map(|rule| (rule.label.clone(), rule.category))
            .collect();
        Ok(Some(Self {
            pattern,
            categories,
        }))
    }
}

impl EntryMatcher for LabeledMatcher {
    fn shape(&self) -> EntryShape {
        EntryShape::Labeled
    }

    fn find(&self, text: &str, _anchor: Option<&Anchor>, out: &mut Vec<Candidate>) {
        let mut from = 0;
        while let Some(caps) = self.pattern.captures_at(text, from) {
            let (Some(whole), Some(label), Some(first)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            let end = match caps.get(3) {
                Some(second) if closes_labeled_target(text, second.as_str(), second.end()) => {
                    second.end()
                }
                _ => first.end(),
            };
            from = end;
            let Some(category) = self.categories.get(label.as_str()).copied() else {
                continue;
            };
            let target = Span::new(whole.start(), end);
            let (evaluation_tag, head) = head_with_tag(text, target);
            out.push(Candidate {
                shape: EntryShape::Labeled,
                category: Some(category),
                target,
                evaluation_tag,
                head,
            });
        }
    }
}

/// A token is a bare target only when followed by a tag or, when allowed,
/// by two or more spaces and free text.
fn bare_tail(text: &str, target: Span, rule: &BareRule) -> Option<(Option<String>, Span)> {
    match head_with_tag(text, target) {
        (Some(tag), head) => Some((Some(tag), head)),
        (None, _) if rule.free_text && script::free_text_after(text, target.end) => {
            Some((None, target))
        }
        (None, _) => None,
    }
}

/// `・`-joined tokens such as `次・郎`, kept whole.
struct CompositeMatcher {
    pattern: Regex,
    rule: BareRule,
}

impl CompositeMatcher {
    fn new(rule: &BareRule) -> Result<Option<Self>> {
        if !rule.composite {
            return Ok(None);
        }
        let class = &*SCRIPT_CLASS;
        let pattern = compile(format!("{class}+(?:{COMPOSITE_JOINER}{class}+)+"))?;
        Ok(Some(Self {
            pattern,
            rule: rule.clone(),
        }))
    }
}

impl EntryMatcher for CompositeMatcher {
    fn shape(&self) -> EntryShape {
        EntryShape::Composite
    }

    fn find(&self, text: &str, _anchor: Option<&Anchor>, out: &mut Vec<Candidate>) {
        for m in self.pattern.find_iter(text) {
            let parts_fit = m
                .as_str()
                .split(COMPOSITE_JOINER)
                .all(|part| part.chars().count() <= self.rule.max_chars);
            if !parts_fit || !script::opens_bare_target(text, m.start()) {
                continue;
            }
            let target = Span::new(m.start(), m.end());
            let Some((evaluation_tag, head)) = bare_tail(text, target, &self.rule) else {
                continue;
            };
            out.push(Candidate {
                shape: EntryShape::Composite,
                category: Some(self.rule.category),
                target,
                evaluation_tag,
                head,
            });
        }
    }
}

/// A single script token such as `め` or `争花`.
struct BareMatcher {
    pattern: Regex,
    rule: BareRule,
}

impl BareMatcher {
    fn new(rule: &BareRule) -> Result<Self> {
        let pattern = compile(format!("{}+", &*SCRIPT_CLASS))?;
        Ok(Self {
            pattern,
            rule: rule.clone(),
        })
    }
}

impl EntryMatcher for BareMatcher {
    fn shape(&self) -> EntryShape {
        EntryShape::Bare
    }

    fn find(&self, text: &str, _anchor: Option<&Anchor>, out: &mut Vec<Candidate>) {
        for m in self.pattern.find_iter(text) {
            if m.as_str().chars().count() > self.rule.max_chars
                || !script::opens_bare_target(text, m.start())
            {
                continue;
            }
            let target = Span::new(m.start(), m.end());
            let Some((evaluation_tag, head)) = bare_tail(text, target, &self.rule) else {
                continue;
            };
            out.push(Candidate {
                shape: EntryShape::Bare,
                category: Some(self.rule.category),
                target,
                evaluation_tag,
                head,
            });
        }
    }
}

/// Mentions of the detected anchor. Without an anchor category they only
/// bound other entries.
struct AnchorMatcher {
    category: Option<EntryCategory>,
}

impl EntryMatcher for AnchorMatcher {
    fn shape(&self) -> EntryShape {
        EntryShape::Anchor
    }

    fn find(&self, text: &str, anchor: Option<&Anchor>, out: &mut Vec<Candidate>) {
        let Some(anchor) = anchor else {
            return;
        };
        for found in anchor::anchor_occurrences(text, anchor) {
            out.push(Candidate {
                shape: EntryShape::Anchor,
                category: self.category,
                target: found.target,
                evaluation_tag: found.anchor.evaluation_tag,
                head: found.head,
            });
        }
    }
}

/// Matchers and rule spec of one section.
pub struct CompiledSection {
    spec: SectionSpec,
    matchers: Vec<Arc<dyn EntryMatcher>>,
}

impl CompiledSection {
    pub fn new(spec: &SectionSpec) -> Result<Self> {
        let mut matchers: Vec<Arc<dyn EntryMatcher>> = Vec::new();
        if let Some(labeled) = LabeledMatcher::new(spec)? {
            matchers.push(Arc::new(labeled));
        }
        if let Some(rule) = &spec.bare {
            if let Some(composite) = CompositeMatcher::new(rule)? {
                matchers.push(Arc::new(composite));
            }
            matchers.push(Arc::new(BareMatcher::new(rule)?));
        }
        matchers.push(Arc::new(AnchorMatcher {
            category: spec.anchor_category,
        }));
        Ok(Self {
            spec: spec.clone(),
            matchers,
        })
    }

    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    pub fn shapes(&self) -> Vec<EntryShape> {
        self.matchers.iter().map(|m| m.shape()).collect()
    }

    /// All candidates of all shapes, in document order.
    ///
    /// Tag rules override the category of unlabeled shapes.
    pub fn candidates(&self, text: &str, anchor: Option<&Anchor>) -> Vec<Candidate> {
        let mut out = Vec::new();
        for matcher in &self.matchers {
            matcher.find(text, anchor, &mut out);
        }
        for candidate in &mut out {
            if candidate.shape == EntryShape::Labeled || candidate.category.is_none() {
                continue;
            }
            if let Some(category) = candidate
                .evaluation_tag
                .as_deref()
                .and_then(|tag| self.spec.classify_tag(tag))
            {
                candidate.category = Some(category);
            }
        }
        out.sort_by_key(|c| (c.head.start, std::cmp::Reverse(c.head.end)));
        for candidate in &out {
            trace!(
                section = %self.spec.kind,
                shape = ?candidate.shape,
                start = candidate.head.start,
                end = candidate.head.end,
                "candidate"
            );
        }
        out
    }
}

/// Compiled sections keyed by kind.
#[derive(Default)]
pub struct SectionRegistry {
    sections: HashMap<SectionKind, CompiledSection>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: &RuleTable) -> Result<Self> {
        let mut registry = Self::new();
        for spec in &table.sections {
            registry.register(CompiledSection::new(spec)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, section: CompiledSection) {
        self.sections.insert(section.spec.kind, section);
    }

    pub fn get(&self, kind: SectionKind) -> Option<&CompiledSection> {
        self.sections.get(&kind)
    }

    pub fn has(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        let mut kinds: Vec<SectionKind> = self.sections.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

/// Cuts a captured detail at the first embedded label or tag token.
pub(crate) struct DetailGuard {
    pattern: Regex,
}

impl DetailGuard {
    pub(crate) fn new(table: &RuleTable) -> Result<Self> {
        let labels = table.all_labels();
        let pattern = if labels.is_empty() {
            "【".to_string()
        } else {
            format!("(?:{})[:：]|【", longest_first_alternation(labels))
        };
        Ok(Self {
            pattern: compile(pattern)?,
        })
    }

    /// Offset of the first token inside `text[range]`, if any.
    pub(crate) fn first_token(&self, text: &str, range: Span) -> Option<usize> {
        self.pattern
            .find(&text[range.start..range.end])
            .map(|m| range.start + m.start())
    }
}

#[cfg(test)]
mod tests {
    use kantei_rules::RuleTable;

    use super::*;

    fn compiled(kind: SectionKind) -> CompiledSection {
        let table = RuleTable::builtin().expect("builtin");
        CompiledSection::new(table.section(kind).expect("section")).expect("compile")
    }

    fn slice(text: &str, span: Span) -> &str {
        &text[span.start..span.end]
    }

    #[test]
    fn labeled_target_may_span_two_runs() {
        let section = compiled(SectionKind::StrokeCount);
        let text = "総格:上原 はま\n【画数17】\n本文。";
        let found = section.candidates(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(slice(text, found[0].target), "総格:上原 はま");
        assert_eq!(found[0].evaluation_tag.as_deref(), Some("画数17"));
        assert_eq!(found[0].category, Some(EntryCategory::Total));
    }

    #[test]
    fn prose_after_one_space_stays_out_of_labeled_target() {
        let section = compiled(SectionKind::FiveElement);
        let text = "人格:条め 中年期の運勢は大凶。";
        let found = section.candidates(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(slice(text, found[0].target), "人格:条め");
        assert_eq!(found[0].head, found[0].target);
    }

    #[test]
    fn rejected_second_run_does_not_hide_next_label() {
        let section = compiled(SectionKind::StrokeCount);
        let text = "人格:原は 地格:はま\n【画数9】";
        let targets: Vec<&str> = section
            .candidates(text, None)
            .iter()
            .map(|c| slice(text, c.target))
            .collect();
        assert_eq!(targets, vec!["人格:原は", "地格:はま"]);
    }

    #[test]
    fn composite_components_are_not_bare() {
        let section = compiled(SectionKind::CharacterJudgment);
        let text = "次・郎【分離名】詳細X。";
        let found = section.candidates(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shape, EntryShape::Composite);
        assert_eq!(slice(text, found[0].target), "次・郎");
    }

    #[test]
    fn bare_token_needs_tag_or_free_text() {
        let section = compiled(SectionKind::CharacterJudgment);
        let text = "め\n【地行が水行】\n本文。\n花  文字の由来。\n木 だけ";
        let targets: Vec<&str> = section
            .candidates(text, None)
            .iter()
            .map(|c| slice(text, c.target))
            .collect();
        assert_eq!(targets, vec!["め", "花"]);
    }

    #[test]
    fn tag_rules_override_bare_category() {
        let section = compiled(SectionKind::HeavenEarth);
        let text = "争花\n【天地同数(偶数)】\n本文。鳥\n【天地衝突】\n本文。";
        let categories: Vec<Option<EntryCategory>> = section
            .candidates(text, None)
            .iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(
            categories,
            vec![Some(EntryCategory::SameCount), Some(EntryCategory::Conflict)]
        );
    }

    #[test]
    fn anchor_without_category_is_boundary_only() {
        let section = compiled(SectionKind::StrokeCount);
        let anchor = Anchor {
            surname: "上原".to_string(),
            given_name: "はま".to_string(),
            evaluation_tag: None,
        };
        let text = "本文。\n上原 はま\n続き。";
        let found = section.candidates(text, Some(&anchor));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shape, EntryShape::Anchor);
        assert_eq!(found[0].category, None);
    }

    #[test]
    fn detail_guard_finds_any_table_label() {
        let table = RuleTable::builtin().expect("builtin");
        let guard = DetailGuard::new(&table).expect("guard");
        let text = "本文。地行：水";
        assert_eq!(
            guard.first_token(text, Span::new(0, text.len())),
            Some("本文。".len())
        );
        let prose = "地格に9画の人";
        assert_eq!(guard.first_token(prose, Span::new(0, prose.len())), None);
    }

    #[test]
    fn registry_holds_every_builtin_section() {
        let table = RuleTable::builtin().expect("builtin");
        let registry = SectionRegistry::from_table(&table).expect("registry");
        assert_eq!(registry.kinds(), SectionKind::ALL.to_vec());
        let yin_yang = registry.get(SectionKind::YinYang).expect("yin yang");
        assert_eq!(yin_yang.shapes(), vec![EntryShape::Anchor]);
    }
}
