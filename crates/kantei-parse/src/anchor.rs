//! Name/Target Detector.
//!
//! The subject's full name is never known in advance. It is recognised
//! structurally: two script runs of 1-9 characters separated by exactly one
//! horizontal space, either carrying an evaluation tag or standing at the
//! start of a line. Untagged mid-sentence pairs (`腎臓 心臓`) are prose.

use std::sync::LazyLock;

use kantei_model::{Anchor, Span};
use regex::Regex;
use tracing::trace;

use crate::script::{self, HSPACE, SCRIPT_CLASS};

/// Longest surname or given name, in characters.
pub const MAX_NAME_CHARS: usize = 9;

static NAME_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    let class = &*SCRIPT_CLASS;
    Regex::new(&format!("({class}+){HSPACE}({class}+)")).expect("Invalid name pair regex")
});

/// A located name: the anchor plus where its first accepted mention sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    pub anchor: Anchor,
    /// Surname start to given-name end.
    pub target: Span,
    /// Target plus the trailing tag, if any.
    pub head: Span,
}

/// The first full-name mention in a section, or `None`.
pub fn detect_anchor(section_text: &str) -> Option<Anchor> {
    find_anchor(section_text).map(|found| found.anchor)
}

pub(crate) fn find_anchor(text: &str) -> Option<AnchorMatch> {
    let mut from = 0;
    while from < text.len() {
        let caps = NAME_PAIR.captures_at(text, from)?;
        let (Some(surname), Some(given)) = (caps.get(1), caps.get(2)) else {
            return None;
        };
        let tag = script::tag_after(text, given.end());
        let plausible = name_len_ok(surname.as_str())
            && name_len_ok(given.as_str())
            && !script::char_before(text, surname.start()).is_some_and(script::is_japanese_char);
        if plausible && (tag.is_some() || script::starts_line(text, surname.start())) {
            let head_end = tag.as_ref().map_or(given.end(), |(_, end)| *end);
            trace!(start = surname.start(), tagged = tag.is_some(), "anchor detected");
            return Some(AnchorMatch {
                anchor: Anchor {
                    surname: surname.as_str().to_string(),
                    given_name: given.as_str().to_string(),
                    evaluation_tag: tag.map(|(content, _)| content),
                },
                target: Span::new(surname.start(), given.end()),
                head: Span::new(surname.start(), head_end),
            });
        }
        // The given name may still open the real pair.
        from = given.start();
    }
    None
}

/// Every mention of `anchor` in `text`: surname, one or more horizontal
/// spaces, given name, not glued to a longer script run.
pub(crate) fn anchor_occurrences(text: &str, anchor: &Anchor) -> Vec<AnchorMatch> {
    let mut found = Vec::new();
    for (start, _) in text.match_indices(anchor.surname.as_str()) {
        let after_surname = start + anchor.surname.len();
        let gap = text[after_surname..]
            .char_indices()
            .find(|(_, c)| !script::is_horizontal_space(*c))
            .map_or(text.len() - after_surname, |(idx, _)| idx);
        if gap == 0 {
            continue;
        }
        let given_start = after_surname + gap;
        if !text[given_start..].starts_with(anchor.given_name.as_str()) {
            continue;
        }
        let end = given_start + anchor.given_name.len();
        if !script::is_isolated_run(text, start, end) {
            continue;
        }
        let tag = script::tag_after(text, end);
        let head_end = tag.as_ref().map_or(end, |(_, tag_end)| *tag_end);
        found.push(AnchorMatch {
            anchor: Anchor {
                surname: anchor.surname.clone(),
                given_name: anchor.given_name.clone(),
                evaluation_tag: tag.map(|(content, _)| content),
            },
            target: Span::new(start, end),
            head: Span::new(start, head_end),
        });
    }
    found
}

fn name_len_ok(part: &str) -> bool {
    (1..=MAX_NAME_CHARS).contains(&part.chars().count())
}
