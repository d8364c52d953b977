//! Judgment sections and byte spans.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::Anchor;

/// The five judgment dimensions the legacy page reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// 文字による鑑定 - per-character meanings.
    CharacterJudgment,
    /// 陰陽による鑑定 - yin/yang balance of the name.
    YinYang,
    /// 五行による鑑定 - five-element reading of the strokes.
    FiveElement,
    /// 画数による鑑定 - stroke-count fortunes.
    StrokeCount,
    /// 天地による鑑定 - heaven/earth relations.
    HeavenEarth,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::CharacterJudgment,
        SectionKind::YinYang,
        SectionKind::FiveElement,
        SectionKind::StrokeCount,
        SectionKind::HeavenEarth,
    ];

    /// Stable snake_case identifier, matching the serde and rule-table form.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::CharacterJudgment => "character_judgment",
            SectionKind::YinYang => "yin_yang",
            SectionKind::FiveElement => "five_element",
            SectionKind::StrokeCount => "stroke_count",
            SectionKind::HeavenEarth => "heaven_earth",
        }
    }

    /// Short Japanese name used in rendered output.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::CharacterJudgment => "文字",
            SectionKind::YinYang => "陰陽",
            SectionKind::FiveElement => "五行",
            SectionKind::StrokeCount => "画数",
            SectionKind::HeavenEarth => "天地",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown section kind '{s}'"))
    }
}

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two ranges share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Move the span by `offset` bytes (section-relative to document-relative).
    #[must_use]
    pub fn shift(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A named region of the document, spanning from just after its header to the
/// next known header or end of document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    /// Section body with surrounding whitespace removed.
    pub text: String,
    /// Encounter order within the document, starting at 0.
    pub order: usize,
    /// Document byte range of `text`.
    pub span: Span,
}

/// What the parser saw of a section, without its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutline {
    pub kind: SectionKind,
    pub order: usize,
    pub span: Span,
    pub anchor: Option<Anchor>,
    pub entry_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_overlap_is_half_open() {
        let a = Span::new(0, 4);
        assert!(a.overlaps(&Span::new(3, 6)));
        assert!(!a.overlaps(&Span::new(4, 6)));
        assert!(a.contains(&Span::new(1, 4)));
        assert_eq!(Span::new(2, 5).shift(10), Span::new(12, 15));
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in SectionKind::ALL {
            assert_eq!(kind.as_str().parse::<SectionKind>(), Ok(kind));
        }
        assert_eq!(
            "Five-Element".parse::<SectionKind>(),
            Ok(SectionKind::FiveElement)
        );
        assert!("tarot".parse::<SectionKind>().is_err());
    }
}
