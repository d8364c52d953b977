use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::section::{SectionKind, Span};

/// What an extracted record judges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    /// 人格
    Personality,
    /// 地格
    Earth,
    /// 地行
    EarthConduct,
    /// 総格
    Total,
    /// 五行のバランス - the whole-name five-element balance.
    Balance,
    /// Whole-name yin/yang verdict.
    YinYangResult,
    /// Meaning of a single (or "・"-joined) character.
    CharacterMeaning,
    /// 衝突
    Conflict,
    /// 同数
    SameCount,
    /// 総同数
    TotalSameCount,
}

impl EntryCategory {
    pub const ALL: [EntryCategory; 10] = [
        EntryCategory::Personality,
        EntryCategory::Earth,
        EntryCategory::EarthConduct,
        EntryCategory::Total,
        EntryCategory::Balance,
        EntryCategory::YinYangResult,
        EntryCategory::CharacterMeaning,
        EntryCategory::Conflict,
        EntryCategory::SameCount,
        EntryCategory::TotalSameCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryCategory::Personality => "personality",
            EntryCategory::Earth => "earth",
            EntryCategory::EarthConduct => "earth_conduct",
            EntryCategory::Total => "total",
            EntryCategory::Balance => "balance",
            EntryCategory::YinYangResult => "yin_yang_result",
            EntryCategory::CharacterMeaning => "character_meaning",
            EntryCategory::Conflict => "conflict",
            EntryCategory::SameCount => "same_count",
            EntryCategory::TotalSameCount => "total_same_count",
        }
    }

    /// Japanese label as printed on the legacy page.
    pub fn label(self) -> &'static str {
        match self {
            EntryCategory::Personality => "人格",
            EntryCategory::Earth => "地格",
            EntryCategory::EarthConduct => "地行",
            EntryCategory::Total => "総格",
            EntryCategory::Balance => "五行のバランス",
            EntryCategory::YinYangResult => "陰陽",
            EntryCategory::CharacterMeaning => "文字",
            EntryCategory::Conflict => "衝突",
            EntryCategory::SameCount => "同数",
            EntryCategory::TotalSameCount => "総同数",
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EntryCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized || category.label() == s.trim())
            .ok_or_else(|| format!("unknown entry category '{s}'"))
    }
}

/// The subject's full name as it appears inside one section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub surname: String,
    pub given_name: String,
    pub evaluation_tag: Option<String>,
}

impl Anchor {
    /// Surname and given name joined by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.given_name)
    }
}

/// One structured record extracted from a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub category: EntryCategory,
    /// Verbatim target text, e.g. `人格:条め`, `五条 めざる` or `次・郎`.
    pub target: String,
    /// Content of the bracket tag immediately following the target.
    pub evaluation_tag: Option<String>,
    pub detail: String,
    pub section: SectionKind,
    pub section_order: usize,
    /// Document-order index within the section.
    pub position: usize,
    /// Document byte range from the target start to the end of the detail.
    pub span: Span,
}

impl Entry {
    /// The target without its `LABEL:` prefix.
    ///
    /// `人格:条め` yields `条め`; unlabeled targets are returned unchanged.
    pub fn subject(&self) -> &str {
        match self.target.find([':', '：']) {
            Some(idx) => {
                let sep_len = self.target[idx..].chars().next().map_or(0, char::len_utf8);
                self.target[idx + sep_len..].trim_start()
            }
            None => &self.target,
        }
    }

    /// Grouping key used by the assembler.
    pub fn sort_key(&self) -> (usize, usize) {
        (self.section_order, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(target: &str) -> Entry {
        Entry {
            category: EntryCategory::Personality,
            target: target.to_string(),
            evaluation_tag: None,
            detail: String::new(),
            section: SectionKind::FiveElement,
            section_order: 0,
            position: 0,
            span: Span::default(),
        }
    }

    #[test]
    fn subject_strips_label() {
        assert_eq!(entry("人格:条め").subject(), "条め");
        assert_eq!(entry("人格：浦百").subject(), "浦百");
        assert_eq!(entry("総格: 上原 はま").subject(), "上原 はま");
        assert_eq!(entry("五条 めざる").subject(), "五条 めざる");
    }

    #[test]
    fn category_parses_from_label_or_identifier() {
        assert_eq!("総同数".parse(), Ok(EntryCategory::TotalSameCount));
        assert_eq!("earth_conduct".parse(), Ok(EntryCategory::EarthConduct));
        assert!("天格".parse::<EntryCategory>().is_err());
    }
}
