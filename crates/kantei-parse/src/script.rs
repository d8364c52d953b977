//! Character classes of the legacy text.
//!
//! Names and targets are runs of Japanese-script characters. The middle dot
//! `・` is deliberately outside the class: it joins composite targets.

use std::sync::LazyLock;

use regex::Regex;

/// Inclusive code-point ranges counted as Japanese script.
const JAPANESE_RANGES: &[(char, char)] = &[
    ('\u{3005}', '\u{3007}'), // 々 〆 〇
    ('\u{3041}', '\u{3096}'), // hiragana
    ('\u{309D}', '\u{309F}'), // ゝ ゞ ゟ
    ('\u{30A1}', '\u{30FA}'), // katakana
    ('\u{30FC}', '\u{30FF}'), // ー ヽ ヾ ヿ
    ('\u{3400}', '\u{4DBF}'), // CJK extension A
    ('\u{4E00}', '\u{9FFF}'), // CJK unified ideographs
    ('\u{F900}', '\u{FAFF}'), // CJK compatibility ideographs
];

pub const COMPOSITE_JOINER: char = '・';

/// Characters that may sit right before a bare target.
const SENTENCE_CLOSERS: &[char] = &['。', '！', '？', '!', '?', '」', '』', '）', ')'];

/// Regex fragment for horizontal space: ASCII space, tab, ideographic space.
pub(crate) const HSPACE: &str = r"[ \t\x{3000}]";

/// Regex class matching one Japanese-script character.
pub(crate) static SCRIPT_CLASS: LazyLock<String> = LazyLock::new(|| {
    let ranges: String = JAPANESE_RANGES
        .iter()
        .map(|(lo, hi)| format!(r"\x{{{:X}}}-\x{{{:X}}}", *lo as u32, *hi as u32))
        .collect();
    format!("[{ranges}]")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*【([^】\n]*)】").expect("Invalid tag regex"));

pub fn is_japanese_char(c: char) -> bool {
    JAPANESE_RANGES
        .iter()
        .any(|(lo, hi)| (*lo..=*hi).contains(&c))
}

pub fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{3000}')
}

/// True when every character of `s` is Japanese script and `s` is not empty.
pub fn is_script_run(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_japanese_char)
}

pub(crate) fn char_before(text: &str, idx: usize) -> Option<char> {
    text[..idx].chars().next_back()
}

pub(crate) fn char_at(text: &str, idx: usize) -> Option<char> {
    text[idx..].chars().next()
}

/// No script character touches `[start, end)` from either side.
pub(crate) fn is_isolated_run(text: &str, start: usize, end: usize) -> bool {
    !char_before(text, start).is_some_and(is_japanese_char)
        && !char_at(text, end).is_some_and(is_japanese_char)
}

/// A bare target may only follow section start, whitespace or a sentence closer.
pub(crate) fn opens_bare_target(text: &str, idx: usize) -> bool {
    match char_before(text, idx) {
        None => true,
        Some(c) => c.is_whitespace() || SENTENCE_CLOSERS.contains(&c),
    }
}

/// Only horizontal space separates `idx` from the previous newline or from
/// the start of the text.
pub(crate) fn starts_line(text: &str, idx: usize) -> bool {
    text[..idx]
        .chars()
        .rev()
        .find(|c| !is_horizontal_space(*c))
        .is_none_or(|c| c == '\n' || c == '\r')
}

/// An evaluation tag `【...】` starting at `idx`, possibly after whitespace.
///
/// Returns the tag content and the byte offset just past `】`.
pub(crate) fn tag_after(text: &str, idx: usize) -> Option<(String, usize)> {
    let caps = TAG.captures(&text[idx..])?;
    let whole = caps.get(0)?;
    let content = caps.get(1)?;
    Some((content.as_str().to_string(), idx + whole.end()))
}

/// Two or more horizontal spaces at `idx` followed by a visible character.
pub(crate) fn free_text_after(text: &str, idx: usize) -> bool {
    let rest = &text[idx..];
    let spaces = rest.chars().take_while(|c| is_horizontal_space(*c)).count();
    spaces >= 2
        && rest
            .chars()
            .nth(spaces)
            .is_some_and(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_script_characters() {
        for c in ['あ', 'ゞ', 'ア', 'ー', '々', '〇', '条', '𠀋'] {
            assert_eq!(is_japanese_char(c), c != '𠀋', "{c}");
        }
        for c in ['・', 'A', '1', '。', '【', ' ', '\u{3000}'] {
            assert!(!is_japanese_char(c), "{c}");
        }
    }

    #[test]
    fn script_class_agrees_with_predicate() {
        let class = Regex::new(&SCRIPT_CLASS).expect("class");
        for c in ['あ', 'カ', '鑑', '々', '・', 'a', '：'] {
            let mut buf = [0u8; 4];
            assert_eq!(
                class.is_match(c.encode_utf8(&mut buf)),
                is_japanese_char(c),
                "{c}"
            );
        }
    }

    #[test]
    fn tag_may_follow_a_line_break() {
        let text = "条め\n【火-水】\n本文";
        let (tag, end) = tag_after(text, "条め".len()).expect("tag");
        assert_eq!(tag, "火-水");
        assert_eq!(&text[end..], "\n本文");
        assert!(tag_after("条め 本文【火】", "条め".len()).is_none());
    }

    #[test]
    fn line_start_ignores_horizontal_space() {
        let text = "本文。\n\u{3000} 五条 めざる";
        let idx = text.find('五').expect("name");
        assert!(starts_line(text, idx));
        assert!(starts_line("五条", 0));
        assert!(!starts_line("。腎臓 心臓", "。".len()));
    }

    #[test]
    fn free_text_needs_two_spaces() {
        assert!(free_text_after("花  文字の由来", "花".len()));
        assert!(!free_text_after("花 文字", "花".len()));
        assert!(!free_text_after("花  \n", "花".len()));
    }
}
