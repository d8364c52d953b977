//! Property-based checks of the extraction invariants.

use kantei_model::{EntryCategory, SectionKind};
use kantei_parse::{Parser, RawEntry, resolve};
use kantei_rules::RuleTable;
use proptest::prelude::*;

const NAME_CHARS: &str = "[\u{4E00}-\u{9FA5}\u{3041}-\u{3093}]";

fn parser() -> Parser {
    Parser::builtin().unwrap()
}

fn name_part() -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("{NAME_CHARS}{{1,9}}")).unwrap()
}

/// Loose text assembled from the shapes the legacy page uses.
fn noisy_section() -> impl Strategy<Value = String> {
    let fragments = vec![
        "人格:", "地格：", "総格:", "地行:", "条め", "五条", "めざる", " ", "  ", "\n",
        "【火-水】", "【天地衝突】", "【", "】", "・", "次", "郎", "。", "大凶", "X", "花",
        "姓名鑑定の使い方",
    ];
    prop::collection::vec(prop::sample::select(fragments), 0..40).prop_map(|parts| parts.concat())
}

fn assert_well_formed(entries: &[RawEntry], labels: &[&str]) {
    for pair in entries.windows(2) {
        assert!(!pair[0].span.overlaps(&pair[1].span), "{pair:?}");
        assert!(pair[0].span.start < pair[1].span.start, "{pair:?}");
    }
    for (idx, entry) in entries.iter().enumerate() {
        assert_eq!(entry.position, idx);
        assert!(!entry.target.trim().is_empty());
        assert!(!entry.detail.contains('【'), "{entry:?}");
        for label in labels {
            assert!(!entry.detail.contains(&format!("{label}:")), "{entry:?}");
            assert!(!entry.detail.contains(&format!("{label}：")), "{entry:?}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn name_length_does_not_change_extraction(surname in name_part(), given in name_part()) {
        let text = format!(
            "人格:{given}\n【火-水】\n中年期の運勢は大凶。{surname} {given}【五行のバランス(良)】バランス感覚が良い。"
        );
        let parsed = parser().parse_section(SectionKind::FiveElement, &text);

        prop_assert_eq!(parsed.entries.len(), 2);
        prop_assert_eq!(parsed.entries[0].category, EntryCategory::Personality);
        prop_assert_eq!(&parsed.entries[0].target, &format!("人格:{given}"));
        prop_assert_eq!(parsed.entries[0].detail.as_str(), "中年期の運勢は大凶。");
        prop_assert_eq!(parsed.entries[1].category, EntryCategory::Balance);
        prop_assert_eq!(&parsed.entries[1].target, &format!("{surname} {given}"));
        prop_assert_eq!(parsed.entries[1].detail.as_str(), "バランス感覚が良い。");

        let anchor = parsed.anchor.unwrap();
        prop_assert_eq!(anchor.surname, surname);
        prop_assert_eq!(anchor.given_name, given);
    }

    #[test]
    fn resolving_section_output_is_a_no_op(text in noisy_section()) {
        let parser = parser();
        for kind in SectionKind::ALL {
            let entries = parser.parse_section(kind, &text).entries;
            prop_assert_eq!(resolve(entries.clone()), entries);
        }
    }

    #[test]
    fn entries_never_overlap_or_bleed(text in noisy_section()) {
        let parser = parser();
        let table = RuleTable::builtin().unwrap();
        let labels = table.all_labels();
        for kind in SectionKind::ALL {
            let entries = parser.parse_section(kind, &text).entries;
            assert_well_formed(&entries, &labels);
        }
    }

    #[test]
    fn whole_documents_keep_source_order(body in noisy_section(), tail in noisy_section()) {
        let text = format!("五行による鑑定\n{body}\n文字による鑑定\n{tail}");
        let report = parser().parse(&text);
        let keys: Vec<(usize, usize)> = report.result.iter().map(|e| e.sort_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
        for pair in report.result.entries().windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start);
        }
    }
}
