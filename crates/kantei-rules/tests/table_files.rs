use std::fs;

use kantei_model::{EntryCategory, SectionKind};
use kantei_rules::{DEFAULT_RULES_TOML, RuleTable, RulesError};

#[test]
fn loads_table_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    fs::write(
        &path,
        r#"
stop_keywords = ["おわり"]

[[sections]]
kind = "stroke_count"
header = "画数による鑑定"
labels = [{ label = "総格", category = "total" }]
"#,
    )
    .unwrap();

    let table = RuleTable::from_path(&path).unwrap();
    let spec = table.section(SectionKind::StrokeCount).unwrap();
    assert_eq!(spec.category_for_label("総格"), Some(EntryCategory::Total));
    assert_eq!(table.boundary_keywords(), vec!["おわり", "画数による鑑定"]);
}

#[test]
fn default_file_matches_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("default.toml");
    fs::write(&path, DEFAULT_RULES_TOML).unwrap();
    assert_eq!(
        RuleTable::from_path(&path).unwrap(),
        RuleTable::builtin().unwrap()
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = RuleTable::from_path(&path).unwrap_err();
    match err {
        RulesError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

fn invalid_message(toml: &str) -> String {
    match RuleTable::from_toml_str(toml).unwrap_err() {
        RulesError::Invalid { message } => message,
        other => panic!("expected invalid table, got {other}"),
    }
}

#[test]
fn rejects_duplicate_headers() {
    let message = invalid_message(
        r#"
[[sections]]
kind = "yin_yang"
header = "陰陽による鑑定"

[[sections]]
kind = "five_element"
header = "陰陽による鑑定"
"#,
    );
    assert!(message.contains("duplicate header"), "{message}");
}

#[test]
fn rejects_duplicate_kinds() {
    let message = invalid_message(
        r#"
[[sections]]
kind = "yin_yang"
header = "陰陽による鑑定"

[[sections]]
kind = "yin_yang"
header = "五行による鑑定"
"#,
    );
    assert!(message.contains("duplicate section kind"), "{message}");
}

#[test]
fn rejects_label_with_colon() {
    let message = invalid_message(
        r#"
[[sections]]
kind = "stroke_count"
header = "画数による鑑定"
labels = [{ label = "総格：", category = "total" }]
"#,
    );
    assert!(message.contains("colon"), "{message}");
}

#[test]
fn rejects_out_of_range_bare_length() {
    let message = invalid_message(
        r#"
[[sections]]
kind = "character_judgment"
header = "文字による鑑定"
bare = { category = "character_meaning", max_chars = 0 }
"#,
    );
    assert!(message.contains("max_chars"), "{message}");
}

#[test]
fn rejects_empty_header_and_tag_rule() {
    let message = invalid_message(
        r#"
[[sections]]
kind = "heaven_earth"
header = "  "
"#,
    );
    assert!(message.contains("empty header"), "{message}");

    let message = invalid_message(
        r#"
[[sections]]
kind = "heaven_earth"
header = "天地による鑑定"
tag_rules = [{ contains = "", category = "conflict" }]
"#,
    );
    assert!(message.contains("empty tag rule"), "{message}");
}

#[test]
fn rejects_unknown_schema_version() {
    let message = invalid_message(
        r#"
schema_version = 2

[[sections]]
kind = "yin_yang"
header = "陰陽による鑑定"
"#,
    );
    assert!(message.contains("schema_version"), "{message}");
}
