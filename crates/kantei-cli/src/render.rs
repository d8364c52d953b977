//! Terminal and machine-readable rendering of parse output.

use std::io::Write;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use kantei_model::{Diagnostic, Entry, ParseReport, SectionOutline};
use kantei_rules::RuleTable;

pub const CSV_HEADER: [&str; 7] = [
    "section",
    "order",
    "position",
    "category",
    "target",
    "evaluation_tag",
    "detail",
];

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(3)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::LowerBoundary(Width::Percentage(25)),
        ]);
    }
}

pub fn entries_table<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("#"),
        header_cell("Category"),
        header_cell("Target"),
        header_cell("Tag"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.section.label()),
            Cell::new(entry.position),
            Cell::new(entry.category.label()),
            Cell::new(&entry.target)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_cell(entry.evaluation_tag.as_deref()),
            Cell::new(&entry.detail),
        ]);
    }
    table
}

pub fn sections_table(report: &ParseReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Order"),
        header_cell("Section"),
        header_cell("Bytes"),
        header_cell("Length"),
        header_cell("Anchor"),
        header_cell("Entries"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for outline in &report.sections {
        table.add_row(outline_row(outline, missing_anchor(report, outline)));
    }
    table
}

fn outline_row(outline: &SectionOutline, missing: bool) -> Vec<Cell> {
    let anchor = match (&outline.anchor, missing) {
        (Some(anchor), _) => Cell::new(anchor.full_name()),
        (None, true) => Cell::new("missing")
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        (None, false) => dim_cell("-"),
    };
    vec![
        Cell::new(outline.order),
        Cell::new(outline.kind.label()),
        Cell::new(format!("{}..{}", outline.span.start, outline.span.end)),
        Cell::new(outline.span.len()),
        anchor,
        Cell::new(outline.entry_count),
    ]
}

fn missing_anchor(report: &ParseReport, outline: &SectionOutline) -> bool {
    report.diagnostics.iter().any(
        |d| matches!(d, Diagnostic::MissingAnchor { section } if *section == outline.kind),
    )
}

pub fn rules_table(rules: &RuleTable) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Header"),
        header_cell("Labels"),
        header_cell("Anchor"),
        header_cell("Bare"),
        header_cell("Tag rules"),
    ]);
    apply_table_style(&mut table);
    for spec in &rules.sections {
        let labels = spec
            .labels
            .iter()
            .map(|rule| format!("{} -> {}", rule.label, rule.category))
            .collect::<Vec<_>>()
            .join("\n");
        let anchor = match (spec.anchor_category, spec.expects_anchor) {
            (Some(category), true) => Cell::new(format!("{category} (required)")),
            (Some(category), false) => Cell::new(category),
            (None, _) => dim_cell("-"),
        };
        let bare = match &spec.bare {
            Some(bare) => {
                let mut text = format!("{} <= {}", bare.category, bare.max_chars);
                if bare.composite {
                    text.push_str(" +composite");
                }
                if bare.free_text {
                    text.push_str(" +free text");
                }
                Cell::new(text)
            }
            None => dim_cell("-"),
        };
        let tags = spec
            .tag_rules
            .iter()
            .map(|rule| format!("{} -> {}", rule.contains, rule.category))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(spec.kind.label()),
            Cell::new(&spec.header)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            text_or_dash(labels),
            anchor,
            bare,
            text_or_dash(tags),
        ]);
    }
    table
}

/// Write entries as CSV with a header row.
pub fn write_csv<'a, W: Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a Entry>,
) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for entry in entries {
        let order = entry.section_order.to_string();
        let position = entry.position.to_string();
        csv.write_record([
            entry.section.as_str(),
            order.as_str(),
            position.as_str(),
            entry.category.as_str(),
            entry.target.as_str(),
            entry.evaluation_tag.as_deref().unwrap_or(""),
            entry.detail.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn report_json(report: &ParseReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// One line per diagnostic, for stderr.
pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::NoSectionsFound => "no known section header found".to_string(),
        Diagnostic::DuplicateHeader { section, offset } => {
            format!("{section}: repeated header at byte {offset} ignored")
        }
        Diagnostic::MissingAnchor { section } => {
            format!("{section}: subject name not found, extraction is partial")
        }
        Diagnostic::SkippedSpan { section, span, .. } => {
            format!("{section}: skipped bytes {}..{}", span.start, span.end)
        }
        Diagnostic::OverlapResolved {
            section,
            kept,
            dropped,
        } => format!(
            "{section}: kept {}..{} over {}..{}",
            kept.start, kept.end, dropped.start, dropped.end
        ),
        Diagnostic::Deduplicated { section, span } => {
            format!("{section}: duplicate entry at {}..{} dropped", span.start, span.end)
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn text_or_dash(text: String) -> Cell {
    if text.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
