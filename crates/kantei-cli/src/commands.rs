use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use kantei_model::ParseReport;
use kantei_parse::{Parser, parse_bytes};
use kantei_rules::RuleTable;
use tracing::{debug, info, info_span, warn};

use kantei_cli::logging::redact_value;
use kantei_cli::render::{
    diagnostic_line, entries_table, report_json, rules_table, sections_table, write_csv,
};

use crate::cli::{OutputFormatArg, ParseArgs, RulesArgs, SectionsArgs};

pub fn run_parse(args: &ParseArgs) -> Result<()> {
    let span = info_span!("parse", input = %args.input.display());
    let _guard = span.enter();
    let report = load_and_parse(&args.input, args.rules.as_deref())?;
    report_diagnostics(&report);

    let selected: Vec<_> = report
        .result
        .iter()
        .filter(|entry| args.section.is_none_or(|kind| entry.section == kind))
        .collect();
    info!(entries = selected.len(), "entries selected");

    match args.format {
        OutputFormatArg::Table => println!("{}", entries_table(selected)),
        OutputFormatArg::Csv => {
            write_csv(io::stdout().lock(), selected).context("write csv")?;
        }
        OutputFormatArg::Json => {
            println!("{}", report_json(&report).context("serialize report")?);
        }
    }
    Ok(())
}

pub fn run_sections(args: &SectionsArgs) -> Result<()> {
    let report = load_and_parse(&args.input, args.rules.as_deref())?;
    report_diagnostics(&report);
    println!("{}", sections_table(&report));
    Ok(())
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;
    println!("{}", rules_table(&rules));
    if !rules.stop_keywords.is_empty() {
        println!("Stop keywords: {}", rules.stop_keywords.join(", "));
    }
    if !rules.preamble.tally_labels.is_empty() {
        println!("Tally labels: {}", rules.preamble.tally_labels.join(", "));
    }
    Ok(())
}

fn load_and_parse(input: &Path, rules: Option<&Path>) -> Result<ParseReport> {
    let rules = load_rules(rules)?;
    let parser = Parser::new(&rules).context("compile rule table")?;
    let bytes = read_input(input)?;
    let report = parse_bytes(bytes, &parser)
        .with_context(|| format!("decode {}", input.display()))?;
    for outline in &report.sections {
        match &outline.anchor {
            Some(anchor) => {
                let name = anchor.full_name();
                debug!(
                    section = %outline.kind,
                    anchor = %redact_value(&name),
                    entries = outline.entry_count,
                    "section parsed"
                );
            }
            None => {
                debug!(
                    section = %outline.kind,
                    entries = outline.entry_count,
                    "section parsed without anchor"
                );
            }
        }
    }
    Ok(report)
}

fn load_rules(path: Option<&Path>) -> Result<RuleTable> {
    match path {
        Some(path) => RuleTable::from_path(path)
            .with_context(|| format!("load rule table {}", path.display())),
        None => RuleTable::builtin().context("load built-in rule table"),
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("read stdin")?;
        Ok(bytes)
    } else {
        fs::read(input).with_context(|| format!("read {}", input.display()))
    }
}

fn report_diagnostics(report: &ParseReport) {
    if report.is_partial() {
        warn!("extraction is partial: a section is missing its subject name");
    }
    for diagnostic in &report.diagnostics {
        debug!("{}", diagnostic_line(diagnostic));
    }
}
