use std::collections::BTreeSet;

use crate::error::{Result, RulesError};
use crate::table::RuleTable;

const SUPPORTED_SCHEMA_VERSION: u32 = 1;
const MAX_BARE_CHARS: usize = 18;

impl RuleTable {
    /// Check a table built in code; loaded tables are checked on load.
    pub fn validate(&self) -> Result<()> {
        validate_table(self)
    }
}

pub(crate) fn validate_table(table: &RuleTable) -> Result<()> {
    if table.schema_version != SUPPORTED_SCHEMA_VERSION {
        return Err(RulesError::invalid(format!(
            "unsupported schema_version: {}",
            table.schema_version
        )));
    }

    let mut kinds = BTreeSet::new();
    let mut headers = BTreeSet::new();
    for spec in &table.sections {
        if !kinds.insert(spec.kind) {
            return Err(RulesError::invalid(format!(
                "duplicate section kind: {}",
                spec.kind
            )));
        }
        let header = spec.header.trim();
        if header.is_empty() {
            return Err(RulesError::invalid(format!(
                "empty header for section {}",
                spec.kind
            )));
        }
        if !headers.insert(header) {
            return Err(RulesError::invalid(format!("duplicate header: {header}")));
        }

        for rule in &spec.labels {
            if rule.label.trim().is_empty() {
                return Err(RulesError::invalid(format!(
                    "empty label in section {}",
                    spec.kind
                )));
            }
            if rule.label.contains([':', '：']) {
                return Err(RulesError::invalid(format!(
                    "label '{}' in section {} must not contain a colon",
                    rule.label, spec.kind
                )));
            }
        }

        if let Some(bare) = &spec.bare
            && !(1..=MAX_BARE_CHARS).contains(&bare.max_chars)
        {
            return Err(RulesError::invalid(format!(
                "bare max_chars {} in section {} is outside 1..={MAX_BARE_CHARS}",
                bare.max_chars, spec.kind
            )));
        }

        if spec.tag_rules.iter().any(|rule| rule.contains.is_empty()) {
            return Err(RulesError::invalid(format!(
                "empty tag rule in section {}",
                spec.kind
            )));
        }
    }

    if table.stop_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(RulesError::invalid("empty stop keyword"));
    }

    Ok(())
}
