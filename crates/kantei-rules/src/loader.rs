use std::path::Path;

use crate::error::{Result, RulesError};
use crate::table::RuleTable;
use crate::validate::validate_table;

/// The rule table shipped with the crate.
pub const DEFAULT_RULES_TOML: &str = include_str!("../rules/default.toml");

const INLINE_SOURCE: &str = "<inline>";

impl RuleTable {
    /// Parse and validate a table from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        parse_table(contents, Path::new(INLINE_SOURCE))
    }

    /// Read, parse and validate a table from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RulesError::io(path, e))?;
        parse_table(&contents, path)
    }

    /// The embedded default table.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_RULES_TOML)
    }
}

fn parse_table(contents: &str, path: &Path) -> Result<RuleTable> {
    let table: RuleTable = toml::from_str(contents).map_err(|e| RulesError::Toml {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate_table(&table)?;
    Ok(table)
}
