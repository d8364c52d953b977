use kantei_model::ModelError;
use kantei_rules::RulesError;

/// Failures that stop a parse before any text is examined.
///
/// Irregular text never produces one of these; it degrades to fewer entries
/// plus diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input could not be read as text.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The rule table is inconsistent.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// A pattern derived from the rule table failed to compile.
    #[error("failed to compile pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub(crate) fn compile(pattern: String) -> Result<regex::Regex> {
    regex::Regex::new(&pattern).map_err(|source| ParseError::Pattern { pattern, source })
}
