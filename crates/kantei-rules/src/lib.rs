#![deny(unsafe_code)]

//! Declarative section vocabulary for the kantei parser.
//!
//! The table names every known header, the labels each section accepts, and
//! how anchor and bare-character entries are categorised. New text shapes are
//! added by editing the TOML table rather than the parser.

pub mod error;
pub mod loader;
pub mod table;
mod validate;

pub use crate::error::{Result, RulesError};
pub use crate::loader::DEFAULT_RULES_TOML;
pub use crate::table::{BareRule, LabelRule, PreambleSpec, RuleTable, SectionSpec, TagRule};
