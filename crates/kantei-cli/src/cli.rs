//! CLI argument definitions for the kantei inspector.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use kantei_model::SectionKind;

#[derive(Parser)]
#[command(
    name = "kantei",
    version,
    about = "Segment raw seimei-handan result text into typed entries",
    long_about = "Segment captured seimei-handan (name judgment) result text.\n\n\
                  Splits the text at the known section headers, finds the subject's\n\
                  name in each section and prints the extracted entries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow subject names and entry targets in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract entries from a captured result text.
    Parse(ParseArgs),

    /// List the sections detected in a captured result text.
    Sections(SectionsArgs),

    /// Print the effective rule table.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct ParseArgs {
    /// Raw text file, or `-` for stdin.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rule table to use instead of the built-in one.
    #[arg(long = "rules", value_name = "TOML")]
    pub rules: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Only print entries of this section (e.g. five_element).
    #[arg(long = "section", value_name = "KIND")]
    pub section: Option<SectionKind>,
}

#[derive(Parser)]
pub struct SectionsArgs {
    /// Raw text file, or `-` for stdin.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rule table to use instead of the built-in one.
    #[arg(long = "rules", value_name = "TOML")]
    pub rules: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Rule table to use instead of the built-in one.
    #[arg(long = "rules", value_name = "TOML")]
    pub rules: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn section_filter_accepts_kebab_case() {
        let cli = Cli::try_parse_from(["kantei", "parse", "-", "--section", "five-element"])
            .unwrap();
        let Command::Parse(args) = cli.command else {
            panic!("expected parse command");
        };
        assert_eq!(args.section, Some(SectionKind::FiveElement));
        assert_eq!(args.input, PathBuf::from("-"));
    }
}
