pub mod document;
pub mod entry;
pub mod error;
pub mod result;
pub mod section;

pub use document::RawDocument;
pub use entry::{Anchor, Entry, EntryCategory};
pub use error::{ModelError, Result};
pub use result::{Diagnostic, ParseReport, ParseResult, Preamble};
pub use section::{Section, SectionKind, SectionOutline, Span};
