use serde::{Deserialize, Serialize};

use kantei_model::{EntryCategory, SectionKind};

/// The full rule table: header vocabulary plus per-section entry shapes.
///
/// Section order in the table is the order headers are searched for; the
/// splitter still orders sections by where they occur in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Keywords that end detail capture in every section.
    #[serde(default)]
    pub stop_keywords: Vec<String>,
    #[serde(default)]
    pub preamble: PreambleSpec,
    pub sections: Vec<SectionSpec>,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreambleSpec {
    /// Labels read as `LABEL <count>` before the first header.
    #[serde(default)]
    pub tally_labels: Vec<String>,
    /// Text introducing the overall remark; the remark runs to the first `。`.
    #[serde(default)]
    pub remark_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub kind: SectionKind,
    pub header: String,
    #[serde(default)]
    pub labels: Vec<LabelRule>,
    /// Category of whole-name entries. Without one the anchor only bounds
    /// other entries.
    #[serde(default)]
    pub anchor_category: Option<EntryCategory>,
    /// Record a diagnostic when no anchor is found.
    #[serde(default)]
    pub expects_anchor: bool,
    #[serde(default)]
    pub bare: Option<BareRule>,
    #[serde(default)]
    pub tag_rules: Vec<TagRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub label: String,
    pub category: EntryCategory,
}

/// Unlabeled single-token entries such as `め\n【地行が水行】`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BareRule {
    pub category: EntryCategory,
    pub max_chars: usize,
    /// Accept `・`-joined tokens as one entry.
    #[serde(default)]
    pub composite: bool,
    /// Accept a token followed by two or more spaces and free text.
    #[serde(default)]
    pub free_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub contains: String,
    pub category: EntryCategory,
}

impl RuleTable {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionSpec> {
        self.sections.iter().find(|spec| spec.kind == kind)
    }

    /// `(kind, header)` pairs in table order.
    pub fn headers(&self) -> impl Iterator<Item = (SectionKind, &str)> {
        self.sections
            .iter()
            .map(|spec| (spec.kind, spec.header.as_str()))
    }

    /// Every distinct label of every section, in first-seen order.
    pub fn all_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for rule in self.sections.iter().flat_map(|spec| &spec.labels) {
            if !labels.contains(&rule.label.as_str()) {
                labels.push(rule.label.as_str());
            }
        }
        labels
    }

    /// Stop keywords plus every header; each one ends a detail.
    pub fn boundary_keywords(&self) -> Vec<&str> {
        self.stop_keywords
            .iter()
            .map(String::as_str)
            .chain(self.sections.iter().map(|spec| spec.header.as_str()))
            .collect()
    }
}

impl SectionSpec {
    pub fn category_for_label(&self, label: &str) -> Option<EntryCategory> {
        self.labels
            .iter()
            .find(|rule| rule.label == label)
            .map(|rule| rule.category)
    }

    /// Category implied by an evaluation tag, if any tag rule matches.
    pub fn classify_tag(&self, tag: &str) -> Option<EntryCategory> {
        self.tag_rules
            .iter()
            .find(|rule| tag.contains(rule.contains.as_str()))
            .map(|rule| rule.category)
    }
}
