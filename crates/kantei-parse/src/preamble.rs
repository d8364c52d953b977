use std::collections::BTreeMap;

use kantei_model::Preamble;
use kantei_rules::PreambleSpec;
use regex::Regex;

use crate::error::{Result, compile};

/// Reads stroke tallies and the overall remark in front of the first section.
pub(crate) struct PreambleExtractor {
    tallies: Option<Regex>,
    remark_markers: Vec<String>,
}

impl PreambleExtractor {
    pub(crate) fn new(spec: &PreambleSpec) -> Result<Self> {
        let tallies = if spec.tally_labels.is_empty() {
            None
        } else {
            let labels = spec
                .tally_labels
                .iter()
                .map(|label| regex::escape(label))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(format!(r"({labels})\s+(\d+)"))?)
        };
        Ok(Self {
            tallies,
            remark_markers: spec.remark_markers.clone(),
        })
    }

    pub(crate) fn extract(&self, text: &str) -> Preamble {
        let mut tallies = BTreeMap::new();
        if let Some(pattern) = &self.tallies {
            for caps in pattern.captures_iter(text) {
                let (Some(label), Some(count)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let Ok(count) = count.as_str().parse::<u32>() else {
                    continue;
                };
                tallies.entry(label.as_str().to_string()).or_insert(count);
            }
        }
        Preamble {
            tallies,
            remark: self.remark(text),
        }
    }

    /// Text after the first marker found, through the first `。`.
    fn remark(&self, text: &str) -> Option<String> {
        self.remark_markers.iter().find_map(|marker| {
            let start = text.find(marker.as_str())? + marker.len();
            let rest = &text[start..];
            let end = rest.find('。')? + '。'.len_utf8();
            let remark = rest[..end].trim();
            (!remark.is_empty()).then(|| remark.to_string())
        })
    }
}
