//! Corpus-wide tag hygiene: single-use tags and inconsistent casing.

use super::document::Document;
use crate::report::{Finding, Rule};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    pub path: String,
    pub line: usize,
    pub raw: String,
}

/// Occurrences keyed by lowercased tag, in document then tag order.
pub fn group(docs: &[Document]) -> BTreeMap<String, Vec<TagOccurrence>> {
    let mut groups: BTreeMap<String, Vec<TagOccurrence>> = BTreeMap::new();
    for doc in docs {
        let uri = doc.uri();
        for tag in &doc.tags {
            groups
                .entry(tag.value.to_lowercase())
                .or_default()
                .push(TagOccurrence {
                    path: uri.clone(),
                    line: tag.line,
                    raw: tag.value.clone(),
                });
        }
    }
    groups
}

pub fn check_tags(docs: &[Document]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (norm, occs) in group(docs) {
        if let [occ] = occs.as_slice() {
            findings.push(Finding::new(
                Rule::TagOrphan,
                format!("tag \"{}\" is only used once", occ.raw),
                &occ.path,
                occ.line,
            ));
        }

        let variants: BTreeSet<&str> = occs.iter().map(|o| o.raw.as_str()).collect();
        if variants.len() > 1 {
            for occ in &occs {
                findings.push(Finding::new(
                    Rule::TagCaseVariant,
                    format!(
                        "tag \"{}\" has case variants; prefer consistent casing for \"{}\"",
                        occ.raw, norm
                    ),
                    &occ.path,
                    occ.line,
                ));
            }
        }
    }

    findings
}
