//! wikifmt: frontmatter, link, and tag checks for wiki-style markdown.
//!
//! A run loads every document first, then checks in a fixed order:
//! frontmatter per document, tag hygiene over the corpus, links per
//! document. Callers may rely on that order.

pub mod document;
pub mod frontmatter;
pub mod index;
pub mod tags;

pub use document::{Document, Link, LinkKind, LoadOptions};
pub use frontmatter::{
    Frontmatter, FrontmatterError, FrontmatterErrorKind, ParsedFrontmatter, Spanned,
};
pub use index::Index;

use crate::config::WikifmtConfig;
use crate::error::Result;
use crate::report::{Level, Report};
use std::path::Path;

/// Driver name in the SARIF run.
pub const TOOL_NAME: &str = "lintkit-wikifmt";

#[derive(Debug, Clone, Default)]
pub struct WikiOptions {
    pub load: LoadOptions,
}

impl WikiOptions {
    pub fn from_config(config: &WikifmtConfig, extra_excludes: &[String]) -> Result<Self> {
        let patterns: Vec<&str> = config
            .exclude
            .iter()
            .chain(extra_excludes)
            .map(String::as_str)
            .collect();
        Ok(WikiOptions {
            load: LoadOptions::with_excludes(&patterns)?,
        })
    }
}

pub fn run<P: AsRef<Path>>(roots: &[P]) -> Result<Report> {
    run_with(roots, &WikiOptions::default())
}

pub fn run_with<P: AsRef<Path>>(roots: &[P], opts: &WikiOptions) -> Result<Report> {
    let docs = document::load(roots, &opts.load)?;
    Ok(analyze(&docs))
}

/// Runs every check over an already-loaded corpus.
pub fn analyze(docs: &[Document]) -> Report {
    let index = Index::build(docs);
    let mut report = Report::new(TOOL_NAME).with_version(env!("CARGO_PKG_VERSION"));

    for doc in docs {
        report.extend(frontmatter::check(&doc.uri(), &doc.frontmatter));
    }
    report.extend(tags::check_tags(docs));
    for doc in docs {
        report.extend(index::check_links(doc, &index));
    }

    tracing::info!(
        "wikifmt: {} documents, {} findings ({} errors, {} warnings)",
        docs.len(),
        report.len(),
        report.count_level(Level::Error),
        report.count_level(Level::Warning)
    );
    report
}
