//! Append-only container for findings, and its projection onto SARIF.

use crate::sarif::{
    self, ArtifactLocation, Driver, Location, Message, PhysicalLocation, Region, SarifResult, Tool,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule identifiers emitted by wikifmt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    FrontmatterYaml,
    FrontmatterRequired,
    DateFormat,
    LinkBroken,
    TagOrphan,
    TagCaseVariant,
}

impl Rule {
    pub fn id(self) -> &'static str {
        match self {
            Rule::FrontmatterYaml => "wiki-frontmatter-yaml",
            Rule::FrontmatterRequired => "wiki-frontmatter-required",
            Rule::DateFormat => "wiki-date-format",
            Rule::LinkBroken => "wiki-link-broken",
            Rule::TagOrphan => "wiki-tag-orphan",
            Rule::TagCaseVariant => "wiki-tag-case-variant",
        }
    }

    /// Hard invariants are errors, hygiene issues are warnings.
    pub fn level(self) -> Level {
        match self {
            Rule::FrontmatterYaml
            | Rule::FrontmatterRequired
            | Rule::DateFormat
            | Rule::LinkBroken => Level::Error,
            Rule::TagOrphan | Rule::TagCaseVariant => Level::Warning,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: Rule,
    pub level: Level,
    pub message: String,
    pub path: String,
    pub line: Option<usize>,
}

impl Finding {
    /// Builds a finding at the rule's default level. A line of 0 means "no line".
    pub fn new(
        rule: Rule,
        message: impl Into<String>,
        path: impl Into<String>,
        line: usize,
    ) -> Self {
        Finding {
            rule,
            level: rule.level(),
            message: message.into(),
            path: path.into(),
            line: (line > 0).then_some(line),
        }
    }

    fn to_sarif(&self) -> SarifResult {
        SarifResult {
            rule_id: self.rule.id().to_string(),
            level: Some(self.level.as_str().to_string()),
            message: Message {
                text: self.message.clone(),
            },
            locations: vec![Location {
                physical_location: PhysicalLocation {
                    artifact_location: ArtifactLocation {
                        uri: self.path.clone(),
                    },
                    region: self.line.map(|line| Region {
                        start_line: Some(line),
                        ..Region::default()
                    }),
                },
            }],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    tool: String,
    version: Option<String>,
    findings: Vec<Finding>,
}

impl Report {
    pub fn new(tool: impl Into<String>) -> Self {
        Report {
            tool: tool.into(),
            version: None,
            findings: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count_level(&self, level: Level) -> usize {
        self.findings.iter().filter(|f| f.level == level).count()
    }

    /// One log with a single run, findings in insertion order.
    pub fn to_sarif(&self) -> sarif::Log {
        let mut log = sarif::Log::new();
        log.runs.push(sarif::Run {
            tool: Tool {
                driver: Driver {
                    name: self.tool.clone(),
                    version: self.version.clone(),
                    information_uri: None,
                },
            },
            results: self.findings.iter().map(Finding::to_sarif).collect(),
        });
        log
    }
}
