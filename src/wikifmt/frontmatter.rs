//! Restricted frontmatter grammar: scalar `key: value` lines plus an
//! indented `  - item` list under `tags`. This is deliberately not YAML.

use crate::report::{Finding, Rule};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

pub const DELIMITER: &str = "---";
const LIST_PREFIX: &str = "  - ";

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// A parsed value and the 1-indexed line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub value: T,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<Spanned<String>>,
    pub date: Option<Spanned<String>>,
    /// Line of the `tags:` key, plus each tag at its own line
    pub tags: Option<Spanned<Vec<Spanned<String>>>>,
}

impl Frontmatter {
    pub fn tag_values(&self) -> impl Iterator<Item = &Spanned<String>> {
        self.tags.iter().flat_map(|t| t.value.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontmatterErrorKind {
    #[error("missing frontmatter")]
    Missing,
    #[error("invalid YAML list entry without key")]
    ListEntryWithoutKey,
    #[error("unexpected list item")]
    UnexpectedListItem,
    #[error("invalid frontmatter line")]
    InvalidLine,
    #[error("duplicate key \"{key}\"")]
    DuplicateKey { key: String, previous: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterError {
    pub kind: FrontmatterErrorKind,
    pub line: usize,
}

impl FrontmatterError {
    pub fn is_missing(&self) -> bool {
        self.kind == FrontmatterErrorKind::Missing
    }
}

impl std::fmt::Display for FrontmatterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FrontmatterErrorKind::Missing => write!(f, "{}", self.kind),
            FrontmatterErrorKind::InvalidLine => {
                write!(f, "invalid frontmatter line {}", self.line)
            }
            FrontmatterErrorKind::DuplicateKey { previous, .. } => write!(
                f,
                "{} on line {} (previously on line {})",
                self.kind, self.line, previous
            ),
            kind => write!(f, "{} on line {}", kind, self.line),
        }
    }
}

impl std::error::Error for FrontmatterError {}

/// Best-effort parse result. `frontmatter` holds whatever was read before
/// the first error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFrontmatter {
    pub frontmatter: Frontmatter,
    pub error: Option<FrontmatterError>,
    /// Line of the closing delimiter, when a block was found
    pub end_line: Option<usize>,
}

impl ParsedFrontmatter {
    /// First 1-indexed line after the block.
    pub fn body_start(&self) -> usize {
        self.end_line.map_or(1, |end| end + 1)
    }
}

#[derive(Default)]
struct State {
    fm: Frontmatter,
    current_key: Option<String>,
    seen: HashMap<String, usize>,
}

impl State {
    /// Records `tags` as present. Empty values are not tags.
    fn push_tag(&mut self, value: &str, line: usize, key_line: usize) {
        let tags = self.fm.tags.get_or_insert_with(|| Spanned {
            value: Vec::new(),
            line: key_line,
        });
        if !value.is_empty() {
            tags.value.push(Spanned {
                value: value.to_string(),
                line,
            });
        }
    }

    fn line(&mut self, raw: &str, line_no: usize) -> Result<(), FrontmatterErrorKind> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        if raw.starts_with(LIST_PREFIX) {
            if self.current_key.as_deref() != Some("tags") {
                return Err(FrontmatterErrorKind::UnexpectedListItem);
            }
            let key_line = self.seen.get("tags").copied().unwrap_or(line_no);
            self.push_tag(raw[LIST_PREFIX.len()..].trim(), line_no, key_line);
            return Ok(());
        }

        if trimmed.starts_with('-') {
            return Err(FrontmatterErrorKind::ListEntryWithoutKey);
        }

        let (key, value) = raw.split_once(':').ok_or(FrontmatterErrorKind::InvalidLine)?;
        let key = key.trim();
        let value = value.trim();
        self.current_key = Some(key.to_string());

        if let Some(&previous) = self.seen.get(key) {
            return Err(FrontmatterErrorKind::DuplicateKey {
                key: key.to_string(),
                previous,
            });
        }
        self.seen.insert(key.to_string(), line_no);

        let scalar = || {
            (!value.is_empty()).then(|| Spanned {
                value: value.to_string(),
                line: line_no,
            })
        };
        match key {
            "title" => self.fm.title = scalar(),
            "date" => self.fm.date = scalar(),
            // a bare `tags:` only counts once a list item follows
            "tags" if !value.is_empty() => self.push_tag(value, line_no, line_no),
            _ => {}
        }
        Ok(())
    }
}

/// Locates the delimited block at the top of `content` and parses it.
pub fn parse(content: &str) -> ParsedFrontmatter {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    if lines.first() != Some(&DELIMITER) {
        return missing();
    }
    // an empty block counts as missing
    let close = match lines.iter().skip(1).position(|l| *l == DELIMITER) {
        Some(close) if close > 0 => close,
        _ => return missing(),
    };
    let body = &lines[1..=close];

    let mut state = State::default();
    let mut error = None;
    for (i, raw) in body.iter().enumerate() {
        let line_no = i + 2; // opening delimiter is line 1
        if let Err(kind) = state.line(raw, line_no) {
            error = Some(FrontmatterError { kind, line: line_no });
            break;
        }
    }

    ParsedFrontmatter {
        frontmatter: state.fm,
        error,
        end_line: Some(body.len() + 2),
    }
}

fn missing() -> ParsedFrontmatter {
    ParsedFrontmatter {
        frontmatter: Frontmatter::default(),
        error: Some(FrontmatterError {
            kind: FrontmatterErrorKind::Missing,
            line: 1,
        }),
        end_line: None,
    }
}

/// Strict `YYYY-MM-DD` that is also a real calendar date.
pub fn is_valid_date(value: &str) -> bool {
    DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Frontmatter findings for one document.
///
/// A malformed block is reported and stops here. A missing block is
/// reported and then still checked, so every required key shows up as
/// missing too.
pub fn check(path: &str, parsed: &ParsedFrontmatter) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(err) = &parsed.error {
        findings.push(Finding::new(
            Rule::FrontmatterYaml,
            format!("invalid frontmatter YAML: {err}"),
            path,
            err.line,
        ));
        if !err.is_missing() {
            return findings;
        }
    }

    let fm = &parsed.frontmatter;
    let required = |key: &str| {
        Finding::new(
            Rule::FrontmatterRequired,
            format!("missing required frontmatter key: {key}"),
            path,
            1,
        )
    };

    if fm.title.is_none() {
        findings.push(required("title"));
    }
    match &fm.date {
        None => findings.push(required("date")),
        Some(date) if !is_valid_date(&date.value) => findings.push(Finding::new(
            Rule::DateFormat,
            format!("date must be YYYY-MM-DD, got \"{}\"", date.value),
            path,
            date.line,
        )),
        Some(_) => {}
    }
    if fm.tags.is_none() {
        findings.push(required("tags"));
    }

    findings
}
