use super::frontmatter::{self, ParsedFrontmatter, Spanned};
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wikilink pattern is valid"));
static MDLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]\(([^)]+)\)").expect("markdown link pattern is valid")
});

const FENCES: [&str; 2] = ["```", "~~~"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wikilink,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target: String,
    pub kind: LinkKind,
    pub line: usize,
}

/// One markdown file, parsed once and never mutated.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
    pub frontmatter: ParsedFrontmatter,
    pub links: Vec<Link>,
    pub tags: Vec<Spanned<String>>,
}

impl Document {
    pub fn parse(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let frontmatter = frontmatter::parse(&content);
        let links = extract_links(&content, frontmatter.body_start());
        let tags = frontmatter.frontmatter.tag_values().cloned().collect();

        Document {
            path: path.into(),
            content,
            frontmatter,
            links,
            tags,
        }
    }

    /// Path as it appears in reports.
    pub fn uri(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Filename without its extension.
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Links on lines `body_start..`, skipping fenced code blocks. A fence
/// closes only on the marker that opened it.
pub fn extract_links(content: &str, body_start: usize) -> Vec<Link> {
    let mut links = Vec::new();
    let mut fence: Option<&str> = None;

    for (i, line) in content.split('\n').enumerate() {
        let line_no = i + 1;
        if line_no < body_start {
            continue;
        }
        let trimmed = line.trim_start();
        let marker = FENCES.into_iter().find(|m| trimmed.starts_with(m));
        match (fence, marker) {
            (None, Some(m)) => {
                fence = Some(m);
                continue;
            }
            (Some(open), Some(m)) if open == m => {
                fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        for caps in WIKILINK_RE.captures_iter(line) {
            links.push(Link {
                target: caps[1].to_string(),
                kind: LinkKind::Wikilink,
                line: line_no,
            });
        }
        for caps in MDLINK_RE.captures_iter(line) {
            links.push(Link {
                target: caps[1].to_string(),
                kind: LinkKind::Markdown,
                line: line_no,
            });
        }
    }

    links
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    exclude: GlobSet,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            exclude: GlobSet::empty(),
        }
    }
}

impl LoadOptions {
    pub fn with_excludes<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|source| Error::Pattern {
            pattern: patterns.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", "),
            source,
        })?;
        Ok(LoadOptions { exclude })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let rel = path.strip_prefix(root).unwrap_or(path);
        self.exclude.is_match(rel)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(".md"))
        .unwrap_or(false)
}

/// Reads every `.md` file under `roots`, sorted by path.
///
/// Any traversal or read error aborts the load.
pub fn load<P: AsRef<Path>>(roots: &[P], opts: &LoadOptions) -> Result<Vec<Document>> {
    let mut docs = Vec::new();

    for root in roots {
        let root = root.as_ref();
        tracing::debug!("walking {}", root.display());

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| Error::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            if !is_markdown(path) {
                continue;
            }
            if opts.is_excluded(root, path) {
                tracing::debug!("excluded {}", path.display());
                continue;
            }

            let bytes = fs::read(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let content = String::from_utf8_lossy(&bytes).into_owned();
            let doc = Document::parse(path, content);
            tracing::debug!(
                "loaded {} ({} links, {} tags)",
                path.display(),
                doc.links.len(),
                doc.tags.len()
            );
            docs.push(doc);
        }
    }

    docs.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
    Ok(docs)
}
