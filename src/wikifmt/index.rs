//! Slug index over the loaded documents, and link resolution against it.

use super::document::{file_stem, Document, LinkKind};
use crate::report::{Finding, Rule};
use ahash::{AHashMap, AHashSet};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static DASH_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("dash pattern is valid"));

const URL_SCHEMES: [&str; 3] = ["mailto:", "tel:", "data:"];

/// Lowercase, spaces and underscores to hyphens, hyphen runs collapsed.
pub fn slugify(s: &str) -> String {
    let s = s.trim().to_lowercase().replace([' ', '_'], "-");
    DASH_RUN_RE.replace_all(&s, "-").into_owned()
}

/// Maps lowercased and slugified filename stems to document paths.
/// Rebuilt every run; documents inserted later win on key collisions.
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: AHashMap<String, PathBuf>,
    paths: Vec<PathBuf>,
}

impl Index {
    pub fn build(docs: &[Document]) -> Self {
        let mut entries = AHashMap::with_capacity(docs.len() * 2);
        let mut paths = Vec::with_capacity(docs.len());
        let mut seen = AHashSet::with_capacity(docs.len());
        for doc in docs {
            let stem = doc.stem();
            entries.insert(stem.to_lowercase(), doc.path.clone());
            entries.insert(slugify(&stem), doc.path.clone());
            if seen.insert(doc.path.as_path()) {
                paths.push(doc.path.clone());
            }
        }
        tracing::debug!(
            "index built: {} keys for {} documents",
            entries.len(),
            docs.len()
        );
        Index { entries, paths }
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Each indexed document path once, in load order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `Target|Alias` and `Target#Heading` both resolve `Target`.
fn wikilink_page(target: &str) -> &str {
    let page = target.split('|').next().unwrap_or(target);
    page.split('#').next().unwrap_or(page).trim()
}

fn lookup(index: &Index, name: &str) -> bool {
    !name.is_empty() && (index.contains(&slugify(name)) || index.contains(&name.to_lowercase()))
}

/// Tries the whole target first, so page names containing `#` or `|`
/// still resolve, then the page part alone.
pub fn resolve_wikilink(target: &str, index: &Index) -> bool {
    let target = target.trim();
    if lookup(index, target) {
        return true;
    }
    let page = wikilink_page(target);
    page != target && lookup(index, page)
}

/// True for targets this resolver never looks at: URLs and in-page anchors.
pub fn is_external(target: &str) -> bool {
    let target = target.trim();
    if target.starts_with('#') || target.contains("://") {
        return true;
    }
    let lower = target.to_lowercase();
    URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Strips `<...>` wrapping, a trailing `"title"`, and any `#fragment` or `?query`.
pub fn link_path(target: &str) -> &str {
    let mut t = target.trim();
    if let Some(inner) = t.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        t = inner;
    } else if let Some((path, title)) = t.split_once(char::is_whitespace) {
        if title.trim_start().starts_with('"') {
            t = path;
        }
    }
    let end = t.find(['#', '?']).unwrap_or(t.len());
    &t[..end]
}

pub fn resolve_markdown_link(current: &Path, target: &str, index: &Index) -> bool {
    if target.is_empty() {
        return false;
    }
    let cleaned = target.strip_prefix('/').unwrap_or(target);
    let dir = current.parent().unwrap_or(Path::new(""));
    let resolved = clean_path(&dir.join(cleaned));

    let stem = file_stem(&resolved);
    if index.contains(&stem.to_lowercase()) || index.contains(&slugify(&stem)) {
        return true;
    }

    resolved.to_string_lossy().ends_with(".md") && same_file_indexed(&resolved, index)
}

/// Whether `path` names the same file as any indexed document, comparing
/// cleaned absolute paths.
///
/// Identical files share a stem, so the stem keys normally answer first.
pub fn same_file_indexed(path: &Path, index: &Index) -> bool {
    let Ok(cwd) = std::env::current_dir() else {
        return false;
    };
    let target = absolute(&cwd, path);
    index.paths().any(|p| absolute(&cwd, p) == target)
}

/// Lexical cleanup: drops `.`, folds `..` into its parent where possible.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&cwd.join(path))
    }
}

/// Broken-link findings for one document, in link order.
pub fn check_links(doc: &Document, index: &Index) -> Vec<Finding> {
    let uri = doc.uri();
    let mut findings = Vec::new();

    for link in &doc.links {
        match link.kind {
            LinkKind::Wikilink => {
                if link.target.trim_start().starts_with('#') {
                    continue;
                }
                if !resolve_wikilink(&link.target, index) {
                    findings.push(Finding::new(
                        Rule::LinkBroken,
                        format!("broken wikilink [[{}]]", link.target),
                        &uri,
                        link.line,
                    ));
                }
            }
            LinkKind::Markdown => {
                if is_external(&link.target) {
                    continue;
                }
                if !resolve_markdown_link(&doc.path, link_path(&link.target), index) {
                    findings.push(Finding::new(
                        Rule::LinkBroken,
                        format!("broken markdown link {}", link.target),
                        &uri,
                        link.line,
                    ));
                }
            }
        }
    }

    findings
}
