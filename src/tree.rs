//! Page tree resolution.
//!
//! Walks `src/pages` and turns the filesystem layout into the navigation tree
//! every template receives, plus two flat pools consumed by later stages:
//!
//! ```text
//! src/pages/                        tree                      pools
//! ├── index.md          →   index      ("")                pages: index.md
//! ├── guide/            →   guide/                         dirs:  guide
//! │   ├── intro.md      →     intro    (/guide/intro.html) pages: guide/intro.md
//! │   └── setup.md      →     setup    (/guide/setup.html) pages: guide/setup.md
//! └── about.html        →   about      (/about.html)       pages: about.html
//! ```
//!
//! ## Ordering
//!
//! Siblings are ordered by [`compare_siblings`]: names in the configured
//! priority list come first, in list order, then everything else
//! alphabetically. Directories and pages are sorted together. Without a
//! priority list the order is purely alphabetical.
//!
//! ## Index Page
//!
//! The page whose path without extension equals the configured `index` gets an
//! empty output path. At most one page may match.
//!
//! Hidden entries (names starting with `.`) are skipped. Sibling pages whose
//! raw names differ only by extension or case would write the same output
//! and are rejected.

use crate::config::SiteConfig;
use crate::naming;
use crate::types::{DirectoryNode, PageNode, PageSource, Strategy, TreeNode};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Content directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Index \"{index}\" matches both {first} and {second}")]
    AmbiguousIndex {
        index: String,
        first: String,
        second: String,
    },
    #[error("Pages {first} and {second} render to the same output")]
    DuplicateName { first: String, second: String },
}

/// Result of resolving the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTree {
    /// Ordered navigation tree
    pub tree: Vec<TreeNode>,
    /// Every page discovered, in traversal order
    pub pages: Vec<PageSource>,
    /// Every directory discovered, relative to the content root, parents first
    pub directories: Vec<String>,
}

impl ResolvedTree {
    /// Whether some page in the tree collapsed to the site root.
    pub fn has_index(&self) -> bool {
        fn walk(nodes: &[TreeNode]) -> bool {
            nodes.iter().any(|node| match node {
                TreeNode::Page(page) => page.output_path.is_empty(),
                TreeNode::Directory(dir) => walk(&dir.children),
            })
        }
        walk(&self.tree)
    }
}

/// Rank of a name in the priority list.
///
/// The list is reversed and the name's position in the reversed list is its
/// rank, `-1` when absent. A higher rank sorts first, so earlier entries in
/// the original list win; if a name is listed twice its last occurrence
/// counts.
pub fn priority_rank(priority: &[String], name: &str) -> isize {
    priority
        .iter()
        .rev()
        .position(|p| p == name)
        .map_or(-1, |pos| pos as isize)
}

/// Compare two sibling raw names: priority rank first, then lexically.
pub fn compare_siblings(priority: &[String], a: &str, b: &str) -> Ordering {
    let a_rank = priority_rank(priority, a);
    let b_rank = priority_rank(priority, b);
    b_rank.cmp(&a_rank).then_with(|| a.cmp(b))
}

/// Resolve the page tree under `content_root`.
///
/// Fails with [`TreeError::NotFound`] before touching anything else if the
/// root does not exist.
pub fn resolve(content_root: &Path, config: &SiteConfig) -> Result<ResolvedTree, TreeError> {
    if !content_root.is_dir() {
        return Err(TreeError::NotFound(content_root.to_path_buf()));
    }

    let mut resolver = Resolver {
        config,
        strategy: config.strategy(),
        index: naming::normalize_key(&config.index),
        index_source: None,
        names: config.display_names(),
        pages: Vec::new(),
        directories: Vec::new(),
    };
    let tree = resolver.resolve_directory(content_root, "")?;

    tracing::debug!(
        pages = resolver.pages.len(),
        directories = resolver.directories.len(),
        "page tree resolved"
    );

    Ok(ResolvedTree {
        tree,
        pages: resolver.pages,
        directories: resolver.directories,
    })
}

struct Resolver<'a> {
    config: &'a SiteConfig,
    strategy: Strategy,
    index: String,
    index_source: Option<String>,
    names: BTreeMap<String, &'a str>,
    pages: Vec<PageSource>,
    directories: Vec<String>,
}

impl Resolver<'_> {
    fn resolve_directory(&mut self, dir: &Path, relative: &str) -> Result<Vec<TreeNode>, TreeError> {
        let mut nodes = Vec::new();
        // Output file name (lower-cased raw name) → first page claiming it
        let mut claimed: HashMap<String, String> = HashMap::new();

        for (name, path) in collect_entries(dir)? {
            let entry_relative = naming::join_relative(relative, &name);

            if path.is_dir() {
                self.directories.push(entry_relative.clone());
                let children = self.resolve_directory(&path, &entry_relative)?;
                nodes.push(TreeNode::Directory(DirectoryNode {
                    display_name: self.display_name(&entry_relative, &name),
                    raw_name: name,
                    children,
                }));
            } else {
                let page = self.resolve_page(path, &name, entry_relative.clone())?;
                let output_name = page.raw_name.to_lowercase();
                if let Some(first) = claimed.insert(output_name, entry_relative.clone()) {
                    return Err(TreeError::DuplicateName {
                        first,
                        second: entry_relative,
                    });
                }
                nodes.push(TreeNode::Page(page));
            }
        }

        let priority = self.config.priority();
        nodes.sort_by(|a, b| compare_siblings(priority, a.raw_name(), b.raw_name()));
        Ok(nodes)
    }

    fn resolve_page(&mut self, path: PathBuf, name: &str, relative: String) -> Result<PageNode, TreeError> {
        let key = naming::page_key(&relative);
        let is_index = key == self.index;

        if is_index {
            if let Some(first) = &self.index_source {
                return Err(TreeError::AmbiguousIndex {
                    index: self.index.clone(),
                    first: first.clone(),
                    second: relative,
                });
            }
            self.index_source = Some(relative.clone());
        }

        let raw_name = naming::raw_name(name).to_string();
        let node = PageNode {
            display_name: self.display_name(&key, &raw_name),
            output_path: naming::output_path(&relative, is_index, self.strategy),
            raw_name,
        };

        self.pages.push(PageSource {
            source_path: path,
            relative_path: relative,
        });
        Ok(node)
    }

    fn display_name(&self, key: &str, raw_name: &str) -> String {
        self.names.get(key).copied().unwrap_or(raw_name).to_string()
    }
}

/// Directory entries as `(name, path)`, hidden entries skipped, sorted by name
/// so traversal order does not depend on the platform.
fn collect_entries(path: &Path) -> Result<Vec<(String, PathBuf)>, TreeError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        entries.push((name, entry.path()));
    }
    entries.sort();
    Ok(entries)
}
