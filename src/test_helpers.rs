//! Shared test utilities for the genysite test suite.
//!
//! Provides a project builder that lays out a throwaway `src/` tree, tree
//! lookups, and navigation shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = ProjectBuilder::new()
//!     .page("index.md", "# Home")
//!     .page("guide/intro.md", "# Intro")
//!     .build();
//! let resolved = tree::resolve(&project.pages_dir(), &config).unwrap();
//!
//! assert_tree_shape(&resolved.tree, &[
//!     ("guide", &["intro"]),
//!     ("index", &[]),
//! ]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::types::{PageNode, TreeNode};

// =========================================================================
// Project setup
// =========================================================================

/// Builder for a temporary project directory.
///
/// Paths given to [`page`](Self::page) are relative to `src/pages`; paths
/// given to [`file`](Self::file) and [`dir`](Self::dir) are relative to `src`.
#[derive(Default)]
pub struct ProjectBuilder {
    files: Vec<(String, String)>,
    dirs: Vec<String>,
    config: Option<String>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, relative: &str, content: &str) -> Self {
        self.files
            .push((format!("pages/{relative}"), content.to_string()));
        self
    }

    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.files.push((relative.to_string(), content.to_string()));
        self
    }

    pub fn dir(mut self, relative: &str) -> Self {
        self.dirs.push(relative.to_string());
        self
    }

    /// Contents of `genysite.toml`.
    pub fn config(mut self, toml: &str) -> Self {
        self.config = Some(toml.to_string());
        self
    }

    pub fn build(self) -> TestProject {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("pages")).unwrap();

        for dir in &self.dirs {
            std::fs::create_dir_all(src.join(dir)).unwrap();
        }
        for (relative, content) in &self.files {
            let path = src.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        if let Some(config) = &self.config {
            std::fs::write(tmp.path().join(crate::config::CONFIG_FILE), config).unwrap();
        }

        TestProject { tmp }
    }
}

/// A project laid out in a temporary directory, removed on drop.
pub struct TestProject {
    tmp: TempDir,
}

impl TestProject {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.src_dir().join("pages")
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.root().join(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
    }
}

// =========================================================================
// Tree lookups (panic with the available names on miss)
// =========================================================================

/// Find a page by its raw-name path (`"guide/intro"`). Panics if not found.
pub fn find_page<'a>(tree: &'a [TreeNode], path: &str) -> &'a PageNode {
    let mut nodes = tree;
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        let node = nodes
            .iter()
            .find(|n| n.raw_name() == segment)
            .unwrap_or_else(|| {
                let names: Vec<&str> = nodes.iter().map(|n| n.raw_name()).collect();
                panic!("'{segment}' of '{path}' not found. Available: {names:?}")
            });
        match (node, segments.peek()) {
            (TreeNode::Page(page), None) => return page,
            (TreeNode::Directory(dir), Some(_)) => nodes = &dir.children,
            _ => panic!("'{path}' does not resolve to a page"),
        }
    }
    panic!("empty page path")
}

/// Raw names of the root siblings, in order.
pub fn root_names(tree: &[TreeNode]) -> Vec<&str> {
    tree.iter().map(|n| n.raw_name()).collect()
}

/// Assert that the root siblings and their direct children match.
///
/// Each entry is `(raw_name, children)`. Use `&[]` for pages and empty
/// directories.
pub fn assert_tree_shape(tree: &[TreeNode], expected: &[(&str, &[&str])]) {
    let expected_names: Vec<&str> = expected.iter().map(|(n, _)| *n).collect();
    assert_eq!(root_names(tree), expected_names, "root siblings mismatch");

    for ((name, children), node) in expected.iter().zip(tree) {
        let actual: Vec<&str> = match node {
            TreeNode::Page(_) => Vec::new(),
            TreeNode::Directory(dir) => root_names(&dir.children),
        };
        assert_eq!(actual, children.to_vec(), "children of '{name}' mismatch");
    }
}
