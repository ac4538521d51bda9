//! Shared types used across the build.
//!
//! The page tree is serialized into every template context (as `tree`) and
//! into the client app's data modules, so field names here are part of the
//! public template surface.

use serde::Serialize;
use std::path::PathBuf;

/// Output strategy for a build.
///
/// Selected once from the `react` config flag. Each variant carries the
/// extension used when rewriting page paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One pre-rendered `.html` file per page.
    StaticHtml,
    /// A single bundled application that renders pages per route.
    ClientApp,
}

impl Strategy {
    pub fn from_flag(react: bool) -> Self {
        if react {
            Strategy::ClientApp
        } else {
            Strategy::StaticHtml
        }
    }

    /// Extension (with leading dot) that replaces a page's source extension.
    pub fn page_extension(self) -> &'static str {
        match self {
            Strategy::StaticHtml => ".html",
            Strategy::ClientApp => "",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::StaticHtml => "static html",
            Strategy::ClientApp => "client app",
        }
    }
}

/// A leaf of the page tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    /// Label shown in navigation (name override or `raw_name`)
    pub display_name: String,
    /// Entry name with its extension stripped
    pub raw_name: String,
    /// Site path of the rendered page; empty for the index page
    pub output_path: String,
}

/// An interior node of the page tree (a directory under `src/pages`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub display_name: String,
    pub raw_name: String,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Page(PageNode),
    Directory(DirectoryNode),
}

impl TreeNode {
    pub fn raw_name(&self) -> &str {
        match self {
            TreeNode::Page(page) => &page.raw_name,
            TreeNode::Directory(dir) => &dir.raw_name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            TreeNode::Page(page) => &page.display_name,
            TreeNode::Directory(dir) => &dir.display_name,
        }
    }
}

/// A page source discovered during tree resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    /// Absolute path of the source file
    pub source_path: PathBuf,
    /// Path relative to `src/pages`, `/`-separated, extension kept
    pub relative_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_from_flag() {
        assert_eq!(Strategy::from_flag(false), Strategy::StaticHtml);
        assert_eq!(Strategy::from_flag(true), Strategy::ClientApp);
    }

    #[test]
    fn page_extension_per_strategy() {
        assert_eq!(Strategy::StaticHtml.page_extension(), ".html");
        assert_eq!(Strategy::ClientApp.page_extension(), "");
    }

    #[test]
    fn tree_serializes_without_tags() {
        let tree = vec![
            TreeNode::Page(PageNode {
                display_name: "Home".to_string(),
                raw_name: "index".to_string(),
                output_path: String::new(),
            }),
            TreeNode::Directory(DirectoryNode {
                display_name: "guide".to_string(),
                raw_name: "guide".to_string(),
                children: vec![],
            }),
        ];
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["display_name"], "Home");
        assert_eq!(json[0]["output_path"], "");
        assert!(json[1]["children"].is_array());
        assert!(json[1].get("output_path").is_none());
    }
}
