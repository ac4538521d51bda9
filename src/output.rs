//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Pages are listed by their navigation identity (position and display name)
//! with the site path they render to; the source file follows as an indented
//! `Source:` line so output can be traced back to `src/pages`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Pages (static html)
//! 001 Getting Started (2 pages)
//!     001 Introduction → /guide/intro.html
//!         Source: guide/intro.md
//!     002 setup → /guide/setup.html
//!         Source: guide/setup.md
//! 002 Home → /
//!     Source: index.md
//! ```
//!
//! ## Build
//!
//! ```text
//! Output → docs
//!     1 directory, 4 files copied
//!     Stylesheet: assets/main.css
//! Rendered 3 pages (static html)
//!     guide/intro.html
//!     guide/setup.html
//!     index.html
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use std::collections::HashMap;

use crate::catalog::{BuiltinTemplate, Installed};
use crate::naming;
use crate::site::BuildReport;
use crate::tree::ResolvedTree;
use crate::types::{Strategy, TreeNode};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Format an entity header: positional index + title, with optional page count.
///
/// ```text
/// 001 Getting Started (2 pages)
/// 002 Home
/// ```
fn entity_header(index: usize, title: &str, pages: Option<usize>) -> String {
    match pages {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "page", "pages")),
        None => format!("{} {}", format_index(index), title),
    }
}

fn count_pages(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::Page(_) => 1,
            TreeNode::Directory(dir) => count_pages(&dir.children),
        })
        .sum()
}

// ============================================================================
// Check
// ============================================================================

/// Format the resolved page tree.
pub fn format_tree_output(resolved: &ResolvedTree, strategy: Strategy) -> Vec<String> {
    // Page key → source path relative to src/pages
    let sources: HashMap<String, &str> = resolved
        .pages
        .iter()
        .map(|page| (naming::page_key(&page.relative_path), page.relative_path.as_str()))
        .collect();

    let mut lines = vec![format!("Pages ({})", strategy.label())];
    format_nodes(&resolved.tree, "", 0, &sources, &mut lines);
    if resolved.tree.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines
}

fn format_nodes(
    nodes: &[TreeNode],
    parent_key: &str,
    depth: usize,
    sources: &HashMap<String, &str>,
    lines: &mut Vec<String>,
) {
    for (i, node) in nodes.iter().enumerate() {
        let key = naming::join_relative(parent_key, node.raw_name());
        let header = match node {
            TreeNode::Directory(dir) => entity_header(i + 1, &dir.display_name, Some(count_pages(&dir.children))),
            TreeNode::Page(page) => {
                let target = if page.output_path.is_empty() {
                    "/"
                } else {
                    page.output_path.as_str()
                };
                format!("{} → {}", entity_header(i + 1, &page.display_name, None), target)
            }
        };
        lines.push(format!("{}{}", indent(depth), header));

        match node {
            TreeNode::Directory(dir) => format_nodes(&dir.children, &key, depth + 1, sources, lines),
            TreeNode::Page(_) => {
                if let Some(source) = sources.get(&key) {
                    lines.push(format!("{}Source: {}", indent(depth + 1), source));
                }
            }
        }
    }
}

pub fn print_tree_output(resolved: &ResolvedTree, strategy: Strategy) {
    for line in format_tree_output(resolved, strategy) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the summary of a finished build.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    let materialized = &report.materialized;

    lines.push(format!("Output → {}", report.dist.display()));
    lines.push(format!(
        "{}{}, {} copied",
        indent(1),
        plural(materialized.directories_created, "directory", "directories"),
        plural(materialized.files_copied, "file", "files"),
    ));
    for stylesheet in &materialized.stylesheets {
        lines.push(format!("{}Stylesheet: {}", indent(1), stylesheet.display()));
    }

    let render = &report.render;
    let mut rendered = plural(render.pages_rendered, "page", "pages");
    if render.strategy == Strategy::ClientApp {
        rendered.push_str(&format!(", {}", plural(render.components, "component", "components")));
    }
    lines.push(format!("Rendered {} ({})", rendered, render.strategy.label()));
    for output in &render.outputs {
        lines.push(format!("{}{}", indent(1), output.display()));
    }
    lines
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Templates
// ============================================================================

pub fn format_templates(templates: &[BuiltinTemplate]) -> Vec<String> {
    let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let mut lines = vec!["Templates".to_string()];
    for (i, template) in templates.iter().enumerate() {
        lines.push(format!(
            "{} {:<width$}  {}",
            format_index(i + 1),
            template.name,
            template.description
        ));
    }
    lines.push(format!("{}Any git URL can be installed too.", indent(1)));
    lines
}

pub fn print_templates(templates: &[BuiltinTemplate]) {
    for line in format_templates(templates) {
        println!("{}", line);
    }
}

pub fn format_installed(installed: &Installed) -> String {
    match installed {
        Installed::Builtin { name, files } => {
            format!("Installed template '{}' ({})", name, plural(*files, "file", "files"))
        }
        Installed::Repository { url } => format!("Installed template from {}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::MaterializeReport;
    use crate::render::RenderReport;
    use crate::types::{DirectoryNode, PageNode, PageSource};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn page(display: &str, raw: &str, output: &str) -> TreeNode {
        TreeNode::Page(PageNode {
            display_name: display.to_string(),
            raw_name: raw.to_string(),
            output_path: output.to_string(),
        })
    }

    fn source(relative: &str) -> PageSource {
        PageSource {
            source_path: PathBuf::from("/p/src/pages").join(relative),
            relative_path: relative.to_string(),
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn entity_header_with_count() {
        assert_eq!(entity_header(1, "Guide", Some(1)), "001 Guide (1 page)");
        assert_eq!(entity_header(2, "Guide", Some(3)), "002 Guide (3 pages)");
        assert_eq!(entity_header(3, "Home", None), "003 Home");
    }

    #[test]
    fn tree_output_lists_pages_with_sources() {
        let resolved = ResolvedTree {
            tree: vec![
                TreeNode::Directory(DirectoryNode {
                    display_name: "Getting Started".into(),
                    raw_name: "guide".into(),
                    children: vec![page("Introduction", "intro", "/guide/intro.html")],
                }),
                page("Home", "index", ""),
            ],
            pages: vec![source("guide/intro.md"), source("index.md")],
            directories: vec!["guide".into()],
        };

        assert_eq!(
            format_tree_output(&resolved, Strategy::StaticHtml),
            vec![
                "Pages (static html)",
                "001 Getting Started (1 page)",
                "    001 Introduction → /guide/intro.html",
                "        Source: guide/intro.md",
                "002 Home → /",
                "    Source: index.md",
            ]
        );
    }

    #[test]
    fn empty_tree_says_none() {
        let resolved = ResolvedTree {
            tree: vec![],
            pages: vec![],
            directories: vec![],
        };
        assert_eq!(
            format_tree_output(&resolved, Strategy::ClientApp),
            vec!["Pages (client app)", "    (none)"]
        );
    }

    #[test]
    fn build_summary_for_client_app() {
        let report = BuildReport {
            dist: PathBuf::from("docs"),
            resolved: ResolvedTree {
                tree: vec![],
                pages: vec![],
                directories: vec![],
            },
            materialized: MaterializeReport {
                directories_created: 1,
                files_copied: 2,
                stylesheets: vec![PathBuf::from("assets/main.css")],
            },
            render: RenderReport {
                strategy: Strategy::ClientApp,
                pages_rendered: 2,
                components: 1,
                outputs: vec![PathBuf::from("bundle.js"), PathBuf::from("index.html")],
            },
        };

        assert_eq!(
            format_build_summary(&report),
            vec![
                "Output → docs",
                "    1 directory, 2 files copied",
                "    Stylesheet: assets/main.css",
                "Rendered 2 pages, 1 component (client app)",
                "    bundle.js",
                "    index.html",
            ]
        );
    }

    #[test]
    fn templates_are_numbered() {
        let lines = format_templates(crate::catalog::list());
        assert_eq!(lines[0], "Templates");
        assert!(lines[1].starts_with("001 basic"));
    }

    #[test]
    fn installed_message() {
        assert_eq!(
            format_installed(&Installed::Builtin {
                name: "basic".into(),
                files: 3
            }),
            "Installed template 'basic' (3 files)"
        );
        assert_eq!(
            format_installed(&Installed::Repository {
                url: "https://example.org/t.git".into()
            }),
            "Installed template from https://example.org/t.git"
        );
    }
}
