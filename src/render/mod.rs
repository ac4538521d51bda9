//! Render dispatch.
//!
//! Both strategies consume the same inputs, bundled in [`RenderContext`]:
//! the resolved page tree, the template runtime, and the template data
//! (`config.data` plus `tree`).
//!
//! ```text
//!                    ┌── StaticHtml ─→ dist/<page>.html (one file per page)
//! RenderContext ─────┤
//!                    └── ClientApp ──→ staging dir ─→ Bundler ─→ dist/index.html
//!                                                                 dist/bundle.js
//! ```
//!
//! Pages render on the rayon pool. The first failure stops the batch and is
//! returned; files already written stay in place.

pub mod bundler;
pub mod client_app;
pub mod static_html;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::markdown;
use crate::materialize::MaterializeError;
use crate::naming;
use crate::runtime::TemplateRuntime;
use crate::tree::ResolvedTree;
use crate::types::{PageSource, Strategy, TreeNode};
use bundler::{BundleError, Bundler};

/// Template directory holding the page sources, relative to `src`.
pub const PAGES_DIR: &str = "pages";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render {path}: {source}")]
    Template {
        path: String,
        source: minijinja::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error("Failed to stage {path}: {source}")]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Copy(#[from] MaterializeError),
}

/// Everything a strategy needs to produce output.
pub struct RenderContext<'a> {
    pub runtime: &'a TemplateRuntime,
    pub config: &'a SiteConfig,
    pub resolved: &'a ResolvedTree,
    /// Template context shared by every page.
    pub data: &'a serde_json::Value,
    /// Destination root, already materialized.
    pub dist: &'a Path,
}

/// Paths the client app strategy stages from and into.
#[derive(Debug, Clone, Copy)]
pub struct ClientPaths<'a> {
    /// Project root; the `App` override resolves against it.
    pub project_root: &'a Path,
    /// Parent of the per-build staging directory.
    pub staging_root: &'a Path,
    /// `src/libs`, when present.
    pub libs: Option<&'a Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub strategy: Strategy,
    /// Pages rendered through the template engine.
    pub pages_rendered: usize,
    /// Component pages handed to the bundler as-is.
    pub components: usize,
    /// Files written into the destination, relative to it, sorted.
    pub outputs: Vec<PathBuf>,
}

/// Build the template context: `config.data` with `tree` added.
///
/// `tree` replaces any user value of the same name.
pub fn template_data(config: &SiteConfig, tree: &[TreeNode]) -> Result<serde_json::Value, serde_json::Error> {
    let mut data = match serde_json::to_value(&config.data)? {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    data.insert("tree".to_string(), serde_json::to_value(tree)?);
    Ok(serde_json::Value::Object(data))
}

/// Template name of a page source.
pub fn page_template(page: &PageSource) -> String {
    format!("{PAGES_DIR}/{}", page.relative_path)
}

/// Render one page, converting markdown sources to HTML afterwards.
pub fn render_page(
    runtime: &TemplateRuntime,
    page: &PageSource,
    data: &serde_json::Value,
) -> Result<String, RenderError> {
    let name = page_template(page);
    let rendered = runtime
        .render(&name, data)
        .map_err(|source| RenderError::Template {
            path: page.relative_path.clone(),
            source,
        })?;

    let extension = naming::extension_of(&page.relative_path);
    if markdown::is_markdown_extension(extension.as_deref()) {
        Ok(markdown::to_html(&rendered))
    } else {
        Ok(rendered)
    }
}

/// Run the strategy selected by the config.
pub fn dispatch(
    ctx: &RenderContext<'_>,
    client: ClientPaths<'_>,
    bundler: &impl Bundler,
) -> Result<RenderReport, DispatchError> {
    let strategy = ctx.config.strategy();
    tracing::info!(strategy = strategy.label(), pages = ctx.resolved.pages.len(), "rendering");

    match strategy {
        Strategy::StaticHtml => {
            let outputs = static_html::render_all(ctx)?;
            Ok(RenderReport {
                strategy,
                pages_rendered: outputs.len(),
                components: 0,
                outputs,
            })
        }
        Strategy::ClientApp => {
            let built = client_app::build(ctx, client, bundler)?;
            Ok(RenderReport {
                strategy,
                pages_rendered: built.pages,
                components: built.components,
                outputs: built.outputs,
            })
        }
    }
}
