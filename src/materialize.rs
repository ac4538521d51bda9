//! Destination tree preparation.
//!
//! Runs after the page tree is resolved and before any page is rendered:
//!
//! ```text
//! dist/                      ← removed and recreated
//! ├── guide/                 ← one directory per entry of the directory pool
//! └── assets/                ← copy of src/assets (or empty)
//!     ├── main.scss
//!     ├── main.css           ← compiled next to its source
//!     └── template/          ← copy of src/template/assets
//! ```
//!
//! Stylesheets are compiled in place, after copying, so `@import`s resolve
//! against the copied tree. Partials (names starting with `_`) are only
//! pulled in through imports.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::runtime::links::{ASSETS_DIR, TEMPLATE_ASSETS_DIR};
use crate::stylesheet::{self, COMPILED_EXTENSION, CompileError, StylesheetCompiler};

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> MaterializeError + '_ {
    move |source| MaterializeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Optional asset trees copied into the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetSources<'a> {
    /// Project assets (`src/assets`).
    pub assets: Option<&'a Path>,
    /// Template assets (`src/template/assets`).
    pub template_assets: Option<&'a Path>,
}

impl<'a> AssetSources<'a> {
    /// Keep only the trees that exist on disk.
    pub fn existing(assets: &'a Path, template_assets: &'a Path) -> Self {
        Self {
            assets: assets.is_dir().then_some(assets),
            template_assets: template_assets.is_dir().then_some(template_assets),
        }
    }
}

#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub directories_created: usize,
    pub files_copied: usize,
    /// Compiled stylesheets, relative to the destination root.
    pub stylesheets: Vec<PathBuf>,
}

/// Clear `dest_root` and lay out directories and assets.
pub fn materialize(
    dest_root: &Path,
    directories: &[String],
    sources: &AssetSources<'_>,
    compiler: &impl StylesheetCompiler,
) -> Result<MaterializeReport, MaterializeError> {
    let mut report = MaterializeReport::default();

    if dest_root.exists() {
        tracing::debug!(path = %dest_root.display(), "removing previous output");
        fs::remove_dir_all(dest_root).map_err(io_err(dest_root))?;
    }
    fs::create_dir_all(dest_root).map_err(io_err(dest_root))?;

    for directory in directories {
        let path = dest_root.join(directory);
        fs::create_dir_all(&path).map_err(io_err(&path))?;
        report.directories_created += 1;
    }

    let assets_dest = dest_root.join(ASSETS_DIR);
    if let Some(assets) = sources.assets {
        tracing::debug!(from = %assets.display(), "copying assets");
        report.files_copied += copy_tree(assets, &assets_dest)?;
    } else if sources.template_assets.is_some() {
        fs::create_dir_all(&assets_dest).map_err(io_err(&assets_dest))?;
    }
    if let Some(template_assets) = sources.template_assets {
        tracing::debug!(from = %template_assets.display(), "copying template assets");
        report.files_copied += copy_tree(template_assets, &assets_dest.join(TEMPLATE_ASSETS_DIR))?;
    }

    if assets_dest.is_dir() {
        for source in find_stylesheets(&assets_dest)? {
            let css = compiler.compile(&source)?;
            let target = source.with_extension(COMPILED_EXTENSION);
            fs::write(&target, css).map_err(io_err(&target))?;
            tracing::debug!(path = %target.display(), "compiled stylesheet");
            let relative = target.strip_prefix(dest_root).unwrap_or(&target);
            report.stylesheets.push(relative.to_path_buf());
        }
    }

    Ok(report)
}

/// Stylesheet sources under `root`, directories first, in name order.
fn find_stylesheets(root: &Path) -> Result<Vec<PathBuf>, MaterializeError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let is_partial = entry.file_name().to_string_lossy().starts_with('_');
        if entry.file_type().is_file() && !is_partial && stylesheet::is_stylesheet(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Recursively copy `from` into `to`, creating `to` as needed.
/// Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, MaterializeError> {
    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_err(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}
