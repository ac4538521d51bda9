//! Stylesheet compilation backend.
//!
//! The [`StylesheetCompiler`] trait is the single operation the materializer
//! needs: turn a `.scss` / `.sass` file into CSS text. The production
//! implementation is [`GrassCompiler`], a pure-Rust Sass compiler, so no
//! Node or Dart runtime is needed on the build machine.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source extensions handled by the compiler (lower-case, without the dot).
pub const STYLESHEET_EXTENSIONS: &[&str] = &["scss", "sass"];

/// Extension of the compiled output.
pub const COMPILED_EXTENSION: &str = "css";

#[derive(Error, Debug)]
#[error("Failed to compile stylesheet {path}: {message}")]
pub struct CompileError {
    pub path: PathBuf,
    pub message: String,
}

pub trait StylesheetCompiler: Sync {
    /// Compile the stylesheet at `path`, returning CSS.
    fn compile(&self, path: &Path) -> Result<String, CompileError>;
}

/// Whether a path is a stylesheet source the compiler handles.
pub fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| STYLESHEET_EXTENSIONS.contains(&e.as_str()))
}

/// Sass compiler backed by the `grass` crate, expanded output.
///
/// Syntax (SCSS or indented Sass) is picked from the file extension. Imports
/// resolve relative to the stylesheet's own directory.
#[derive(Debug, Default)]
pub struct GrassCompiler;

impl GrassCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl StylesheetCompiler for GrassCompiler {
    fn compile(&self, path: &Path) -> Result<String, CompileError> {
        let options = grass::Options::default().style(grass::OutputStyle::Expanded);
        grass::from_path(path, &options).map_err(|e| CompileError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
