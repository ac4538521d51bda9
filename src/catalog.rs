//! Installable site templates.
//!
//! A template is whatever lives in `src/template`: layouts that pages extend,
//! an `assets/` tree copied to `dist/assets/template`, and an optional
//! `config.toml` merged under the project config. Templates come from two
//! places:
//!
//! - **Built-in**: embedded in the binary, installed by name (`basic`).
//! - **Repository**: anything that looks like a git URL is cloned.
//!
//! Installing always replaces the existing `src/template` directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Install location of a template, relative to the project root.
pub const TEMPLATE_DIR: &str = "src/template";

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unknown template '{name}'. Available: {available}")]
    Unknown { name: String, available: String },
    #[error("Failed to start git: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("git clone of {url} failed ({status}): {stderr}")]
    Clone {
        url: String,
        status: String,
        stderr: String,
    },
}

/// A template embedded in the binary.
#[derive(Debug)]
pub struct BuiltinTemplate {
    pub name: &'static str,
    pub description: &'static str,
    /// `(path relative to the template root, contents)`
    pub files: &'static [(&'static str, &'static str)],
}

const BUILTIN: &[BuiltinTemplate] = &[BuiltinTemplate {
    name: "basic",
    description: "Sidebar navigation, Sass stylesheet, code highlighting",
    files: &[
        ("config.toml", include_str!("../templates/basic/config.toml")),
        ("layout.html", include_str!("../templates/basic/layout.html")),
        ("assets/main.scss", include_str!("../templates/basic/assets/main.scss")),
    ],
}];

/// Built-in templates, in display order.
pub fn list() -> &'static [BuiltinTemplate] {
    BUILTIN
}

pub fn find(name: &str) -> Option<&'static BuiltinTemplate> {
    BUILTIN.iter().find(|t| t.name == name)
}

/// Whether an install argument names a repository rather than a built-in.
pub fn is_repository(source: &str) -> bool {
    source.contains("://") || source.starts_with("git@") || source.ends_with(".git")
}

/// Fetches a repository into a directory that does not exist yet.
pub trait Cloner {
    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), InstallError>;
}

/// Shells out to `git clone`.
#[derive(Debug, Default)]
pub struct GitCloner;

impl Cloner for GitCloner {
    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), InstallError> {
        tracing::info!(url, dest = %dest.display(), "cloning template");
        let output = Command::new("git")
            .arg("clone")
            .arg("--depth=1")
            .arg(url)
            .arg(dest)
            .output()
            .map_err(InstallError::Spawn)?;
        if !output.status.success() {
            return Err(InstallError::Clone {
                url: url.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// What [`install`] put in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    Builtin { name: String, files: usize },
    Repository { url: String },
}

/// Replace `src/template` with a built-in template or a cloned repository.
pub fn install(project_root: &Path, source: &str, cloner: &impl Cloner) -> Result<Installed, InstallError> {
    // Resolve before touching the filesystem so a typo keeps the old template.
    let builtin = if is_repository(source) {
        None
    } else {
        Some(find(source).ok_or_else(|| InstallError::Unknown {
            name: source.to_string(),
            available: BUILTIN.iter().map(|t| t.name).collect::<Vec<_>>().join(", "),
        })?)
    };

    let dest = project_root.join(TEMPLATE_DIR);
    if dest.exists() {
        tracing::debug!(path = %dest.display(), "removing existing template");
        fs::remove_dir_all(&dest).map_err(|source| InstallError::Io {
            path: dest.clone(),
            source,
        })?;
    }

    match builtin {
        Some(template) => {
            for (relative, contents) in template.files {
                let target = dest.join(relative);
                let io_err = |source| InstallError::Io {
                    path: target.clone(),
                    source,
                };
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(io_err)?;
                }
                fs::write(&target, contents).map_err(io_err)?;
            }
            tracing::info!(name = template.name, "installed built-in template");
            Ok(Installed::Builtin {
                name: template.name.to_string(),
                files: template.files.len(),
            })
        }
        None => {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|source| InstallError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            cloner.clone_into(source, &dest)?;
            Ok(Installed::Repository {
                url: source.to_string(),
            })
        }
    }
}
