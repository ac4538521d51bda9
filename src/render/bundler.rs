//! External bundler for the client app strategy.
//!
//! The staged app (see [`client_app`](super::client_app)) is plain ES modules
//! with JSX. Turning it into one browser script is delegated to a
//! [`Bundler`]; the default [`CommandBundler`] runs the configured command
//! (esbuild through `npx` out of the box) with the staging directory as its
//! working directory.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::config::BundlerConfig;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to start bundler `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("Bundler `{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Bundler finished but did not produce {0}")]
    MissingOutput(PathBuf),
}

pub trait Bundler: Sync {
    /// Bundle the app staged in `staging`, writing output into `dist`.
    fn bundle(&self, staging: &Path, dist: &Path) -> Result<(), BundleError>;
}

/// Runs an external program.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    command: String,
    args: Vec<String>,
}

impl CommandBundler {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &BundlerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    /// Arguments with `{staging}` and `{dist}` replaced.
    pub fn expanded_args(&self, staging: &Path, dist: &Path) -> Vec<String> {
        let staging = staging.display().to_string();
        let dist = dist.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{staging}", &staging).replace("{dist}", &dist))
            .collect()
    }
}

impl Bundler for CommandBundler {
    fn bundle(&self, staging: &Path, dist: &Path) -> Result<(), BundleError> {
        let args = self.expanded_args(staging, dist);
        tracing::info!(command = %self.command, ?args, "running bundler");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(staging)
            .output()
            .map_err(|source| BundleError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!(output = %stdout.trim(), "bundler stdout");
        }

        if !output.status.success() {
            return Err(BundleError::Failed {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
