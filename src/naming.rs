//! Path rules for page entries.
//!
//! Every page and directory under `src/pages` is identified by its path
//! relative to that root, always `/`-separated regardless of platform. From
//! that relative path this module derives:
//!
//! - the **raw name**: the entry name with its extension stripped
//!   (`guide/Intro.md` → `Intro`)
//! - the **key**: the relative path without extension (`guide/Intro`), used for
//!   name overrides and index detection
//! - the **output path**: where the page lives on the built site
//!
//! ## Output Paths
//!
//! | Source | Static HTML | Client App |
//! |--------|-------------|------------|
//! | `guide/Intro.md` | `/guide/intro.html` | `/guide/intro` |
//! | `about.html` | `/about.html` | `/about` |
//! | index page | `""` | `""` |
//!
//! Output paths are lower-cased. The index page always collapses to the empty
//! path so navigation can point at the site root.

use crate::types::Strategy;

/// Split an entry name into stem and extension (extension without the dot).
///
/// Only the last extension counts, and a leading dot does not start an
/// extension:
/// - `"intro.md"` → `("intro", Some("md"))`
/// - `"archive.tar.gz"` → `("archive.tar", Some("gz"))`
/// - `"README"` → `("README", None)`
/// - `".env"` → `(".env", None)`
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(pos) => (&name[..pos], Some(&name[pos + 1..])),
    }
}

/// Entry name with the extension stripped.
pub fn raw_name(name: &str) -> &str {
    split_extension(name).0
}

/// Extension of the last segment of a relative path, lower-cased.
pub fn extension_of(relative: &str) -> Option<String> {
    let file_name = relative.rsplit('/').next().unwrap_or(relative);
    split_extension(file_name).1.map(str::to_ascii_lowercase)
}

/// Join a parent relative path and an entry name with `/`.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Relative path without the extension of its last segment.
///
/// `"guide/Intro.md"` → `"guide/Intro"`
pub fn page_key(relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((parent, file)) => join_relative(parent, raw_name(file)),
        None => raw_name(relative).to_string(),
    }
}

/// Normalize a user-supplied key (`names` entries, `index`) for comparison
/// with [`page_key`] output: backslashes become `/`, and leading/trailing
/// slashes are dropped.
pub fn normalize_key(key: &str) -> String {
    key.replace('\\', "/").trim_matches('/').to_string()
}

/// Compute a page's output path.
///
/// Pure function of its inputs, so resolving an unchanged tree twice always
/// yields the same paths.
pub fn output_path(relative: &str, is_index: bool, strategy: Strategy) -> String {
    if is_index {
        return String::new();
    }
    format!("/{}{}", page_key(relative), strategy.page_extension()).to_lowercase()
}

/// Replace the extension of a relative path's last segment.
///
/// `replace_extension("guide/Intro.md", ".html")` → `"guide/Intro.html"`.
/// Case is preserved; this is used for files written to disk.
pub fn replace_extension(relative: &str, extension: &str) -> String {
    format!("{}{}", page_key(relative), extension)
}
