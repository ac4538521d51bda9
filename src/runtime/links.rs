//! Homepage-relative URL resolution for the `link` and `assets` filters.
//!
//! The configured homepage is either an absolute URL or a plain path:
//!
//! | homepage | `link("guide/intro.html")` |
//! |----------|----------------------------|
//! | `https://example.org/site` | `https://example.org/site/guide/intro.html` |
//! | `/site` | `/site/guide/intro.html` |
//! | `""` | `guide/intro.html` |
//!
//! A URL homepage is always treated as a directory, so its last segment is
//! never replaced by the joined path. Leading slashes on the argument are
//! dropped so results stay under the homepage.

use url::Url;

/// Directory under the output root holding copied assets.
pub const ASSETS_DIR: &str = "assets";

/// Subdirectory of [`ASSETS_DIR`] holding the template's own assets.
pub const TEMPLATE_ASSETS_DIR: &str = "template";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkBase {
    /// Absolute URL, path guaranteed to end with `/`.
    Url(Url),
    /// Plain path prefix, possibly empty.
    Path(String),
}

impl LinkBase {
    pub fn parse(homepage: &str) -> Self {
        match Url::parse(homepage) {
            Ok(mut url) if !url.cannot_be_a_base() => {
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                LinkBase::Url(url)
            }
            _ => LinkBase::Path(homepage.to_string()),
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, LinkBase::Url(_))
    }

    /// Resolve a site path against the homepage.
    pub fn join(&self, path: &str) -> Result<String, url::ParseError> {
        let path = path.trim_start_matches('/');
        match self {
            LinkBase::Url(base) => base.join(path).map(String::from),
            LinkBase::Path(base) if base.is_empty() => Ok(path.to_string()),
            LinkBase::Path(base) => Ok(format!("{}/{}", base.trim_end_matches('/'), path)),
        }
    }

    /// Resolve an asset path, under `assets/template/` when `template` is set.
    pub fn asset(&self, path: &str, template: bool) -> Result<String, url::ParseError> {
        let path = path.trim_start_matches('/');
        let full = if template {
            format!("{ASSETS_DIR}/{TEMPLATE_ASSETS_DIR}/{path}")
        } else {
            format!("{ASSETS_DIR}/{path}")
        };
        self.join(&full)
    }
}
