//! Client-rendered app output.
//!
//! Content pages are rendered up front and shipped as data; component pages
//! (`.js`, `.jsx`, `.ts`, `.tsx`) are shipped as code. Everything is staged in
//! a per-build directory, bundled, and the staging directory is removed:
//!
//! ```text
//! <temp>/<uuid>/
//! ├── pageData.js        export default [{path, content, route}, ...]
//! ├── components.js      imports + [{component, route}, ...]
//! ├── components/…       component pages, copied verbatim
//! ├── config.js          export default <merged config>
//! ├── templateData.js    export default <template data>
//! ├── App.js             routing shell (built-in or `App` override)
//! ├── app_index.js       entry point
//! ├── utils.js           link/assets helpers
//! ├── libs/…             copy of src/libs
//! └── index.html         shell
//!
//! dist/
//! ├── bundle.js          written by the bundler
//! └── index.html         shell, with the bundle script injected if missing
//! ```
//!
//! Routes are the lower-cased page path without extension; the index page
//! routes to `/`.

use maud::{DOCTYPE, html};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::bundler::{BundleError, Bundler};
use super::{ClientPaths, DispatchError, RenderContext, RenderError, render_page};
use crate::config::SiteConfig;
use crate::materialize;
use crate::naming;
use crate::types::{PageSource, Strategy};

/// Page extensions shipped as components rather than rendered.
pub const COMPONENT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const BASE_APP: &str = include_str!("../../static/client/BaseApp.js");
const APP_INDEX: &str = include_str!("../../static/client/app_index.js");
const UTILS: &str = include_str!("../../static/client/utils.js");

const DEFAULT_TITLE: &str = "genysite";
const SHELL_FILE: &str = "index.html";
const COMPONENTS_DIR: &str = "components";
const LIBS_DIR: &str = "libs";

pub fn is_component(relative: &str) -> bool {
    naming::extension_of(relative).is_some_and(|e| COMPONENT_EXTENSIONS.contains(&e.as_str()))
}

/// Client route of a page: `/` for the index, else its lower-cased path
/// without extension.
pub fn route_for(relative: &str, index_key: &str) -> String {
    if naming::page_key(relative) == index_key {
        "/".to_string()
    } else {
        naming::output_path(relative, false, Strategy::ClientApp)
    }
}

#[derive(Debug, Serialize)]
struct PageEntry {
    /// Source path without extension, case kept.
    path: String,
    content: String,
    route: String,
}

#[derive(Debug)]
struct ComponentEntry {
    import: String,
    route: String,
}

/// Outcome of a client app build.
#[derive(Debug)]
pub struct ClientBuild {
    pub pages: usize,
    pub components: usize,
    /// Files written into `dist`, relative to it.
    pub outputs: Vec<PathBuf>,
}

/// Per-build staging directory, removed on drop.
struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    fn create(root: &Path) -> Result<Self, DispatchError> {
        let path = root.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&path).map_err(|source| DispatchError::Stage {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "created staging directory");
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, relative: &str, contents: &str) -> Result<(), DispatchError> {
        let target = self.path.join(relative);
        let stage_err = |source| DispatchError::Stage {
            path: target.clone(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(stage_err)?;
        }
        fs::write(&target, contents).map_err(stage_err)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove staging directory");
            return;
        }
        // The shared root goes too once no other build is using it.
        if let Some(root) = self.path.parent() {
            let _ = fs::remove_dir(root);
        }
        tracing::debug!(path = %self.path.display(), "removed staging directory");
    }
}

fn es_module<T: Serialize + ?Sized>(what: &'static str, value: &T) -> Result<String, DispatchError> {
    let json = serde_json::to_string(value).map_err(|source| DispatchError::Serialize { what, source })?;
    Ok(format!("export default {json};\n"))
}

fn components_module(components: &[ComponentEntry]) -> Result<String, DispatchError> {
    let mut imports = String::new();
    let mut entries = String::new();
    for (i, component) in components.iter().enumerate() {
        let import = serde_json::to_string(&component.import)
            .map_err(|source| DispatchError::Serialize { what: "components", source })?;
        let route = serde_json::to_string(&component.route)
            .map_err(|source| DispatchError::Serialize { what: "components", source })?;
        imports.push_str(&format!("import Component{i} from {import};\n"));
        entries.push_str(&format!("  {{ component: Component{i}, route: {route} }},\n"));
    }
    Ok(format!("{imports}\nexport default [\n{entries}];\n"))
}

/// Built-in shell: an empty root element and the bundle script.
fn default_shell(title: &str, bundle_src: &str) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                div #root {}
                script src=(bundle_src) {}
            }
        }
    }
    .into_string()
}

/// Add the bundle script to a shell that does not reference the bundle.
fn inject_bundle(shell: &str, bundle_file: &str, bundle_src: &str) -> String {
    if shell.contains(bundle_file) {
        return shell.to_string();
    }
    let tag = html! { script src=(bundle_src) {} }.into_string();
    match shell.to_ascii_lowercase().rfind("</body>") {
        Some(pos) => format!("{}{}\n{}", &shell[..pos], tag, &shell[pos..]),
        None => format!("{shell}\n{tag}\n"),
    }
}

/// Stage, bundle, and write the shell into `dist`.
pub fn build(
    ctx: &RenderContext<'_>,
    paths: ClientPaths<'_>,
    bundler: &impl Bundler,
) -> Result<ClientBuild, DispatchError> {
    let config = ctx.config;
    let index_key = naming::normalize_key(&config.index);
    let staging = StagingDir::create(paths.staging_root)?;

    let (components, content): (Vec<&PageSource>, Vec<&PageSource>) = ctx
        .resolved
        .pages
        .iter()
        .partition(|page| is_component(&page.relative_path));

    // Content pages
    let mut pages = content
        .par_iter()
        .map(|page| -> Result<PageEntry, RenderError> {
            Ok(PageEntry {
                path: format!("/{}", naming::page_key(&page.relative_path)),
                content: render_page(ctx.runtime, page, ctx.data)?,
                route: route_for(&page.relative_path, &index_key),
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;
    pages.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = pages.len(), "rendered content pages");

    // Component pages
    let mut entries = Vec::with_capacity(components.len());
    for page in &components {
        let relative = format!("{COMPONENTS_DIR}/{}", page.relative_path);
        let target = staging.path().join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| DispatchError::Stage {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(&page.source_path, &target).map_err(|source| DispatchError::Stage {
            path: target.clone(),
            source,
        })?;
        entries.push(ComponentEntry {
            import: format!("./{relative}"),
            route: route_for(&page.relative_path, &index_key),
        });
    }
    entries.sort_by(|a, b| a.route.cmp(&b.route));
    tracing::debug!(count = entries.len(), "staged component pages");

    // Data modules
    staging.write("pageData.js", &es_module("page data", &pages)?)?;
    staging.write("components.js", &components_module(&entries)?)?;
    let staged_config = SiteConfig {
        index: index_key.clone(),
        ..config.clone()
    };
    staging.write("config.js", &es_module("config", &staged_config)?)?;
    staging.write("templateData.js", &es_module("template data", ctx.data)?)?;

    // Code
    let app = match &config.app {
        Some(app) => {
            let path = paths.project_root.join(app);
            tracing::debug!(path = %path.display(), "using custom App");
            fs::read_to_string(&path).map_err(|source| DispatchError::Stage { path, source })?
        }
        None => BASE_APP.to_string(),
    };
    staging.write("App.js", &app)?;
    staging.write("app_index.js", APP_INDEX)?;
    staging.write("utils.js", UTILS)?;
    if let Some(libs) = paths.libs {
        materialize::copy_tree(libs, &staging.path().join(LIBS_DIR))?;
    }

    // Shell
    let bundle_file = config.bundler.output.as_str();
    let bundle_src = ctx
        .runtime
        .links()
        .join(bundle_file)
        .unwrap_or_else(|_| bundle_file.to_string());
    let shell = match &config.index_html {
        Some(name) => ctx
            .runtime
            .render(name, ctx.data)
            .map_err(|source| RenderError::Template {
                path: name.clone(),
                source,
            })?,
        None => {
            let title = ctx
                .data
                .get("title")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(DEFAULT_TITLE);
            default_shell(title, &bundle_src)
        }
    };
    staging.write(SHELL_FILE, &shell)?;

    bundler.bundle(staging.path(), ctx.dist)?;
    let bundle_path = ctx.dist.join(bundle_file);
    if !bundle_path.is_file() {
        return Err(BundleError::MissingOutput(bundle_path).into());
    }

    let shell_target = ctx.dist.join(SHELL_FILE);
    fs::write(&shell_target, inject_bundle(&shell, bundle_file, &bundle_src)).map_err(|source| {
        RenderError::Io {
            path: shell_target.clone(),
            source,
        }
    })?;

    let mut outputs = vec![PathBuf::from(bundle_file), PathBuf::from(SHELL_FILE)];
    outputs.sort();
    Ok(ClientBuild {
        pages: pages.len(),
        components: entries.len(),
        outputs,
    })
}
