//! One build, end to end.
//!
//! ```text
//! load_config ─→ TemplateRuntime ─→ tree::resolve ─→ materialize ─→ render::dispatch
//!  genysite.toml   src/ loader       src/pages         dist/          dist/…
//! ```
//!
//! Each stage's error converts into [`BuildError`]; the first one ends the
//! build. Output written before the failure is left in place.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{self, ConfigError, SiteConfig};
use crate::materialize::{self, AssetSources, MaterializeError, MaterializeReport};
use crate::render::bundler::{Bundler, CommandBundler};
use crate::render::{self, ClientPaths, DispatchError, PAGES_DIR, RenderContext, RenderReport};
use crate::runtime::TemplateRuntime;
use crate::runtime::links::ASSETS_DIR;
use crate::stylesheet::{GrassCompiler, StylesheetCompiler};
use crate::tree::{self, ResolvedTree, TreeError};

/// Default staging root for client app builds, relative to the project.
pub const DEFAULT_TEMP_DIR: &str = ".genysite-temp";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Required directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("Output error: {0}")]
    Materialize(#[from] MaterializeError),
    #[error("Template data error: {0}")]
    Data(#[from] serde_json::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Where everything lives in a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub src: PathBuf,
    pub pages: PathBuf,
    pub assets: PathBuf,
    pub libs: PathBuf,
    pub template_assets: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path) -> Self {
        let src = root.join("src");
        Self {
            root: root.to_path_buf(),
            pages: src.join(PAGES_DIR),
            assets: src.join(ASSETS_DIR),
            libs: src.join("libs"),
            template_assets: src.join("template").join(ASSETS_DIR),
            src,
        }
    }

    /// `src` and `src/pages` are required.
    pub fn check(&self) -> Result<(), BuildError> {
        for required in [&self.src, &self.pages] {
            if !required.is_dir() {
                return Err(BuildError::NotFound(required.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub project_root: PathBuf,
    /// Staging root; relative paths resolve against the project root.
    pub temp_dir: PathBuf,
}

impl BuildOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
        }
    }

    fn staging_root(&self) -> PathBuf {
        self.project_root.join(&self.temp_dir)
    }
}

#[derive(Debug)]
pub struct BuildReport {
    pub dist: PathBuf,
    pub resolved: ResolvedTree,
    pub materialized: MaterializeReport,
    pub render: RenderReport,
}

/// Result of a dry run: the tree a build would render.
#[derive(Debug)]
pub struct CheckReport {
    pub config: SiteConfig,
    pub resolved: ResolvedTree,
}

/// Build the project with the configured bundler and the Sass compiler.
pub fn build(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let config = config::load_config(&options.project_root)?;
    let bundler = CommandBundler::from_config(&config.bundler);
    build_with(options, &config, &bundler, &GrassCompiler::new())
}

/// Build with an explicit config and backends.
pub fn build_with(
    options: &BuildOptions,
    config: &SiteConfig,
    bundler: &impl Bundler,
    compiler: &impl StylesheetCompiler,
) -> Result<BuildReport, BuildError> {
    let layout = ProjectLayout::new(&options.project_root);
    layout.check()?;
    tracing::info!(project = %layout.root.display(), strategy = config.strategy().label(), "building");

    let runtime = TemplateRuntime::new(&layout.src, &config.homepage);
    let resolved = resolve(&layout, config)?;

    let dist = layout.root.join(&config.dist);
    let sources = AssetSources::existing(&layout.assets, &layout.template_assets);
    let materialized = materialize::materialize(&dist, &resolved.directories, &sources, compiler)?;
    tracing::info!(
        directories = materialized.directories_created,
        files = materialized.files_copied,
        stylesheets = materialized.stylesheets.len(),
        "output prepared"
    );

    let data = render::template_data(config, &resolved.tree)?;
    let ctx = RenderContext {
        runtime: &runtime,
        config,
        resolved: &resolved,
        data: &data,
        dist: &dist,
    };
    let staging_root = options.staging_root();
    let client = ClientPaths {
        project_root: &layout.root,
        staging_root: &staging_root,
        libs: layout.libs.is_dir().then_some(layout.libs.as_path()),
    };
    let render = render::dispatch(&ctx, client, bundler)?;

    Ok(BuildReport {
        dist,
        resolved,
        materialized,
        render,
    })
}

/// Load config and resolve the tree without writing anything.
pub fn check(options: &BuildOptions) -> Result<CheckReport, BuildError> {
    let config = config::load_config(&options.project_root)?;
    let layout = ProjectLayout::new(&options.project_root);
    layout.check()?;
    let resolved = resolve(&layout, &config)?;
    Ok(CheckReport { config, resolved })
}

fn resolve(layout: &ProjectLayout, config: &SiteConfig) -> Result<ResolvedTree, BuildError> {
    let resolved = tree::resolve(&layout.pages, config)?;
    tracing::info!(
        pages = resolved.pages.len(),
        directories = resolved.directories.len(),
        "resolved page tree"
    );
    if !resolved.has_index() {
        tracing::warn!(index = %config.index, "no page matches the configured index");
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bundler::tests::MockBundler;
    use crate::stylesheet::tests::MockCompiler;
    use crate::test_helpers::*;
    use crate::types::Strategy;
    use pretty_assertions::assert_eq;

    fn options(project: &TestProject) -> BuildOptions {
        BuildOptions::new(project.root())
    }

    fn build_project(project: &TestProject) -> Result<BuildReport, BuildError> {
        let config = config::load_config(project.root())?;
        build_with(&options(project), &config, &MockBundler::writing("bundle.js"), &MockCompiler::new())
    }

    #[test]
    fn layout_paths() {
        let layout = ProjectLayout::new(Path::new("/site"));
        assert_eq!(layout.pages, PathBuf::from("/site/src/pages"));
        assert_eq!(layout.template_assets, PathBuf::from("/site/src/template/assets"));
        assert_eq!(layout.libs, PathBuf::from("/site/src/libs"));
    }

    #[test]
    fn missing_pages_dir_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        let err = build_with(
            &BuildOptions::new(tmp.path()),
            &SiteConfig::default(),
            &MockBundler::writing("bundle.js"),
            &MockCompiler::new(),
        )
        .unwrap_err();
        match err {
            BuildError::NotFound(path) => assert!(path.ends_with("src/pages")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn static_build_writes_pages_and_assets() {
        let project = ProjectBuilder::new()
            .config("[data]\ntitle = \"Docs\"\n")
            .page("index.md", "# {{ title }}")
            .page("guide/intro.html", "<p>intro</p>")
            .file("assets/main.scss", "a { color: red; }")
            .build();

        let report = build_project(&project).unwrap();

        assert_eq!(report.render.strategy, Strategy::StaticHtml);
        assert_eq!(
            report.render.outputs,
            vec![PathBuf::from("guide/intro.html"), PathBuf::from("index.html")]
        );
        assert_eq!(project.read("docs/index.html"), "<h1>Docs</h1>\n");
        assert_eq!(project.read("docs/guide/intro.html"), "<p>intro</p>");
        assert_eq!(report.materialized.stylesheets, vec![PathBuf::from("assets/main.css")]);
    }

    #[test]
    fn template_config_sits_under_project_config() {
        let project = ProjectBuilder::new()
            .config("[data]\ntitle = \"Project\"\n")
            .file("template/config.toml", "dist = \"public\"\n[data]\ntitle = \"Template\"\ntagline = \"t\"\n")
            .page("index.html", "{{ title }}/{{ tagline }}")
            .build();

        build_project(&project).unwrap();

        assert_eq!(project.read("public/index.html"), "Project/t");
    }

    #[test]
    fn client_build_runs_bundler() {
        let project = ProjectBuilder::new()
            .config("react = true\n")
            .page("index.md", "# Home")
            .page("Api.jsx", "export default () => null;")
            .build();

        let report = build_project(&project).unwrap();

        assert_eq!(report.render.strategy, Strategy::ClientApp);
        assert_eq!(report.render.pages_rendered, 1);
        assert_eq!(report.render.components, 1);
        assert!(project.root().join("docs/bundle.js").is_file());
        assert!(project.root().join("docs/index.html").is_file());
        assert!(!project.root().join(DEFAULT_TEMP_DIR).exists());
    }

    #[test]
    fn render_failure_fails_build() {
        let project = ProjectBuilder::new()
            .page("index.html", "{% include \"template/missing.html\" %}")
            .build();
        let err = build_project(&project).unwrap_err();
        assert!(matches!(err, BuildError::Dispatch(DispatchError::Render(_))));
    }

    #[test]
    fn check_resolves_without_writing() {
        let project = ProjectBuilder::new()
            .page("index.md", "")
            .page("guide/intro.md", "")
            .build();

        let report = check(&options(&project)).unwrap();

        assert_tree_shape(&report.resolved.tree, &[("guide", &["intro"]), ("index", &[])]);
        assert!(!project.root().join("docs").exists());
    }
}
