//! Pre-rendered HTML output: one file per page.
//!
//! `pages/guide/Intro.md` is rendered, converted from markdown, and written to
//! `dist/guide/Intro.html`. The file name keeps its case; the lower-cased
//! `output_path` in the tree is what links use.

use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use super::{RenderContext, RenderError, render_page};
use crate::naming;
use crate::types::{PageSource, Strategy};

/// Render every page in the pool. Returns written paths relative to `dist`,
/// sorted.
pub fn render_all(ctx: &RenderContext<'_>) -> Result<Vec<PathBuf>, RenderError> {
    let mut outputs = ctx
        .resolved
        .pages
        .par_iter()
        .map(|page| render_to_file(ctx, page))
        .collect::<Result<Vec<_>, _>>()?;
    outputs.sort();
    Ok(outputs)
}

fn render_to_file(ctx: &RenderContext<'_>, page: &PageSource) -> Result<PathBuf, RenderError> {
    let html = render_page(ctx.runtime, page, ctx.data)?;

    let relative = PathBuf::from(naming::replace_extension(
        &page.relative_path,
        Strategy::StaticHtml.page_extension(),
    ));
    let target = ctx.dist.join(&relative);
    fs::write(&target, html).map_err(|source| RenderError::Io {
        path: target.clone(),
        source,
    })?;

    tracing::debug!(page = %page.relative_path, output = %relative.display(), "rendered page");
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::materialize::{self, AssetSources};
    use crate::render::template_data;
    use crate::runtime::TemplateRuntime;
    use crate::stylesheet::tests::MockCompiler;
    use crate::test_helpers::*;
    use crate::tree;
    use pretty_assertions::assert_eq;

    fn build(project: &TestProject, config: &SiteConfig) -> Result<Vec<PathBuf>, RenderError> {
        let resolved = tree::resolve(&project.pages_dir(), config).unwrap();
        let dist = project.root().join(&config.dist);
        materialize::materialize(&dist, &resolved.directories, &AssetSources::default(), &MockCompiler::new())
            .unwrap();
        let runtime = TemplateRuntime::new(&project.src_dir(), &config.homepage);
        let data = template_data(config, &resolved.tree).unwrap();
        let ctx = RenderContext {
            runtime: &runtime,
            config,
            resolved: &resolved,
            data: &data,
            dist: &dist,
        };
        render_all(&ctx)
    }

    #[test]
    fn writes_one_html_file_per_page() {
        let project = ProjectBuilder::new()
            .page("index.md", "# {{ title }}")
            .page("guide/Intro.html", "<p>intro</p>")
            .build();
        let config: SiteConfig = toml::from_str("[data]\ntitle = \"Home\"\n").unwrap();

        let outputs = build(&project, &config).unwrap();

        assert_eq!(
            outputs,
            vec![PathBuf::from("guide/Intro.html"), PathBuf::from("index.html")]
        );
        assert_eq!(project.read("docs/index.html").trim(), "<h1>Home</h1>");
        assert_eq!(project.read("docs/guide/Intro.html"), "<p>intro</p>");
    }

    #[test]
    fn markdown_extension_variants_are_converted() {
        let project = ProjectBuilder::new()
            .page("notes.markdown", "*note*")
            .page("plain.txt", "*raw*")
            .build();

        build(&project, &SiteConfig::default()).unwrap();

        assert_eq!(project.read("docs/notes.html").trim(), "<p><em>note</em></p>");
        assert_eq!(project.read("docs/plain.html"), "*raw*");
    }

    #[test]
    fn pages_see_the_tree() {
        let project = ProjectBuilder::new()
            .page(
                "index.html",
                "{% for node in tree %}[{{ node.display_name }}={{ node.output_path }}]{% endfor %}",
            )
            .page("about.md", "")
            .build();
        let config: SiteConfig = toml::from_str("priority = [\"index\"]\n[names]\nabout = \"About us\"\n").unwrap();

        build(&project, &config).unwrap();

        assert_eq!(
            project.read("docs/index.html"),
            "[index=][About us=/about.html]"
        );
    }

    #[test]
    fn failing_page_fails_the_batch() {
        let project = ProjectBuilder::new()
            .page("good.html", "ok")
            .page("bad.html", "{% if %}")
            .build();

        let err = build(&project, &SiteConfig::default()).unwrap_err();
        match err {
            RenderError::Template { path, .. } => assert_eq!(path, "bad.html"),
            other => panic!("expected template error, got {other:?}"),
        }
    }
}
