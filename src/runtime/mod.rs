//! Template engine wrapper.
//!
//! [`TemplateRuntime`] owns a minijinja environment rooted at the project's
//! `src` directory. Template names are `/`-separated paths below that root
//! (`pages/index.html`, `template/layout.html`), so pages can `extends` or
//! `include` anything in the source tree.
//!
//! ```text
//! src/
//! ├── pages/index.html      {% extends "template/layout.html" %}
//! └── template/layout.html  {{ "main.css" | assets(true) }}
//! ```
//!
//! On top of stock minijinja the runtime adds:
//! - URL filters resolved against the configured homepage ([`links`])
//! - `{% highlight %}` and `{% markdown %}` blocks ([`tags`], [`highlight`])
//! - convenience filters ([`filters`])

pub mod filters;
pub mod highlight;
pub mod links;
pub mod tags;

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use links::LinkBase;

pub struct TemplateRuntime {
    env: Environment<'static>,
    links: Arc<LinkBase>,
}

impl TemplateRuntime {
    pub fn new(src_root: &Path, homepage: &str) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_formatter(format_value);

        let root = src_root.to_path_buf();
        env.set_loader(move |name| load_template(&root, name));

        let links = Arc::new(LinkBase::parse(homepage));
        filters::register_filters(&mut env, Arc::clone(&links));

        Self { env, links }
    }

    /// Render the template at `name` (relative to `src`).
    pub fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, Error> {
        self.env.get_template(name)?.render(data)
    }

    /// Render an inline template source.
    pub fn render_str(&self, source: &str, data: &serde_json::Value) -> Result<String, Error> {
        let source = tags::rewrite("<string>", source)?;
        self.env.render_str(&source, data)
    }

    pub fn links(&self) -> &LinkBase {
        &self.links
    }
}

/// Output formatter for `{{ }}` expressions. HTML auto-escaping keeps `/`
/// literal so paths printed into `href` attributes stay readable.
fn format_value(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
    let plain = value.is_safe() || value.is_undefined() || value.is_none();
    if state.auto_escape() == AutoEscape::Html && !plain {
        out.write_str(&filters::escape_html(&value.to_string()))?;
        return Ok(());
    }
    minijinja::escape_formatter(out, state, value)
}

/// Resolve a template name below `root`. Names escaping the root are treated
/// as missing.
fn template_path(root: &Path, name: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ if segment.contains(':') => return None,
            _ => path.push(segment),
        }
    }
    Some(path)
}

fn load_template(root: &Path, name: &str) -> Result<Option<String>, Error> {
    let Some(path) = template_path(root, name) else {
        return Ok(None);
    };
    match std::fs::read_to_string(&path) {
        Ok(source) => {
            tracing::trace!(template = name, path = %path.display(), "loaded template");
            tags::rewrite(name, &source).map(Some)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {}", path.display()),
        )
        .with_source(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn runtime_with(files: &[(&str, &str)], homepage: &str) -> (TempDir, TemplateRuntime) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            let path = tmp.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let runtime = TemplateRuntime::new(tmp.path(), homepage);
        (tmp, runtime)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn renders_page_with_data() {
        let (_tmp, rt) = runtime_with(&[("pages/index.html", "<h1>{{ title }}</h1>")], "");
        let out = rt.render("pages/index.html", &json!({"title": "Docs"})).unwrap();
        assert_eq!(out, "<h1>Docs</h1>");
    }

    #[test]
    fn extends_template_from_src_root() {
        let (_tmp, rt) = runtime_with(
            &[
                (
                    "template/layout.html",
                    "<main>{% block content %}{% endblock %}</main>",
                ),
                (
                    "pages/about.html",
                    "{% extends \"template/layout.html\" %}{% block content %}About{% endblock %}",
                ),
            ],
            "",
        );
        assert_eq!(
            rt.render("pages/about.html", &json!({})).unwrap(),
            "<main>About</main>"
        );
    }

    #[test]
    fn keeps_trailing_newline() {
        let (_tmp, rt) = runtime_with(&[("pages/a.md", "# A\n")], "");
        assert_eq!(rt.render("pages/a.md", &json!({})).unwrap(), "# A\n");
    }

    #[test]
    fn missing_template_is_not_found() {
        let (_tmp, rt) = runtime_with(&[], "");
        let err = rt.render("pages/nope.html", &json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn parent_segments_are_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("secret.html"), "secret").unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();

        let rt = TemplateRuntime::new(&src, "");
        let err = rt.render("../secret.html", &json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    // =========================================================================
    // Block tags through the loader
    // =========================================================================

    #[test]
    fn highlight_block_renders_code() {
        let (_tmp, rt) = runtime_with(
            &[(
                "pages/code.html",
                "{% highlight \"js\" %}const a = 1;{% endhighlight %}",
            )],
            "",
        );
        let out = rt.render("pages/code.html", &json!({})).unwrap();
        assert!(out.starts_with("<pre><code class=\"hljs language-js\">"));
        assert!(!out.contains("&lt;span"));
    }

    #[test]
    fn highlight_error_section_renders_on_failure() {
        let (_tmp, rt) = runtime_with(
            &[(
                "pages/code.html",
                "{% highlight \"no-such-language\" %}x{% error %}<b>{{ title }}</b>{% endhighlight %}",
            )],
            "",
        );
        let out = rt.render("pages/code.html", &json!({"title": "Oops"})).unwrap();
        assert_eq!(out, "<b>Oops</b>");
    }

    #[test]
    fn highlight_failure_without_error_section_fails_render() {
        let (_tmp, rt) = runtime_with(
            &[(
                "pages/code.html",
                "{% highlight \"no-such-language\" %}x{% endhighlight %}",
            )],
            "",
        );
        assert!(rt.render("pages/code.html", &json!({})).is_err());
    }

    #[test]
    fn markdown_block_renders_html() {
        let (_tmp, rt) = runtime_with(
            &[(
                "pages/index.html",
                "<div>{% markdown %}\n    ## {{ title }}\n{% endmarkdown %}</div>",
            )],
            "",
        );
        let out = rt.render("pages/index.html", &json!({"title": "Intro"})).unwrap();
        assert!(out.contains("<h2>Intro</h2>"), "got: {out}");
    }

    #[test]
    fn unbalanced_block_is_syntax_error() {
        let (_tmp, rt) = runtime_with(&[("pages/bad.html", "{% markdown %}x")], "");
        let err = rt.render("pages/bad.html", &json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
    }

    // =========================================================================
    // Filters wired to the homepage
    // =========================================================================

    #[test]
    fn asset_filters_use_homepage() {
        let (_tmp, rt) = runtime_with(
            &[(
                "pages/index.html",
                "{{ 'logo.png' | assets }} {{ 'about.html' | link }}",
            )],
            "/site",
        );
        assert_eq!(
            rt.render("pages/index.html", &json!({})).unwrap(),
            "/site/assets/logo.png /site/about.html"
        );
    }

    #[test]
    fn html_escaping_keeps_slashes() {
        let (_tmp, rt) = runtime_with(
            &[("pages/index.html", "<a href=\"{{ path }}\">{{ label }}</a>")],
            "",
        );
        let out = rt
            .render(
                "pages/index.html",
                &json!({"path": "/guide/intro.html", "label": "<Intro & \"more\">"}),
            )
            .unwrap();
        assert_eq!(
            out,
            "<a href=\"/guide/intro.html\">&lt;Intro &amp; &quot;more&quot;&gt;</a>"
        );
    }

    #[test]
    fn non_html_templates_are_not_escaped() {
        let (_tmp, rt) = runtime_with(&[("pages/a.md", "{{ text }} {{ missing }}")], "");
        let out = rt.render("pages/a.md", &json!({"text": "<b>/x</b>"})).unwrap();
        assert_eq!(out, "<b>/x</b> ");
    }

    #[test]
    fn render_str_supports_block_tags() {
        let (_tmp, rt) = runtime_with(&[], "");
        let out = rt
            .render_str("{% markdown %}*hi*{% endmarkdown %}", &json!({}))
            .unwrap();
        assert_eq!(out.trim(), "<p><em>hi</em></p>");
    }

    #[test]
    fn links_accessor_reflects_homepage() {
        let (_tmp, rt) = runtime_with(&[], "https://example.org");
        assert!(rt.links().is_url());
    }
}
