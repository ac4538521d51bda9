//! Syntax highlighting with class-based markup.
//!
//! Code is tokenized with syntect's bundled grammars and emitted as spans with
//! `hl-`-prefixed classes, so the page chooses colors through a stylesheet
//! (see [`theme_css`]) rather than inline styles.

use std::sync::LazyLock;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

/// Language used when a highlight block names none.
pub const DEFAULT_LANGUAGE: &str = "js";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Unknown highlight language: {0}")]
    UnknownLanguage(String),
    #[error("Unknown highlight theme: {name} (available: {available})")]
    UnknownTheme { name: String, available: String },
    #[error("Highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Highlight `code` as `language` (default [`DEFAULT_LANGUAGE`]).
///
/// Returns `<pre><code class="hljs language-…">…</code></pre>`. Blank lines
/// around the code are dropped.
pub fn highlight(code: &str, language: Option<&str>) -> Result<String, HighlightError> {
    let language = language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    let syntax = SYNTAXES
        .find_syntax_by_token(language)
        .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;

    let code = code.trim_start_matches(['\r', '\n']).trim_end();
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }

    Ok(format!(
        "<pre><code class=\"hljs language-{}\">{}</code></pre>",
        language.to_ascii_lowercase(),
        generator.finalize()
    ))
}

/// Names of the bundled themes, sorted.
pub fn theme_names() -> Vec<&'static str> {
    THEMES.themes.keys().map(String::as_str).collect()
}

/// Stylesheet for a bundled theme matching the classes [`highlight`] emits.
pub fn theme_css(name: &str) -> Result<String, HighlightError> {
    let theme = THEMES
        .themes
        .get(name)
        .ok_or_else(|| HighlightError::UnknownTheme {
            name: name.to_string(),
            available: theme_names().join(", "),
        })?;
    Ok(css_for_theme_with_class_style(theme, CLASS_STYLE)?)
}
