//! Filters registered on every template environment.
//!
//! | Filter | Usage |
//! |--------|-------|
//! | `link` | `{{ "guide/intro.html" \| link }}` |
//! | `assets` | `{{ "main.css" \| assets(true) }}` |
//! | `meta` | `{{ [og_tags, "<meta name=x>"] \| meta }}` |
//! | `is_array` / `isArray` | `{% if node.children \| is_array %}` |
//! | `highlight_theme` | `{{ "InspiredGitHub" \| highlight_theme }}` |
//! | `highlight` | target of the `{% highlight %}` block |
//! | `markdown` | target of the `{% markdown %}` block, or `{{ text \| markdown }}` |

use minijinja::value::{Kwargs, ValueKind};
use minijinja::{Environment, Error, ErrorKind, State, Value};
use std::sync::Arc;

use super::highlight;
use super::links::LinkBase;
use crate::markdown;

pub fn register_filters(env: &mut Environment<'static>, links: Arc<LinkBase>) {
    let base = Arc::clone(&links);
    env.add_filter("link", move |path: String| -> Result<Value, Error> {
        base.join(&path)
            .map(url_value)
            .map_err(|e| url_error(&path, e))
    });

    let base = links;
    env.add_filter(
        "assets",
        move |path: String, template: Option<bool>| -> Result<Value, Error> {
            base.asset(&path, template.unwrap_or(false))
                .map(url_value)
                .map_err(|e| url_error(&path, e))
        },
    );

    env.add_filter("meta", meta);
    env.add_filter("is_array", is_array);
    env.add_filter("isArray", is_array);
    env.add_filter("highlight_theme", highlight_theme);
    env.add_filter("highlightTheme", highlight_theme);
    env.add_filter("highlight", highlight_block);
    env.add_filter("markdown", markdown_block);
}

/// HTML-escape for text and attribute values. `/` is left alone so paths
/// and URLs stay readable.
pub(super) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn url_value(url: String) -> Value {
    Value::from_safe_string(escape_html(&url))
}

fn url_error(path: &str, err: url::ParseError) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("cannot resolve '{path}' against the homepage"),
    )
    .with_source(err)
}

/// Join strings and zero-argument callables (macros) with newlines.
///
/// Accepts a single entry or a list of entries.
fn meta(state: &State, entries: Value) -> Result<Value, Error> {
    if entries.is_undefined() || entries.is_none() {
        return Ok(Value::from_safe_string(String::new()));
    }
    if entries.kind() != ValueKind::Seq {
        return Ok(Value::from_safe_string(meta_line(state, &entries)?));
    }

    let lines = entries
        .try_iter()?
        .map(|entry| meta_line(state, &entry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::from_safe_string(lines.join("\n")))
}

/// Macros report a map kind, so callability is decided by being an object.
fn meta_line(state: &State, entry: &Value) -> Result<String, Error> {
    match entry.kind() {
        ValueKind::String | ValueKind::Seq | ValueKind::Iterable => Ok(entry.to_string()),
        _ if entry.as_object().is_some() => Ok(entry.call(state, &[])?.to_string()),
        _ => Ok(entry.to_string()),
    }
}

fn is_array(value: Value) -> bool {
    value.kind() == ValueKind::Seq
}

fn highlight_theme(name: String) -> Result<Value, Error> {
    let css = highlight::theme_css(&name)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    Ok(Value::from_safe_string(format!("<style>\n{css}</style>")))
}

/// Body of a `{% highlight %}` block. On failure the `fallback` macro, if
/// given, renders instead.
fn highlight_block(
    state: &State,
    body: String,
    language: Option<String>,
    kwargs: Kwargs,
) -> Result<Value, Error> {
    let fallback: Option<Value> = kwargs.get("fallback")?;
    kwargs.assert_all_used()?;

    match highlight::highlight(&body, language.as_deref()) {
        Ok(html) => Ok(Value::from_safe_string(html)),
        Err(err) => match fallback {
            Some(fallback) => {
                tracing::debug!(template = state.name(), error = %err, "highlight failed, rendering error section");
                fallback.call(state, &[])
            }
            None => Err(Error::new(ErrorKind::InvalidOperation, err.to_string())),
        },
    }
}

/// Body of a `{% markdown %}` block. Conversion accepts any input, so an
/// error section is accepted but never rendered.
fn markdown_block(body: String, kwargs: Kwargs) -> Result<Value, Error> {
    let _fallback: Option<Value> = kwargs.get("fallback")?;
    kwargs.assert_all_used()?;
    Ok(Value::from_safe_string(markdown::to_html(&markdown::dedent(
        &body,
    ))))
}
