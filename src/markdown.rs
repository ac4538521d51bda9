//! Markdown to HTML conversion.
//!
//! Used twice: for `.md` / `.markdown` pages after template rendering, and by
//! the inline `{% markdown %}` block tag. Both share the same extension set so
//! a snippet renders identically in either position.

use pulldown_cmark::{Options, Parser, html};

/// Page extensions treated as markdown (lower-case, without the dot).
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Whether a page extension denotes markdown.
pub fn is_markdown_extension(extension: Option<&str>) -> bool {
    extension.is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Convert markdown to an HTML fragment.
///
/// Raw HTML in the source passes through unchanged, so template output that
/// already contains markup survives conversion.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip the indentation shared by all non-blank lines.
///
/// Block bodies are usually indented to match the surrounding template;
/// without this, four spaces of nesting would turn the body into a code block.
pub fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|l| if l.trim().is_empty() { "" } else { &l[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_removes_common_indentation() {
        let text = "\n    # Title\n\n    - a\n      - b\n";
        assert_eq!(dedent(text), "\n# Title\n\n- a\n  - b");
    }

    #[test]
    fn dedent_leaves_flush_text_alone() {
        assert_eq!(dedent("a\n  b"), "a\n  b");
    }

    #[test]
    fn heading_and_paragraph() {
        let html = to_html("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
    }

    #[test]
    fn tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn raw_html_passes_through() {
        let html = to_html("<div class=\"note\">kept</div>\n");
        assert!(html.contains("<div class=\"note\">kept</div>"));
    }

    #[test]
    fn markdown_extension_detection() {
        assert!(is_markdown_extension(Some("md")));
        assert!(is_markdown_extension(Some("MARKDOWN")));
        assert!(!is_markdown_extension(Some("html")));
        assert!(!is_markdown_extension(None));
    }
}
