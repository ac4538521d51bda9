//! Source rewrite for the `highlight` and `markdown` block tags.
//!
//! minijinja has no custom-tag API, so the loader rewrites each block into a
//! `{% filter %}` block before the engine parses it:
//!
//! ```text
//! {% highlight "py" %}x = 1{% error %}oops{% endhighlight %}
//!
//!   becomes
//!
//! {% macro __genysite_fallback_0() %}oops{% endmacro %}
//! {% filter highlight("py", fallback=__genysite_fallback_0) %}x = 1{% endfilter %}
//! ```
//!
//! The optional `{% error %}` section turns into a zero-argument macro that the
//! filter calls when it fails. Whitespace-control markers (`{%-`, `-%}`) carry
//! over to the generated tags. `{% raw %}` regions are left untouched.

use minijinja::{Error, ErrorKind};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\{%(-?)\s*(highlight|endhighlight|markdown|endmarkdown|error|raw|endraw)\b(.*?)(-?)%\}",
    )
    .unwrap()
});

const FALLBACK_PREFIX: &str = "__genysite_fallback_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Highlight,
    Markdown,
}

impl BlockKind {
    fn filter_name(self) -> &'static str {
        match self {
            BlockKind::Highlight => "highlight",
            BlockKind::Markdown => "markdown",
        }
    }
}

/// Whitespace-control markers of one tag.
#[derive(Debug, Clone, Copy, Default)]
struct Trim {
    left: &'static str,
    right: &'static str,
}

impl Trim {
    fn from_captures(caps: &Captures) -> Self {
        let marker = |i: usize| if caps[i].is_empty() { "" } else { "-" };
        Self {
            left: marker(1),
            right: marker(4),
        }
    }
}

/// An open block waiting for its end tag.
struct Frame {
    kind: BlockKind,
    args: String,
    open: Trim,
    body: String,
    fallback: Option<(Trim, String)>,
}

impl Frame {
    fn push(&mut self, text: &str) {
        match &mut self.fallback {
            Some((_, fallback)) => fallback.push_str(text),
            None => self.body.push_str(text),
        }
    }

    fn close(self, id: usize, end: Trim) -> String {
        let name = self.kind.filter_name();
        let mut args: Vec<String> = Vec::new();
        if !self.args.is_empty() {
            args.push(self.args.clone());
        }

        match self.fallback {
            None => format!(
                "{{%{} filter {}({}) {}%}}{}{{%{} endfilter {}%}}",
                self.open.left,
                name,
                args.join(", "),
                self.open.right,
                self.body,
                end.left,
                end.right,
            ),
            Some((error, fallback)) => {
                let macro_name = format!("{FALLBACK_PREFIX}{id}");
                args.push(format!("fallback={macro_name}"));
                format!(
                    "{{%{} macro {}() {}%}}{}{{%{} endmacro %}}\
                     {{% filter {}({}) {}%}}{}{{%{} endfilter {}%}}",
                    self.open.left,
                    macro_name,
                    error.right,
                    fallback,
                    end.left,
                    name,
                    args.join(", "),
                    self.open.right,
                    self.body,
                    error.left,
                    end.right,
                )
            }
        }
    }
}

fn syntax_error(template: &str, message: impl std::fmt::Display) -> Error {
    Error::new(
        ErrorKind::SyntaxError,
        format!("{message} (in template {template})"),
    )
}

/// Rewrite `highlight` / `markdown` blocks of a template source into filter
/// blocks. Sources without those tags come back unchanged.
pub fn rewrite(template: &str, source: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(source.len());
    let mut stack: Vec<Frame> = Vec::new();
    let mut in_raw = false;
    let mut next_id = 0;
    let mut cursor = 0;

    let emit = |stack: &mut Vec<Frame>, out: &mut String, text: &str| match stack.last_mut() {
        Some(frame) => frame.push(text),
        None => out.push_str(text),
    };

    for caps in BLOCK_TAG.captures_iter(source) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let tag = &caps[2];
        emit(&mut stack, &mut out, &source[cursor..whole.start]);
        cursor = whole.end;

        if in_raw {
            in_raw = tag != "endraw";
            emit(&mut stack, &mut out, &source[whole]);
            continue;
        }

        let trim = Trim::from_captures(&caps);
        match tag {
            "raw" => {
                in_raw = true;
                emit(&mut stack, &mut out, &source[whole]);
            }
            "endraw" => emit(&mut stack, &mut out, &source[whole]),
            "highlight" | "markdown" => {
                let kind = if tag == "highlight" {
                    BlockKind::Highlight
                } else {
                    BlockKind::Markdown
                };
                stack.push(Frame {
                    kind,
                    args: caps[3].trim().to_string(),
                    open: trim,
                    body: String::new(),
                    fallback: None,
                });
            }
            "error" => match stack.last_mut() {
                Some(frame) if frame.fallback.is_none() => {
                    frame.fallback = Some((trim, String::new()));
                }
                Some(frame) => {
                    return Err(syntax_error(
                        template,
                        format_args!("duplicate error section in {} block", frame.kind.filter_name()),
                    ));
                }
                None => {
                    return Err(syntax_error(template, "error section outside of a block"));
                }
            },
            end => {
                let expected = match stack.last() {
                    Some(frame) => frame.kind,
                    None => {
                        return Err(syntax_error(template, format_args!("unexpected {end}")));
                    }
                };
                if end != format!("end{}", expected.filter_name()) {
                    return Err(syntax_error(
                        template,
                        format_args!("unexpected {end}, {} block is still open", expected.filter_name()),
                    ));
                }
                if let Some(frame) = stack.pop() {
                    let rewritten = frame.close(next_id, trim);
                    next_id += 1;
                    emit(&mut stack, &mut out, &rewritten);
                }
            }
        }
    }
    emit(&mut stack, &mut out, &source[cursor..]);

    if let Some(frame) = stack.last() {
        return Err(syntax_error(
            template,
            format_args!("unclosed {} block", frame.kind.filter_name()),
        ));
    }
    Ok(out)
}
