//! Markdown escaping for the three contexts text can land in.

use once_cell::sync::Lazy;
use regex::Regex;

/// Where a piece of text is going to be emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeContext {
    /// Ordinary paragraph text
    #[default]
    Plain,
    /// Inside a backtick-delimited code span
    InlineCode,
    /// Inside a fenced code block
    FencedCode,
}

static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([*_#\[\]`|])").unwrap());

static LEADING_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\s*)>").unwrap());

/// Escape `text` for the given context.
///
/// Plain text gets a backslash before `* _ # [ ] ` and `|`, and a line-leading
/// `>` is defused so it cannot open a quotation. List-marker lookalikes at the
/// start of a line (`- `, `+ `, `12. `) pass through untouched.
///
/// ```
/// use chatdown::{escape, EscapeContext};
///
/// assert_eq!(escape("a *b*", EscapeContext::Plain), "a \\*b\\*");
/// assert_eq!(escape("a `b`", EscapeContext::InlineCode), "a \\`b\\`");
/// assert_eq!(escape("a *b*", EscapeContext::FencedCode), "a *b*");
/// ```
pub fn escape(text: &str, context: EscapeContext) -> String {
    match context {
        EscapeContext::FencedCode => text.to_string(),
        EscapeContext::InlineCode => text.replace('`', "\\`"),
        EscapeContext::Plain => {
            let escaped = CONTROL_CHARS.replace_all(text, r"\$1");
            LEADING_QUOTE.replace_all(&escaped, r"$1\>").into_owned()
        }
    }
}

/// Prefix every line of `text` with `prefix`.
///
/// A trailing newline yields a trailing prefixed empty line, so
/// `"a\n"` becomes `"> a\n> "`.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len() + prefix.len() * 4);
    out.push_str(prefix);
    for c in text.chars() {
        out.push(c);
        if c == '\n' {
            out.push_str(prefix);
        }
    }
    out
}
