//! Markdown-subset transform applied to content deltas before display.
//!
//! Three substitutions, in order: `**X**` spans become bold markup, lines
//! beginning `- ` get a bullet glyph, newlines become `<br>`. Bold and list
//! substitution run before newline substitution since list matching is
//! anchored to line starts delimited by the newline.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern compiles"));

/// Transform one unit of delta text into display-ready markup.
///
/// Pure and stateless per call; each delta is transformed independently.
///
/// # Example
/// ```
/// use answerstream::markdown::render;
///
/// assert_eq!(
///     render("**bold** and\n- item one\n- item two"),
///     "<strong>bold</strong> and<br>• item one<br>• item two"
/// );
/// ```
pub fn render(text: &str) -> String {
    let bolded = BOLD.replace_all(text, "<strong>$1</strong>");
    let listed = bolded
        .split('\n')
        .map(|line| match line.strip_prefix("- ") {
            Some(item) => format!("• {item}"),
            None => line.to_string(),
        })
        .join("\n");
    listed.replace('\n', "<br>")
}
