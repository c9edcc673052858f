//! Markdown to HTML rendering.

use pulldown_cmark::{Options, Parser, html};

/// Render Markdown to unsanitised HTML.
#[must_use]
pub fn markdown_to_html(raw: &str) -> String {
    let parser = Parser::new_ext(raw, Options::empty());

    let mut output = String::with_capacity(raw.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
