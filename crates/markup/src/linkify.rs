//! Bare URL linking over sanitised HTML.
//!
//! Input must come from the sanitiser: text never holds a raw `<` and every
//! attribute value is double quoted.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>\[\]()]+").unwrap());

/// Characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Elements whose text is never linked.
const SKIP_TAGS: &[&str] = &["a", "code", "pre"];

/// Wrap bare URLs in the text of `html` in `<a>` elements.
///
/// Text inside links and code is left alone.
#[must_use]
pub fn linkify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut skip_depth = 0usize;
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        let (text, tail) = rest.split_at(start);
        push_text(&mut out, text, skip_depth == 0);

        let (tag, after) = tail.split_at(tag_len(tail));
        if let Some((name, closing)) = tag_name(tag)
            && SKIP_TAGS.contains(&name)
        {
            if closing {
                skip_depth = skip_depth.saturating_sub(1);
            } else {
                skip_depth += 1;
            }
        }
        out.push_str(tag);
        rest = after;
    }

    push_text(&mut out, rest, skip_depth == 0);
    out
}

/// Length of the tag at the start of `s`, up to and including its `>`.
fn tag_len(s: &str) -> usize {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '>' if !quoted => return i + 1,
            _ => {}
        }
    }
    s.len()
}

/// Lowercase element name of a tag, and whether it closes.
fn tag_name(tag: &str) -> Option<(&str, bool)> {
    let inner = tag.strip_prefix('<')?;
    let (inner, closing) = inner
        .strip_prefix('/')
        .map_or((inner, false), |rest| (rest, true));
    let end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    Some((&inner[..end], closing))
}

fn push_text(out: &mut String, text: &str, link: bool) {
    if !link {
        out.push_str(text);
        return;
    }

    let mut last = 0;
    for m in URL_RE.find_iter(text) {
        let url = trim_url(m.as_str());
        if url.ends_with("://") {
            continue;
        }

        out.push_str(&text[last..m.start()]);
        out.push_str("<a href=\"");
        out.push_str(&url.replace('"', "&quot;"));
        out.push_str("\">");
        out.push_str(url);
        out.push_str("</a>");

        last = m.start() + url.len();
    }
    out.push_str(&text[last..]);
}

fn trim_url(url: &str) -> &str {
    // The serialiser writes U+00A0 as an entity.
    let url = url.find("&nbsp;").map_or(url, |i| &url[..i]);
    url.trim_end_matches(TRAILING_PUNCTUATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_split_from_text() {
        assert_eq!(
            linkify_html("<p>a http://x.org b</p>"),
            r#"<p>a <a href="http://x.org">http://x.org</a> b</p>"#
        );
    }

    #[test]
    fn test_link_text_untouched() {
        let html = r#"<a href="https://a.example">https://b.example</a>"#;
        assert_eq!(linkify_html(html), html);
    }

    #[test]
    fn test_code_untouched() {
        let html = "<pre><code>https://example.com\n</code></pre>";
        assert_eq!(linkify_html(html), html);
    }

    #[test]
    fn test_gt_inside_attribute() {
        let html = r#"<abbr title="a > b">see https://x.org</abbr>"#;
        assert_eq!(
            linkify_html(html),
            r#"<abbr title="a > b">see <a href="https://x.org">https://x.org</a></abbr>"#
        );
    }

    #[test]
    fn test_escaped_query_kept() {
        let html = linkify_html("https://x.org/?a=1&amp;b=2");
        assert_eq!(
            html,
            r#"<a href="https://x.org/?a=1&amp;b=2">https://x.org/?a=1&amp;b=2</a>"#
        );
    }

    #[test]
    fn test_bare_scheme_not_linked() {
        assert!(!linkify_html("http:// alone").contains("<a"));
        assert!(!linkify_html("see http://.").contains("<a"));
    }

    #[test]
    fn test_similar_tag_names_not_skipped() {
        let html = linkify_html("<abbr>https://x.org</abbr>");
        assert!(html.contains(r#"<a href="https://x.org">"#));
    }
}
