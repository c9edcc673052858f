//! Markdown rendering and HTML sanitisation for user content.
//!
//! Post and comment bodies are written in Markdown. Before they are stored
//! the raw text is rendered to HTML and reduced to a per-content-type
//! allow-list of tags, then bare URLs in the remaining text become links.
//!
//! # Example
//!
//! ```
//! use quill_markup::{AllowList, render_and_sanitize};
//!
//! let html = render_and_sanitize("Read **this**: https://example.com", AllowList::Comment);
//! assert!(html.contains("<strong>this</strong>"));
//! assert!(html.contains(r#"href="https://example.com""#));
//! ```

mod linkify;
mod render;
mod sanitize;

pub use linkify::linkify_html;
pub use render::markdown_to_html;
pub use sanitize::clean;

/// The set of HTML tags a piece of content may keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowList {
    /// Block-level content for posts.
    Post,
    /// Inline-only content for comments.
    Comment,
}

const POST_TAGS: &[&str] = &[
    "a",
    "abbr",
    "acronym",
    "b",
    "blockquote",
    "code",
    "em",
    "i",
    "li",
    "ol",
    "pre",
    "strong",
    "ul",
    "h1",
    "h2",
    "h3",
    "p",
];

const COMMENT_TAGS: &[&str] = &["a", "abbr", "acronym", "b", "code", "em", "i", "strong"];

impl AllowList {
    /// Tags permitted by this allow-list.
    #[must_use]
    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Post => POST_TAGS,
            Self::Comment => COMMENT_TAGS,
        }
    }
}

/// Render Markdown to HTML, strip disallowed tags and link bare URLs.
///
/// The linked output is cleaned once more so new links get the same
/// `rel` and scheme rules as written ones.
#[must_use]
pub fn render_and_sanitize(raw: &str, allow_list: AllowList) -> String {
    let cleaned = clean(&markdown_to_html(raw), allow_list);
    clean(&linkify_html(&cleaned), allow_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_removed() {
        let html = render_and_sanitize("hello <script>alert(1)</script>", AllowList::Post);
        assert!(!html.contains("<script"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_bare_url_becomes_link() {
        let html = render_and_sanitize("see https://example.com/a?b=1 now", AllowList::Post);
        assert!(html.contains(r#"href="https://example.com/a?b=1""#));
        assert!(html.contains(r#"rel="nofollow""#));
        assert!(html.contains(">https://example.com/a?b=1</a>"));
    }

    #[test]
    fn test_trailing_punctuation_not_linked() {
        let html = render_and_sanitize("go to https://example.com.", AllowList::Comment);
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains("</a>."));
    }

    #[test]
    fn test_comment_strips_block_tags() {
        let html = render_and_sanitize("# Title\n\nsome **bold** text", AllowList::Comment);
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("<p>"));
        assert!(html.contains("Title"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_post_keeps_block_tags() {
        let html = render_and_sanitize("# Title\n\n> quoted\n\n- item", AllowList::Post);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<li>item</li>"));
    }

    #[test]
    fn test_disallowed_tag_keeps_text() {
        let html = render_and_sanitize("<div>inside</div>", AllowList::Post);
        assert!(!html.contains("<div"));
        assert!(html.contains("inside"));
    }

    #[test]
    fn test_url_in_code_block_not_linked() {
        let html = render_and_sanitize("```\nhttps://example.com\n```", AllowList::Post);
        assert!(!html.contains("<a"));
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn test_existing_link_not_nested() {
        let html = render_and_sanitize("[https://example.com](https://example.com)", AllowList::Post);
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_url_in_stripped_block_is_linked() {
        let html = render_and_sanitize("<div>see https://example.com</div>", AllowList::Post);
        assert!(!html.contains("<div"));
        assert!(html.contains(r#"<a href="https://example.com" rel="nofollow">https://example.com</a>"#));
    }

    #[test]
    fn test_url_as_raw_anchor_text_not_relinked() {
        let html = render_and_sanitize(
            r#"<a href="https://a.example">https://b.example</a>"#,
            AllowList::Comment,
        );
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains(r#"href="https://a.example""#));
        assert!(html.contains(">https://b.example</a>"));
    }

    #[test]
    fn test_allow_lists() {
        assert_eq!(AllowList::Post.tags().len(), 17);
        assert_eq!(AllowList::Comment.tags().len(), 8);
        assert!(
            AllowList::Comment
                .tags()
                .iter()
                .all(|tag| AllowList::Post.tags().contains(tag))
        );
    }
}
