//! Allow-list HTML sanitisation.

use std::collections::HashSet;

use crate::AllowList;

/// Strip every tag not in `allow_list`, keeping the text it wrapped.
///
/// `<script>` and `<style>` are removed along with their contents. Links
/// are marked `rel="nofollow"` and only keep safe URL schemes.
#[must_use]
pub fn clean(html: &str, allow_list: AllowList) -> String {
    let tags: HashSet<&'static str> = allow_list.tags().iter().copied().collect();

    ammonia::Builder::default()
        .tags(tags)
        .link_rel(Some("nofollow"))
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_href_dropped() {
        let html = clean(r#"<a href="javascript:alert(1)">x</a>"#, AllowList::Comment);
        assert!(!html.contains("javascript"));
        assert!(html.contains('x'));
    }

    #[test]
    fn test_event_handler_dropped() {
        let html = clean(r#"<b onclick="steal()">bold</b>"#, AllowList::Comment);
        assert_eq!(html, "<b>bold</b>");
    }

    #[test]
    fn test_style_content_removed() {
        let html = clean("<style>body{}</style><em>kept</em>", AllowList::Post);
        assert_eq!(html, "<em>kept</em>");
    }
}
