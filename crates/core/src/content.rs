//! Body setters that keep the rendered HTML in sync with the raw text.

use quill_db::entities::{comment, post};
use quill_markup::{AllowList, render_and_sanitize};
use sea_orm::Set;

/// Content whose stored HTML is derived from a Markdown body.
///
/// `set_body` is the only way services assign a body, so `body_html`
/// is regenerated on every write.
pub trait SetBody {
    /// Tags the rendered HTML may keep.
    const ALLOW_LIST: AllowList;

    /// Assign the raw body and its sanitised HTML.
    fn set_body(&mut self, body: String);
}

impl SetBody for post::ActiveModel {
    const ALLOW_LIST: AllowList = AllowList::Post;

    fn set_body(&mut self, body: String) {
        self.body_html = Set(render_and_sanitize(&body, Self::ALLOW_LIST));
        self.body = Set(body);
    }
}

impl SetBody for comment::ActiveModel {
    const ALLOW_LIST: AllowList = AllowList::Comment;

    fn set_body(&mut self, body: String) {
        self.body_html = Set(render_and_sanitize(&body, Self::ALLOW_LIST));
        self.body = Set(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn html_of(value: &ActiveValue<String>) -> &str {
        match value {
            ActiveValue::Set(v) | ActiveValue::Unchanged(v) => v,
            ActiveValue::NotSet => "",
        }
    }

    #[test]
    fn test_post_body_sets_html() {
        let mut model = post::ActiveModel::default();
        model.set_body("# Hi\n\n<script>x()</script>\n\nsee https://example.com".to_string());

        let html = html_of(&model.body_html);
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(!html.contains("<script"));
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(matches!(model.body, ActiveValue::Set(ref b) if b.starts_with("# Hi")));
    }

    #[test]
    fn test_comment_body_is_inline_only() {
        let mut model = comment::ActiveModel::default();
        model.set_body("# Hi *there*".to_string());

        let html = html_of(&model.body_html);
        assert!(!html.contains("<h1>"));
        assert!(html.contains("<em>there</em>"));
    }

    #[test]
    fn test_resetting_body_regenerates_html() {
        let mut model = comment::ActiveModel::default();
        model.set_body("**first**".to_string());
        model.set_body("_second_".to_string());

        let html = html_of(&model.body_html);
        assert!(!html.contains("first"));
        assert!(html.contains("<em>second</em>"));
    }
}
