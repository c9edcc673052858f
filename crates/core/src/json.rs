//! External JSON representations of users, posts and comments.
//!
//! Every related resource is referenced by an absolute URL under the
//! public API base, e.g. `https://blog.example.com/api/v1/users/{id}`.

use quill_db::entities::{comment, post, user};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// Builds absolute resource URLs.
#[derive(Debug, Clone)]
pub struct ResourceUrls {
    base: String,
}

impl ResourceUrls {
    /// Create from the API base URL (no trailing slash needed).
    #[must_use]
    pub fn new(api_base_url: &str) -> Self {
        Self {
            base: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `/users/{id}`
    #[must_use]
    pub fn user(&self, id: &str) -> String {
        format!("{}/users/{id}", self.base)
    }

    /// `/users/{id}/posts`
    #[must_use]
    pub fn user_posts(&self, id: &str) -> String {
        format!("{}/users/{id}/posts", self.base)
    }

    /// `/users/{id}/timeline`
    #[must_use]
    pub fn user_timeline(&self, id: &str) -> String {
        format!("{}/users/{id}/timeline", self.base)
    }

    /// `/users/{id}/followers`
    #[must_use]
    pub fn user_followers(&self, id: &str) -> String {
        format!("{}/users/{id}/followers", self.base)
    }

    /// `/users/{id}/following`
    #[must_use]
    pub fn user_following(&self, id: &str) -> String {
        format!("{}/users/{id}/following", self.base)
    }

    /// `/posts/{id}`
    #[must_use]
    pub fn post(&self, id: &str) -> String {
        format!("{}/posts/{id}", self.base)
    }

    /// `/posts/{id}/comments`
    #[must_use]
    pub fn post_comments(&self, id: &str) -> String {
        format!("{}/posts/{id}/comments", self.base)
    }

    /// `/comments/{id}`
    #[must_use]
    pub fn comment(&self, id: &str) -> String {
        format!("{}/comments/{id}", self.base)
    }
}

/// Counts shown alongside a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounts {
    /// Posts written.
    pub posts: u64,
    /// Followers, excluding the user.
    pub followers: u64,
    /// Users followed, excluding the user.
    pub following: u64,
}

/// A user as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserJson {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub avatar_url: Option<String>,
    pub member_since: DateTimeWithTimeZone,
    pub last_seen: DateTimeWithTimeZone,
    pub posts: String,
    pub followed_posts: String,
    pub followers: String,
    pub following: String,
    pub post_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

impl UserJson {
    /// Project a user.
    #[must_use]
    pub fn new(user: &user::Model, counts: UserCounts, urls: &ResourceUrls) -> Self {
        Self {
            id: user.id.clone(),
            url: urls.user(&user.id),
            name: user.name.clone(),
            location: user.location.clone(),
            about_me: user.about_me.clone(),
            avatar_url: user.avatar_url.clone(),
            member_since: user.member_since,
            last_seen: user.last_seen,
            posts: urls.user_posts(&user.id),
            followed_posts: urls.user_timeline(&user.id),
            followers: urls.user_followers(&user.id),
            following: urls.user_following(&user.id),
            post_count: counts.posts,
            followers_count: counts.followers,
            following_count: counts.following,
        }
    }
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PostJson {
    pub id: String,
    pub url: String,
    pub body: String,
    pub body_html: String,
    pub timestamp: DateTimeWithTimeZone,
    pub author: String,
    pub comments: String,
    pub comment_count: u64,
}

impl PostJson {
    /// Project a post.
    #[must_use]
    pub fn new(post: &post::Model, comment_count: u64, urls: &ResourceUrls) -> Self {
        Self {
            id: post.id.clone(),
            url: urls.post(&post.id),
            body: post.body.clone(),
            body_html: post.body_html.clone(),
            timestamp: post.created_at,
            author: urls.user(&post.author_id),
            comments: urls.post_comments(&post.id),
            comment_count,
        }
    }
}

/// A comment as returned by the API.
///
/// The body of a disabled comment is only shown to moderators.
#[derive(Debug, Clone, Serialize)]
pub struct CommentJson {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    pub disabled: bool,
    pub timestamp: DateTimeWithTimeZone,
    pub author: String,
    pub post: String,
}

impl CommentJson {
    /// Project a comment, withholding the body when `show_body` is false.
    #[must_use]
    pub fn new(comment: &comment::Model, show_body: bool, urls: &ResourceUrls) -> Self {
        let (body, body_html) = if show_body {
            (Some(comment.body.clone()), Some(comment.body_html.clone()))
        } else {
            (None, None)
        };

        Self {
            id: comment.id.clone(),
            url: urls.comment(&comment.id),
            body,
            body_html,
            disabled: comment.disabled,
            timestamp: comment.created_at,
            author: urls.user(&comment.author_id),
            post: urls.post(&comment.post_id),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn urls() -> ResourceUrls {
        ResourceUrls::new("https://blog.example.com/api/v1/")
    }

    #[test]
    fn test_user_url_points_at_user() {
        let now = Utc::now();
        let user = user::Model {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            name: Some("Ana".to_string()),
            location: None,
            about_me: None,
            avatar_url: None,
            token: Some("secret".to_string()),
            role_id: None,
            member_since: now.into(),
            last_seen: now.into(),
        };

        let json = UserJson::new(
            &user,
            UserCounts {
                posts: 3,
                followers: 1,
                following: 2,
            },
            &urls(),
        );
        assert_eq!(json.url, "https://blog.example.com/api/v1/users/u1");
        assert_eq!(json.posts, "https://blog.example.com/api/v1/users/u1/posts");
        assert_eq!(
            json.followed_posts,
            "https://blog.example.com/api/v1/users/u1/timeline"
        );
        assert_eq!(json.post_count, 3);

        let value = serde_json::to_value(&json).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("token").is_none());
    }

    #[test]
    fn test_post_json() {
        let post = post::Model {
            id: "p1".to_string(),
            body: "hi".to_string(),
            body_html: "<p>hi</p>".to_string(),
            author_id: "u1".to_string(),
            created_at: Utc::now().into(),
        };

        let json = PostJson::new(&post, 5, &urls());
        assert_eq!(json.url, "https://blog.example.com/api/v1/posts/p1");
        assert_eq!(json.author, "https://blog.example.com/api/v1/users/u1");
        assert_eq!(
            json.comments,
            "https://blog.example.com/api/v1/posts/p1/comments"
        );
        assert_eq!(json.comment_count, 5);
    }

    #[test]
    fn test_hidden_comment_omits_body() {
        let comment = comment::Model {
            id: "c1".to_string(),
            body: "rude".to_string(),
            body_html: "rude".to_string(),
            disabled: true,
            author_id: "u1".to_string(),
            post_id: "p1".to_string(),
            created_at: Utc::now().into(),
        };

        let value = serde_json::to_value(CommentJson::new(&comment, false, &urls())).unwrap();
        assert!(value.get("body").is_none());
        assert!(value.get("body_html").is_none());
        assert_eq!(value["disabled"], true);
        assert_eq!(value["post"], "https://blog.example.com/api/v1/posts/p1");
    }
}
