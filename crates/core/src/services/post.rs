//! Post service.

use crate::content::SetBody;
use crate::json::{PostJson, ResourceUrls};
use crate::permissions::Permission;
use crate::viewer::Viewer;
use chrono::{DateTime, Utc};
use quill_common::{AppError, AppResult, Config, IdGenerator};
use quill_db::{
    entities::post,
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
    urls: ResourceUrls,
}

/// Input for creating or editing a post.
#[derive(Debug, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        user_repo: UserRepository,
        config: &Config,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            user_repo,
            id_gen: IdGenerator::new(),
            urls: ResourceUrls::new(&config.server.api_base_url()),
        }
    }

    /// Publish a post as the viewer. Requires `WRITE`.
    pub async fn create(&self, viewer: &Viewer, input: PostInput) -> AppResult<post::Model> {
        let author = viewer.require(Permission::WRITE)?;
        input.validate()?;

        let post = self
            .insert(author.id(), input.body, Utc::now())
            .await?;
        info!(post_id = %post.id, author_id = %post.author_id, "Created post");
        Ok(post)
    }

    /// Insert a post for `author_id` without permission checks.
    pub async fn insert(
        &self,
        author_id: &str,
        body: String,
        created_at: DateTime<Utc>,
    ) -> AppResult<post::Model> {
        let mut model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            created_at: Set(created_at.into()),
            ..Default::default()
        };
        model.set_body(body);

        self.post_repo.create(model).await
    }

    /// Replace a post's body. Allowed for the author and administrators.
    pub async fn edit(
        &self,
        viewer: &Viewer,
        post_id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        let editor = viewer.require_user()?;
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != editor.id() && !editor.is_administrator() {
            return Err(AppError::insufficient_permissions());
        }

        let mut active: post::ActiveModel = post.into();
        active.set_body(input.body);

        let updated = self.post_repo.update(active).await?;
        debug!(post_id = %updated.id, editor_id = %editor.id(), "Edited post");
        Ok(updated)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// All posts, newest first.
    pub async fn list(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_recent(limit, until_id).await
    }

    /// Posts written by `user_id`, newest first.
    pub async fn list_by_author(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo.find_by_author(user_id, limit, until_id).await
    }

    /// Posts by everyone `user_id` follows, their own included, newest first.
    pub async fn followed_posts(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo.find_followed(user_id, limit, until_id).await
    }

    /// Project a post, counting its comments now.
    pub async fn to_json(&self, post: &post::Model) -> AppResult<PostJson> {
        let comment_count = self.comment_repo.count_by_post(&post.id).await?;
        Ok(PostJson::new(post, comment_count, &self.urls))
    }

    /// Project several posts.
    pub async fn to_json_many(&self, posts: &[post::Model]) -> AppResult<Vec<PostJson>> {
        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            out.push(self.to_json(post).await?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::viewer::tests::{test_user, viewer_with};
    use quill_common::config::{AppConfig, DatabaseConfig, ServerConfig};
    use quill_db::entities::user;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                url: "https://blog.example.com".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            app: AppConfig::default(),
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_service(
        post_db: Arc<DatabaseConnection>,
        comment_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> PostService {
        PostService::new(
            PostRepository::new(post_db),
            CommentRepository::new(comment_db),
            UserRepository::new(user_db),
            &create_test_config(),
        )
    }

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            body: "hello".to_string(),
            body_html: "<p>hello</p>".to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn input(body: &str) -> PostInput {
        PostInput {
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_write() {
        let service = create_test_service(empty_db(), empty_db(), empty_db());

        let anonymous = service.create(&Viewer::Anonymous, input("hi")).await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized)));

        let reader = service
            .create(
                &viewer_with("u1", Permission::FOLLOW | Permission::COMMENT),
                input("hi"),
            )
            .await;
        assert!(matches!(reader, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_body() {
        let service = create_test_service(empty_db(), empty_db(), empty_db());

        let result = service
            .create(&viewer_with("u1", Permission::USER), input(""))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create() {
        let post = create_test_post("p1", "u1");
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db());

        let created = service
            .create(&viewer_with("u1", Permission::USER), input("hello"))
            .await
            .unwrap();
        assert_eq!(created, post);
    }

    #[tokio::test]
    async fn test_edit_by_other_user_forbidden() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "author")]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db());

        let result = service
            .edit(&viewer_with("other", Permission::MODERATOR), "p1", input("x"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_edit_by_administrator() {
        let original = create_test_post("p1", "author");
        let mut edited = original.clone();
        edited.body = "fixed".to_string();
        edited.body_html = "<p>fixed</p>".to_string();

        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[original]])
                .append_query_results([[edited.clone()]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db());

        let result = service
            .edit(
                &viewer_with("admin", Permission::ADMINISTRATOR),
                "p1",
                input("fixed"),
            )
            .await
            .unwrap();
        assert_eq!(result, edited);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), empty_db());

        assert!(matches!(
            service.get("missing").await,
            Err(AppError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_followed_posts_unknown_user() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(empty_db(), empty_db(), user_db);

        assert!(matches!(
            service.followed_posts("ghost", 20, None).await,
            Err(AppError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_followed_posts() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("u1")]])
                .into_connection(),
        );
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p2", "u2"), create_test_post("p1", "u1")]])
                .into_connection(),
        );
        let service = create_test_service(post_db, empty_db(), user_db);

        let posts = service.followed_posts("u1", 20, None).await.unwrap();
        assert!(posts.iter().any(|p| p.author_id == "u1"));
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_to_json_counts_comments() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );
        let service = create_test_service(empty_db(), comment_db, empty_db());

        let json = service
            .to_json(&create_test_post("p1", "u1"))
            .await
            .unwrap();
        assert_eq!(json.comment_count, 3);
        assert_eq!(json.url, "https://blog.example.com/api/v1/posts/p1");
    }
}
