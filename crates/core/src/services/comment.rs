//! Comment service.
//!
//! Comments belong to a post. Moderators can disable a comment, which hides
//! its body from everyone else without deleting it.

use crate::content::SetBody;
use crate::json::{CommentJson, ResourceUrls};
use crate::permissions::Permission;
use crate::viewer::Viewer;
use chrono::Utc;
use quill_common::{AppResult, Config, IdGenerator};
use quill_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
    urls: ResourceUrls,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        config: &Config,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
            urls: ResourceUrls::new(&config.server.api_base_url()),
        }
    }

    /// Comment on a post as the viewer. Requires `COMMENT`.
    pub async fn create(
        &self,
        viewer: &Viewer,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        let author = viewer.require(Permission::COMMENT)?;
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;

        let mut model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            disabled: Set(false),
            author_id: Set(author.id().to_string()),
            post_id: Set(post.id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        model.set_body(input.body);

        let comment = self.comment_repo.create(model).await?;
        debug!(comment_id = %comment.id, post_id = %comment.post_id, "Created comment");
        Ok(comment)
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// Comments on a post, oldest first.
    pub async fn list_for_post(
        &self,
        post_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, since_id).await
    }

    /// Comments on every post, newest first.
    pub async fn list_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_recent(limit, until_id).await
    }

    /// Enable or disable a comment. Requires `MODERATE`.
    pub async fn set_disabled(
        &self,
        viewer: &Viewer,
        comment_id: &str,
        disabled: bool,
    ) -> AppResult<comment::Model> {
        let moderator = viewer.require(Permission::MODERATE)?;
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.disabled == disabled {
            return Ok(comment);
        }

        let mut active: comment::ActiveModel = comment.into();
        active.disabled = Set(disabled);
        let updated = self.comment_repo.update(active).await?;

        info!(
            comment_id = %updated.id,
            moderator_id = %moderator.id(),
            disabled,
            "Moderated comment"
        );
        Ok(updated)
    }

    /// Project a comment for `viewer`.
    ///
    /// Disabled comments keep their body only for viewers who can moderate.
    #[must_use]
    pub fn to_json(&self, comment: &comment::Model, viewer: &Viewer) -> CommentJson {
        let show_body = !comment.disabled || viewer.can(Permission::MODERATE);
        CommentJson::new(comment, show_body, &self.urls)
    }

    /// Project several comments for `viewer`.
    #[must_use]
    pub fn to_json_many(&self, comments: &[comment::Model], viewer: &Viewer) -> Vec<CommentJson> {
        comments.iter().map(|c| self.to_json(c, viewer)).collect()
    }
}
