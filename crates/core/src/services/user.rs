//! User service.

use crate::json::{ResourceUrls, UserCounts, UserJson};
use crate::permissions::Permission;
use crate::viewer::{AuthenticatedUser, Viewer};
use chrono::Utc;
use quill_common::{AppError, AppResult, Config, IdGenerator};
use quill_db::{
    entities::{follow, user},
    repositories::{FollowRepository, PostRepository, RoleRepository, UserRepository},
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

/// Users fetched per batch when walking every account.
const BATCH_SIZE: u64 = 100;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    follow_repo: FollowRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
    admin_email: Option<String>,
    urls: ResourceUrls,
}

/// Input for creating a new user.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email, length(max = 120))]
    pub email: String,

    #[validate(length(max = 64))]
    pub name: Option<String>,

    #[validate(length(max = 64))]
    pub location: Option<String>,

    #[validate(length(max = 2048))]
    pub about_me: Option<String>,

    #[validate(url, length(max = 200))]
    pub avatar_url: Option<String>,

    /// Explicit role; the default role is chosen when absent.
    pub role_id: Option<String>,
}

/// Profile fields a user may edit on their own account.
///
/// Absent fields are left unchanged; an empty string clears the field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 64))]
    pub name: Option<String>,

    #[validate(length(max = 64))]
    pub location: Option<String>,

    #[validate(length(max = 2048))]
    pub about_me: Option<String>,
}

/// Fields an administrator may edit on any account.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdminUpdateUserInput {
    #[validate(email, length(max = 120))]
    pub email: Option<String>,

    pub role_id: Option<String>,

    #[validate(length(max = 64))]
    pub name: Option<String>,

    #[validate(length(max = 64))]
    pub location: Option<String>,

    #[validate(length(max = 2048))]
    pub about_me: Option<String>,
}

/// Map an edited text field: empty clears it.
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        follow_repo: FollowRepository,
        post_repo: PostRepository,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            follow_repo,
            post_repo,
            id_gen: IdGenerator::new(),
            admin_email: config.app.admin_email.clone(),
            urls: ResourceUrls::new(&config.server.api_base_url()),
        }
    }

    /// Create a new user.
    ///
    /// Without an explicit role, the configured admin email receives the
    /// all-permissions role and everyone else the default role. The account
    /// and its self-follow edge are written together.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let role_id = match input.role_id {
            Some(id) => {
                let role = self
                    .role_repo
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown role: {id}")))?;
                Some(role.id)
            }
            None => self.role_for_email(&input.email).await?,
        };

        if role_id.is_none() {
            warn!(email = %input.email, "No role available; creating user without a role");
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            name: Set(input.name),
            location: Set(input.location),
            about_me: Set(input.about_me),
            avatar_url: Set(input.avatar_url),
            token: Set(Some(self.id_gen.generate_token())),
            role_id: Set(role_id),
            member_since: Set(now.into()),
            last_seen: Set(now.into()),
        };

        let user = self.user_repo.create_with_self_follow(model).await?;
        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn role_for_email(&self, email: &str) -> AppResult<Option<String>> {
        if self.admin_email.as_deref() == Some(email)
            && let Some(admin) = self
                .role_repo
                .find_by_permissions(Permission::ADMINISTRATOR.to_db())
                .await?
        {
            return Ok(Some(admin.id));
        }

        Ok(self.role_repo.find_default().await?.map(|r| r.id))
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Resolve an API token to a user and their role.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<AuthenticatedUser>> {
        let Some(user) = self.user_repo.find_by_token(token).await? else {
            return Ok(None);
        };

        let role = match &user.role_id {
            Some(role_id) => self.role_repo.find_by_id(role_id).await?,
            None => None,
        };

        Ok(Some(AuthenticatedUser::new(user, role)))
    }

    /// Resolve an optional token to the viewer making the request.
    ///
    /// Unknown tokens yield an anonymous viewer.
    pub async fn resolve_viewer(&self, token: Option<&str>) -> AppResult<Viewer> {
        match token {
            Some(token) => Ok(self
                .authenticate_by_token(token)
                .await?
                .map_or(Viewer::Anonymous, Viewer::Authenticated)),
            None => Ok(Viewer::Anonymous),
        }
    }

    /// Record that a user has just been active.
    ///
    /// Returns the new last-seen time.
    pub async fn ping(&self, user_id: &str) -> AppResult<DateTimeWithTimeZone> {
        self.user_repo.touch_last_seen(user_id).await
    }

    /// Edit the signed-in user's own profile.
    pub async fn update_profile(
        &self,
        viewer: &Viewer,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;
        let current = viewer.require_user()?;

        let user = self.user_repo.get_by_id(current.id()).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(optional_text(name));
        }
        if let Some(location) = input.location {
            active.location = Set(optional_text(location));
        }
        if let Some(about_me) = input.about_me {
            active.about_me = Set(optional_text(about_me));
        }

        let updated = self.user_repo.update(active).await?;
        debug!(user_id = %updated.id, "Updated profile");
        Ok(updated)
    }

    /// Edit any account. Requires `ADMINISTER`.
    pub async fn admin_update(
        &self,
        viewer: &Viewer,
        user_id: &str,
        input: AdminUpdateUserInput,
    ) -> AppResult<user::Model> {
        input.validate()?;
        let admin = viewer.require(Permission::ADMINISTER)?;

        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(email) = &input.email
            && email != &user.email
            && self.user_repo.find_by_email(email).await?.is_some()
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        if let Some(role_id) = &input.role_id
            && self.role_repo.find_by_id(role_id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!("Unknown role: {role_id}")));
        }

        let mut active: user::ActiveModel = user.into();

        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(role_id) = input.role_id {
            active.role_id = Set(Some(role_id));
        }
        if let Some(name) = input.name {
            active.name = Set(optional_text(name));
        }
        if let Some(location) = input.location {
            active.location = Set(optional_text(location));
        }
        if let Some(about_me) = input.about_me {
            active.about_me = Set(optional_text(about_me));
        }

        let updated = self.user_repo.update(active).await?;
        info!(user_id = %updated.id, admin_id = %admin.id(), "Administrator updated user");
        Ok(updated)
    }

    /// Give every account lacking one its self-follow edge.
    ///
    /// Returns the number of edges created.
    pub async fn add_self_follows(&self) -> AppResult<u64> {
        let mut created = 0;
        let mut offset = 0;

        loop {
            let users = self.user_repo.find_all(BATCH_SIZE, offset).await?;
            if users.is_empty() {
                break;
            }
            offset += users.len() as u64;

            for user in users {
                if self.follow_repo.is_following(&user.id, &user.id).await? {
                    continue;
                }

                let edge = follow::ActiveModel {
                    follower_id: Set(user.id.clone()),
                    followed_id: Set(user.id.clone()),
                    created_at: Set(Utc::now().into()),
                };
                match self.follow_repo.create(edge).await {
                    Ok(_) => created += 1,
                    Err(AppError::Conflict(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        info!(created, "Backfilled self-follow edges");
        Ok(created)
    }

    /// Project a user, counting posts and follow edges now.
    pub async fn to_json(&self, user: &user::Model) -> AppResult<UserJson> {
        let counts = UserCounts {
            posts: self.post_repo.count_by_author(&user.id).await?,
            followers: self.follow_repo.count_followers(&user.id).await?,
            following: self.follow_repo.count_following(&user.id).await?,
        };
        Ok(UserJson::new(user, counts, &self.urls))
    }

    /// Project several users.
    pub async fn to_json_many(&self, users: &[user::Model]) -> AppResult<Vec<UserJson>> {
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(self.to_json(user).await?);
        }
        Ok(out)
    }
}
