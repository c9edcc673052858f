//! Fake users and posts for development databases.

use super::post::PostService;
use super::user::{CreateUserInput, UserService};
use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Paragraph;
use fake::faker::name::en::Name;
use quill_common::{AppError, AppResult};
use quill_db::repositories::UserRepository;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// Fake posts are backdated up to this many days.
const POST_AGE_DAYS: i64 = 3650;

/// Outcome of a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeDataReport {
    pub created: u64,
    pub skipped: u64,
}

/// Generates random accounts and posts.
#[derive(Clone)]
pub struct FakeDataGenerator {
    user_service: UserService,
    post_service: PostService,
    user_repo: UserRepository,
}

impl FakeDataGenerator {
    #[must_use]
    pub const fn new(
        user_service: UserService,
        post_service: PostService,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            user_service,
            post_service,
            user_repo,
        }
    }

    /// Create `count` users with random profiles.
    ///
    /// An email that is already taken skips that user and the run continues.
    pub async fn generate_users(&self, count: u64) -> AppResult<FakeDataReport> {
        let mut rng = StdRng::from_entropy();
        let mut report = FakeDataReport::default();

        for _ in 0..count {
            let input = CreateUserInput {
                email: SafeEmail().fake_with_rng(&mut rng),
                name: Some(Name().fake_with_rng(&mut rng)),
                location: Some(CityName().fake_with_rng(&mut rng)),
                about_me: Some(Paragraph(1..3).fake_with_rng(&mut rng)),
                ..Default::default()
            };
            let email = input.email.clone();

            match self.user_service.create(input).await {
                Ok(_) => report.created += 1,
                Err(AppError::Conflict(_)) => {
                    warn!(%email, "Skipping fake user with duplicate email");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(created = report.created, skipped = report.skipped, "Generated fake users");
        Ok(report)
    }

    /// Create `count` posts by random existing users at random past times.
    pub async fn generate_posts(&self, count: u64) -> AppResult<FakeDataReport> {
        let users = self.user_repo.count().await?;
        if users == 0 {
            return Err(AppError::BadRequest(
                "Cannot generate posts without users".to_string(),
            ));
        }

        let mut rng = StdRng::from_entropy();
        let mut report = FakeDataReport::default();

        for _ in 0..count {
            let offset = rng.gen_range(0..users);
            let Some(author) = self.user_repo.find_by_offset(offset).await? else {
                report.skipped += 1;
                continue;
            };

            let age = Duration::seconds(rng.gen_range(0..POST_AGE_DAYS * 86_400));
            let body: String = Paragraph(1..5).fake_with_rng(&mut rng);

            self.post_service
                .insert(&author.id, body, Utc::now() - age)
                .await?;
            report.created += 1;
        }

        info!(created = report.created, skipped = report.skipped, "Generated fake posts");
        Ok(report)
    }
}
