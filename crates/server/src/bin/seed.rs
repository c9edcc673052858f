//! Maintenance commands for a quill database.
//!
//! ```text
//! quill-seed roles
//! quill-seed self-follows
//! quill-seed create-user <email> <name>
//! quill-seed fake-users <count>
//! quill-seed fake-posts <count>
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use quill_api::middleware::AppState;
use quill_common::Config;
use quill_core::{CreateUserInput, FakeDataGenerator};
use quill_db::repositories::UserRepository;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: quill-seed <roles | self-follows | create-user <email> <name> | fake-users <count> | fake-posts <count>>";

enum Command {
    Roles,
    SelfFollows,
    CreateUser { email: String, name: String },
    FakeUsers(u64),
    FakePosts(u64),
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let command = args.next().context(USAGE)?;
        let command = match command.as_str() {
            "roles" => Self::Roles,
            "self-follows" => Self::SelfFollows,
            "create-user" => Self::CreateUser {
                email: args.next().context(USAGE)?,
                name: args.next().context(USAGE)?,
            },
            "fake-users" => Self::FakeUsers(parse_count(args.next())?),
            "fake-posts" => Self::FakePosts(parse_count(args.next())?),
            other => bail!("Unknown command: {other}\n{USAGE}"),
        };
        if args.next().is_some() {
            bail!("Too many arguments\n{USAGE}");
        }
        Ok(command)
    }
}

fn parse_count(arg: Option<String>) -> anyhow::Result<u64> {
    let arg = arg.context(USAGE)?;
    arg.parse()
        .with_context(|| format!("Invalid count: {arg}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=info".into()),
        )
        .init();

    let command = Command::parse(std::env::args().skip(1))?;

    let config = Config::load()?;
    let db = Arc::new(quill_db::init(&config).await?);
    quill_db::migrate(&db).await?;
    let state = AppState::new(Arc::clone(&db), &config);

    match command {
        Command::Roles => {
            for role in state.role_service.seed_roles().await? {
                info!(name = %role.name, permissions = role.permissions, "Role");
            }
        }
        Command::SelfFollows => {
            let created = state.user_service.add_self_follows().await?;
            info!(created, "Self-follows added");
        }
        Command::CreateUser { email, name } => {
            state.role_service.seed_roles().await?;
            let user = state
                .user_service
                .create(CreateUserInput {
                    email,
                    name: Some(name),
                    ..Default::default()
                })
                .await?;
            println!("{}", user.token.unwrap_or_default());
        }
        Command::FakeUsers(count) => {
            state.role_service.seed_roles().await?;
            let report = generator(&state, db).generate_users(count).await?;
            info!(created = report.created, skipped = report.skipped, "Done");
        }
        Command::FakePosts(count) => {
            let report = generator(&state, db).generate_posts(count).await?;
            info!(created = report.created, skipped = report.skipped, "Done");
        }
    }

    Ok(())
}

fn generator(state: &AppState, db: Arc<sea_orm::DatabaseConnection>) -> FakeDataGenerator {
    FakeDataGenerator::new(
        state.user_service.clone(),
        state.post_service.clone(),
        UserRepository::new(db),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Command> {
        Command::parse(args.iter().map(ToString::to_string))
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(parse(&["roles"]).unwrap(), Command::Roles));
        assert!(matches!(
            parse(&["fake-posts", "25"]).unwrap(),
            Command::FakePosts(25)
        ));
        assert!(matches!(
            parse(&["create-user", "a@example.com", "Ada"]).unwrap(),
            Command::CreateUser { .. }
        ));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["fake-users", "many"]).is_err());
        assert!(parse(&["create-user", "a@example.com"]).is_err());
        assert!(parse(&["roles", "extra"]).is_err());
        assert!(parse(&["drop-tables"]).is_err());
    }
}
