//! Shared fixtures for handler and view tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use uuid::Uuid;

use yatube_core::domain::{Group, Post, User};
use yatube_core::pagination::POSTS_PER_PAGE;
use yatube_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::config::DEFAULT_TEMPLATES_DIR;
use crate::middleware::auth::Identity;
use crate::state::AppState;
use crate::templates::Templates;

pub const PASSWORD: &str = "correct-horse-battery";

/// A migrated in-memory database holding user `auth`, group `Test_slug`
/// and one post by `auth` in that group.
pub struct Fixture {
    pub state: AppState,
    pub author: User,
    pub group: Group,
    pub post: Post,
}

impl Fixture {
    pub async fn new() -> Self {
        let opts = ConnectOptions::new("sqlite::memory:")
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false)
            .to_owned();
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let state = AppState::from_connection(
            db,
            Templates::load(DEFAULT_TEMPLATES_DIR).unwrap(),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(Argon2PasswordService::new()),
            POSTS_PER_PAGE,
        );

        let author = state
            .users
            .save(User::new("auth".into(), "!".into()))
            .await
            .unwrap();
        let group = state
            .groups
            .save(Group::new(
                "Тестовая группа".into(),
                "Test_slug".into(),
                "Тестовое описание".into(),
            ))
            .await
            .unwrap();

        let mut post = Post::new(author.id, "Тестовый пост".into(), Some(group.id));
        post.created = Utc::now() - Duration::minutes(1);
        let post = state.posts.save(post).await.unwrap();

        Self {
            state,
            author,
            group,
            post,
        }
    }

    /// A user without a usable password.
    pub async fn user(&self, username: &str, is_staff: bool) -> User {
        let mut user = User::new(username.into(), "!".into());
        user.is_staff = is_staff;
        self.state.users.save(user).await.unwrap()
    }

    /// A user who can log in with [`PASSWORD`].
    pub async fn user_with_password(&self, username: &str) -> User {
        let hash = self.state.passwords.hash(PASSWORD).unwrap();
        self.state
            .users
            .save(User::new(username.into(), hash))
            .await
            .unwrap()
    }

    /// Another post by the fixture author.
    pub async fn post(&self, text: &str, group_id: Option<Uuid>) -> Post {
        self.state
            .posts
            .save(Post::new(self.author.id, text.into(), group_id))
            .await
            .unwrap()
    }

    pub fn identity(&self, user: &User) -> Identity {
        Identity {
            user_id: user.id,
            username: user.username.clone(),
            roles: user.roles(),
        }
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(&self, user: &User) -> String {
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username, user.roles())
            .unwrap();
        format!("Bearer {token}")
    }
}
