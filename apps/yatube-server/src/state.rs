//! Application state - shared across all handlers.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{DbConn, DbErr};

use yatube_core::ports::{
    AdminRepository, CommentRepository, FollowRepository, GroupRepository, PasswordService,
    PostRepository, TokenService, UserRepository,
};
use yatube_infra::{
    Argon2PasswordService, DatabaseConnections, JwtTokenService, SqlAdminRepository,
    SqlCommentRepository, SqlFollowRepository, SqlGroupRepository, SqlPostRepository,
    SqlUserRepository,
};

use crate::config::AppConfig;
use crate::templates::Templates;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database: {0}")]
    Database(#[from] DbErr),

    #[error("templates: {0}")]
    Templates(#[from] tera::Error),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub admin: Arc<dyn AdminRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Templates,
    pub posts_per_page: u64,
}

impl AppState {
    /// Connect to the store, bring the schema up to date and compile templates.
    pub async fn init(config: &AppConfig) -> Result<Self, StateError> {
        let connections = DatabaseConnections::init(&config.database).await?;

        if config.run_migrations {
            tracing::info!("Applying pending migrations");
            Migrator::up(&connections.main, None).await?;
        }

        let templates = Templates::load(&config.templates_dir)?;

        let state = Self::from_connection(
            connections.main,
            templates,
            Arc::new(JwtTokenService::from_env()),
            Arc::new(Argon2PasswordService::new()),
            config.posts_per_page,
        );

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire every repository to one connection pool.
    pub fn from_connection(
        db: DbConn,
        templates: Templates,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        posts_per_page: u64,
    ) -> Self {
        Self {
            users: Arc::new(SqlUserRepository::new(db.clone())),
            groups: Arc::new(SqlGroupRepository::new(db.clone())),
            posts: Arc::new(SqlPostRepository::new(db.clone())),
            comments: Arc::new(SqlCommentRepository::new(db.clone())),
            follows: Arc::new(SqlFollowRepository::new(db.clone())),
            admin: Arc::new(SqlAdminRepository::new(db)),
            tokens,
            passwords,
            templates,
            posts_per_page,
        }
    }
}
