//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`.
//! This crate contains the relational store and authentication services.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `database` - PostgreSQL / SQLite persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication

#[cfg(feature = "database")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "database")]
pub use database::{
    DatabaseConfig, DatabaseConnections, SqlAdminRepository, SqlCommentRepository,
    SqlFollowRepository, SqlGroupRepository, SqlPostRepository, SqlUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
