//! Relational persistence through SeaORM.

pub mod admin;
mod connections;
pub mod entity;
mod error;
mod sql_base;
pub mod sql_repo;

pub use admin::SqlAdminRepository;
pub use connections::{DatabaseConfig, DatabaseConnections};
pub use sql_base::{DomainEntity, SqlBaseRepository};
pub use sql_repo::{
    SqlCommentRepository, SqlFollowRepository, SqlGroupRepository, SqlPostRepository,
    SqlUserRepository,
};

#[cfg(test)]
mod tests;
