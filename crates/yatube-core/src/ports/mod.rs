//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod admin;
mod auth;
mod repository;

pub use admin::AdminRepository;
pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use repository::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
    UserRepository,
};
