//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::{Comment, CommentEntry};
pub use follow::Follow;
pub use group::{Group, slugify};
pub use post::{Post, PostEntry, PostFilter};
pub use user::User;
