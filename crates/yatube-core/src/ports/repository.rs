use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, CommentEntry, Follow, Group, Post, PostEntry, PostFilter, User};
use crate::error::RepoError;
use crate::pagination::Page;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// Every group, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of posts matching `filter`, newest first, with authors and
    /// groups loaded. `page` is the raw page parameter; out-of-range values
    /// select the last page and garbage selects the first.
    async fn page(
        &self,
        filter: PostFilter,
        page: Option<&str>,
        per_page: u64,
    ) -> Result<Page<PostEntry>, RepoError>;

    /// A single post with its author and group.
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Record a subscription. A repeated pair fails with
    /// [`RepoError::Constraint`].
    async fn follow(&self, follow: Follow) -> Result<Follow, RepoError>;

    /// Remove a subscription. Returns whether one existed.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;
}
