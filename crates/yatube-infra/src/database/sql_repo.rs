//! SeaORM repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Select,
};
use uuid::Uuid;

use yatube_core::domain::{
    CommentEntry, Follow, Group, Post, PostEntry, PostFilter, User,
};
use yatube_core::error::RepoError;
use yatube_core::pagination::{Page, num_pages, resolve_page_number};
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::error::map_db_err;
use super::sql_base::SqlBaseRepository;

pub type SqlUserRepository = SqlBaseRepository<UserEntity>;
pub type SqlGroupRepository = SqlBaseRepository<GroupEntity>;
pub type SqlPostRepository = SqlBaseRepository<PostEntity>;
pub type SqlCommentRepository = SqlBaseRepository<CommentEntity>;
pub type SqlFollowRepository = SqlBaseRepository<FollowEntity>;

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for SqlGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Posts selected by a feed filter, without ordering or limits.
fn filtered_posts(filter: PostFilter) -> Select<PostEntity> {
    let query = PostEntity::find();
    match filter {
        PostFilter::All => query,
        PostFilter::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id)),
        PostFilter::Author(author_id) => query.filter(post::Column::AuthorId.eq(author_id)),
        PostFilter::FollowedBy(user_id) => {
            let followed = FollowEntity::find()
                .select_only()
                .column(follow::Column::AuthorId)
                .filter(follow::Column::UserId.eq(user_id))
                .into_query();
            query.filter(post::Column::AuthorId.in_subquery(followed))
        }
    }
}

impl SqlPostRepository {
    /// Attach authors and groups to posts with one query per table.
    async fn load_entries(&self, posts: Vec<post::Model>) -> Result<Vec<PostEntry>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let group_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.group_id).collect();

        let authors: HashMap<Uuid, User> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        posts
            .into_iter()
            .map(|model| {
                let post: Post = model.into();
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("author of post {} is missing", post.id))
                })?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostEntry {
                    post,
                    author,
                    group,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn page(
        &self,
        filter: PostFilter,
        page: Option<&str>,
        per_page: u64,
    ) -> Result<Page<PostEntry>, RepoError> {
        let per_page = per_page.max(1);
        let query = filtered_posts(filter);

        let count = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let number = resolve_page_number(page, num_pages(count, per_page));
        tracing::debug!(?filter, count, number, "Loading post page");

        let models = query
            .order_by_desc(post::Column::Created)
            .offset((number - 1) * per_page)
            .limit(per_page)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let entries = self.load_entries(models).await?;
        Ok(Page::new(entries, number, per_page, count))
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(self.load_entries(vec![model]).await?.pop())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Created)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!("author of comment {} is missing", comment.id))
                })?;
                Ok(CommentEntry {
                    comment: comment.into(),
                    author: author.into(),
                })
            })
            .collect()
    }
}

fn follow_pair(user_id: Uuid, author_id: Uuid) -> Select<FollowEntity> {
    FollowEntity::find()
        .filter(follow::Column::UserId.eq(user_id))
        .filter(follow::Column::AuthorId.eq(author_id))
}

#[async_trait]
impl FollowRepository for SqlFollowRepository {
    async fn follow(&self, follow: Follow) -> Result<Follow, RepoError> {
        let active: follow::ActiveModel = follow.into();
        let model = active.insert(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::UserId.eq(user_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let count = follow_pair(user_id, author_id)
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }
}
