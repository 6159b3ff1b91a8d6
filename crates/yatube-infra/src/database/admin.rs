//! Change-list queries of the administrative console.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Select,
};
use uuid::Uuid;

use yatube_core::admin::{
    AdminModel, ChangeListQuery, ChangeListRow, LIST_PER_PAGE, ListFilter, ModelAdmin,
};
use yatube_core::domain::Post;
use yatube_core::error::RepoError;
use yatube_core::pagination::{Page, num_pages, resolve_page_number};
use yatube_core::ports::AdminRepository;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::error::map_db_err;

const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Admin queries over the SeaORM entities.
pub struct SqlAdminRepository {
    db: DbConn,
}

impl SqlAdminRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

const LIKE_ESCAPE: char = '\\';

/// Case-insensitive substring match, `lower(col) LIKE %word%`. Wildcards in
/// `word` match literally.
fn icontains<C: ColumnTrait>(column: C, word: &str) -> SimpleExpr {
    let mut pattern = String::from("%");
    for c in word.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');

    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// `fk IN (SELECT id FROM users WHERE <condition on username>)`.
fn user_matches<C: ColumnTrait>(fk: C, username: SimpleExpr) -> SimpleExpr {
    let users = UserEntity::find()
        .select_only()
        .column(user::Column::Id)
        .filter(username)
        .into_query();
    fk.in_subquery(users)
}

/// Every whitespace-separated word must match at least one search field.
fn search_condition(term: &str, field_match: impl Fn(&str) -> Condition) -> Condition {
    term.split_whitespace()
        .fold(Condition::all(), |all, word| all.add(field_match(word)))
}

fn unsupported(filter: &ListFilter, model: AdminModel) -> RepoError {
    RepoError::Query(format!("{filter:?} does not apply to {model}"))
}

fn format_datetime(value: DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

impl SqlAdminRepository {
    /// Count, clamp the page number and fetch one page of models.
    async fn paged<E>(
        &self,
        select: Select<E>,
        page: Option<&str>,
    ) -> Result<(Vec<E::Model>, u64, u64), RepoError>
    where
        E: EntityTrait,
        E::Model: Send + Sync + 'static,
    {
        let count = select.clone().count(&self.db).await.map_err(map_db_err)?;
        let number = resolve_page_number(page, num_pages(count, LIST_PER_PAGE));

        let models = select
            .offset((number - 1) * LIST_PER_PAGE)
            .limit(LIST_PER_PAGE)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((models, number, count))
    }

    async fn usernames(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, String>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
    }

    async fn post_rows(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(term) = &query.search {
            select = select.filter(search_condition(term, |word| {
                Condition::any().add(icontains(post::Column::Text, word))
            }));
        }
        for filter in &query.filters {
            select = match filter {
                ListFilter::Created(facet) => {
                    select.filter(post::Column::Created.gte(facet.since(Utc::now())))
                }
                other => return Err(unsupported(other, admin.model)),
            };
        }

        let (models, number, count) = self
            .paged(select.order_by_desc(post::Column::Created), query.page.as_deref())
            .await?;

        let authors = self
            .usernames(models.iter().map(|p| p.author_id).collect())
            .await?;
        let group_ids: Vec<Uuid> = models.iter().filter_map(|p| p.group_id).collect();
        let groups: HashMap<Uuid, String> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|g| (g.id, g.title))
                .collect()
        };

        let rows = models
            .into_iter()
            .map(|p| ChangeListRow {
                pk: p.id,
                values: vec![
                    p.id.to_string(),
                    admin.display(Some(p.text)),
                    format_datetime(p.created.into()),
                    admin.display(authors.get(&p.author_id).cloned()),
                    admin.display(p.group_id.and_then(|id| groups.get(&id).cloned())),
                ],
            })
            .collect();

        Ok(Page::new(rows, number, LIST_PER_PAGE, count))
    }

    async fn group_rows(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError> {
        let mut select = GroupEntity::find();
        if let Some(term) = &query.search {
            select = select.filter(search_condition(term, |word| {
                Condition::any()
                    .add(icontains(group::Column::Title, word))
                    .add(icontains(group::Column::Description, word))
            }));
        }
        for filter in &query.filters {
            select = match filter {
                ListFilter::Title(title) => select.filter(group::Column::Title.eq(title.as_str())),
                other => return Err(unsupported(other, admin.model)),
            };
        }

        let (models, number, count) = self
            .paged(select.order_by_asc(group::Column::Title), query.page.as_deref())
            .await?;

        let rows = models
            .into_iter()
            .map(|g| ChangeListRow {
                pk: g.id,
                values: vec![
                    g.id.to_string(),
                    admin.display(Some(g.title)),
                    admin.display(Some(g.slug)),
                    admin.display(Some(g.description)),
                ],
            })
            .collect();

        Ok(Page::new(rows, number, LIST_PER_PAGE, count))
    }

    async fn comment_rows(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError> {
        let mut select = CommentEntity::find();
        if let Some(term) = &query.search {
            select = select.filter(search_condition(term, |word| {
                Condition::any()
                    .add(user_matches(
                        comment::Column::AuthorId,
                        icontains(user::Column::Username, word),
                    ))
                    .add(icontains(comment::Column::Text, word))
            }));
        }
        for filter in &query.filters {
            select = match filter {
                ListFilter::Created(facet) => {
                    select.filter(comment::Column::Created.gte(facet.since(Utc::now())))
                }
                other => return Err(unsupported(other, admin.model)),
            };
        }

        let (models, number, count) = self
            .paged(select.order_by_asc(comment::Column::Created), query.page.as_deref())
            .await?;

        let authors = self
            .usernames(models.iter().map(|c| c.author_id).collect())
            .await?;
        let post_ids: Vec<Uuid> = models.iter().filter_map(|c| c.post_id).collect();
        let posts: HashMap<Uuid, String> = if post_ids.is_empty() {
            HashMap::new()
        } else {
            PostEntity::find()
                .filter(post::Column::Id.is_in(post_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|p| (p.id, Post::from(p).to_string()))
                .collect()
        };

        let rows = models
            .into_iter()
            .map(|c| ChangeListRow {
                pk: c.id,
                values: vec![
                    admin.display(c.post_id.and_then(|id| posts.get(&id).cloned())),
                    admin.display(authors.get(&c.author_id).cloned()),
                    admin.display(Some(c.text)),
                    format_datetime(c.created.into()),
                ],
            })
            .collect();

        Ok(Page::new(rows, number, LIST_PER_PAGE, count))
    }

    async fn follow_rows(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError> {
        let mut select = FollowEntity::find();
        if let Some(term) = &query.search {
            select = select.filter(search_condition(term, |word| {
                Condition::any().add(user_matches(
                    follow::Column::AuthorId,
                    icontains(user::Column::Username, word),
                ))
            }));
        }
        for filter in &query.filters {
            select = match filter {
                ListFilter::Author(name) => select.filter(user_matches(
                    follow::Column::AuthorId,
                    user::Column::Username.eq(name.as_str()),
                )),
                ListFilter::User(name) => select.filter(user_matches(
                    follow::Column::UserId,
                    user::Column::Username.eq(name.as_str()),
                )),
                other => return Err(unsupported(other, admin.model)),
            };
        }

        let (models, number, count) = self
            .paged(select.order_by_asc(follow::Column::Created), query.page.as_deref())
            .await?;

        let users = self
            .usernames(
                models
                    .iter()
                    .flat_map(|f| [f.author_id, f.user_id])
                    .collect(),
            )
            .await?;

        let rows = models
            .into_iter()
            .map(|f| ChangeListRow {
                pk: f.id,
                values: vec![
                    admin.display(users.get(&f.author_id).cloned()),
                    admin.display(users.get(&f.user_id).cloned()),
                ],
            })
            .collect();

        Ok(Page::new(rows, number, LIST_PER_PAGE, count))
    }
}

#[async_trait]
impl AdminRepository for SqlAdminRepository {
    async fn change_list(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError> {
        tracing::debug!(model = %admin.model, search = ?query.search, "Building change list");

        match admin.model {
            AdminModel::Post => self.post_rows(admin, query).await,
            AdminModel::Group => self.group_rows(admin, query).await,
            AdminModel::Comment => self.comment_rows(admin, query).await,
            AdminModel::Follow => self.follow_rows(admin, query).await,
        }
    }

    async fn set_post_group(
        &self,
        post_id: Uuid,
        group_id: Option<Uuid>,
    ) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::GroupId, Expr::value(group_id))
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, model: AdminModel, id: Uuid) -> Result<(), RepoError> {
        let result = match model {
            AdminModel::Post => PostEntity::delete_by_id(id).exec(&self.db).await,
            AdminModel::Group => GroupEntity::delete_by_id(id).exec(&self.db).await,
            AdminModel::Comment => CommentEntity::delete_by_id(id).exec(&self.db).await,
            AdminModel::Follow => FollowEntity::delete_by_id(id).exec(&self.db).await,
        }
        .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        tracing::info!(%model, %id, "Deleted from admin");
        Ok(())
    }
}
