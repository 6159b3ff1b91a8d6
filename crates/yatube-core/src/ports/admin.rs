use async_trait::async_trait;
use uuid::Uuid;

use crate::admin::{AdminModel, ChangeListQuery, ChangeListRow, ModelAdmin};
use crate::error::RepoError;
use crate::pagination::Page;

/// Queries behind the administrative console.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Rows of a model's change list after search and filters are applied.
    async fn change_list(
        &self,
        admin: &ModelAdmin,
        query: &ChangeListQuery,
    ) -> Result<Page<ChangeListRow>, RepoError>;

    /// In-place edit of a post's group from the change list.
    async fn set_post_group(&self, post_id: Uuid, group_id: Option<Uuid>)
    -> Result<(), RepoError>;

    /// Delete any registered entity.
    async fn delete(&self, model: AdminModel, id: Uuid) -> Result<(), RepoError>;
}
