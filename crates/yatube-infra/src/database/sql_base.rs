use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, EntityTrait, IdenStatic, IntoActiveModel,
    Iterable, PrimaryKeyToColumn, PrimaryKeyTrait,
};

use yatube_core::error::RepoError;
use yatube_core::ports::BaseRepository;

use super::error::map_db_err;

/// Links a SeaORM entity to the domain type stored in its table.
pub trait DomainEntity: EntityTrait {
    type Domain: From<Self::Model> + Into<Self::ActiveModel> + Send + Sync + 'static;
}

/// Generic SeaORM repository implementation, usable with any backend the
/// connection was opened for.
pub struct SqlBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> SqlBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// `INSERT .. ON CONFLICT (pk) DO UPDATE` over every non-key column.
fn upsert_on_primary_key<E: EntityTrait>() -> OnConflict {
    let keys: Vec<E::Column> = E::PrimaryKey::iter().map(|k| k.into_column()).collect();
    let updates: Vec<E::Column> = E::Column::iter()
        .filter(|c| !keys.iter().any(|k| k.as_str() == c.as_str()))
        .collect();

    OnConflict::columns(keys).update_columns(updates).to_owned()
}

#[async_trait]
impl<E, ID> BaseRepository<E::Domain, ID> for SqlBaseRepository<E>
where
    E: DomainEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<E::Domain>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: E::Domain) -> Result<E::Domain, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = E::insert(active_model)
            .on_conflict(upsert_on_primary_key::<E>())
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
