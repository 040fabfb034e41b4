use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::core::WriteMode;
use crate::errors::ApiError;

pub trait MergeIntoActiveModel<ActiveModelType> {
    /// Merge this write view into an active model.
    ///
    /// Only supplied fields are set, so the same call serves inserts (merged
    /// into a fresh active model) and partial updates (merged into the
    /// existing row).
    ///
    /// # Errors
    ///
    /// Returns a `DbErr` if a value cannot be converted for its column.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// A catalog entity exposed over the REST API.
///
/// The implementing type is the detail view. `Record` is one row together
/// with the related rows its views need, loaded up front so rendering never
/// queries.
#[async_trait]
pub trait CRUDResource: Serialize + From<Self::Record> + Sized + Send + Sync + 'static
where
    Self::EntityType: EntityTrait + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + Copy + std::fmt::Debug + Send + Sync;
    type Record: Send + Sync;
    type ListModel: Serialize + From<Self::Record> + Send + Sync;
    type WriteModel: DeserializeOwned + Send + Sync;

    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;
    /// Shown as the description of the resource's OpenAPI tag.
    const RESOURCE_DESCRIPTION: &'static str = "";

    /// Load one page of records (`None` loads everything).
    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr>;

    /// Load a single record, `DbErr::RecordNotFound` when absent.
    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr>;

    /// Validate and persist a new row, returning its identifier.
    async fn create(db: &DatabaseConnection, data: Self::WriteModel) -> Result<i32, ApiError>;

    /// Validate and apply a write view to an existing row.
    async fn update(
        db: &DatabaseConnection,
        id: i32,
        data: Self::WriteModel,
        mode: WriteMode,
    ) -> Result<(), ApiError>;

    /// Dependent rows go with it through the cascading foreign keys.
    async fn delete(db: &DatabaseConnection, id: i32) -> Result<i32, DbErr> {
        let res = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.eq(id))
            .exec(db)
            .await?;
        match res.rows_affected {
            0 => Err(DbErr::RecordNotFound(format!(
                "{} not found",
                Self::RESOURCE_NAME_SINGULAR
            ))),
            _ => Ok(id),
        }
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        let query = Self::EntityType::find().filter(condition.clone());
        PaginatorTrait::count(query, db).await
    }

    #[must_use]
    fn default_sort() -> (Self::ColumnType, Order) {
        (Self::ID_COLUMN, Order::Asc)
    }

    #[must_use]
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", Self::ID_COLUMN)]
    }

    /// Columns matched as substrings and searched by `q`.
    #[must_use]
    fn like_filterable_columns() -> Vec<&'static str> {
        vec![]
    }
}

/// Plain rows of `E`, filtered, ordered and optionally paginated.
///
/// # Errors
///
/// Propagates any database error.
pub async fn fetch_page<E, C>(
    db: &DatabaseConnection,
    condition: &Condition,
    order_column: C,
    order_direction: Order,
    pagination: Option<(u64, u64)>,
) -> Result<Vec<E::Model>, DbErr>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let mut query = E::find()
        .filter(condition.clone())
        .order_by(order_column, order_direction);
    if let Some((offset, limit)) = pagination {
        query = query.offset(offset).limit(limit);
    }
    query.all(db).await
}

/// One row of `E` by its id column, `DbErr::RecordNotFound` when absent.
///
/// # Errors
///
/// Propagates any database error.
pub async fn fetch_by_id<E, C>(
    db: &DatabaseConnection,
    id_column: C,
    id: i32,
    resource: &str,
) -> Result<E::Model, DbErr>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    E::find()
        .filter(id_column.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("{resource} not found")))
}
