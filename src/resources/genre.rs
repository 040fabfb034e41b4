use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, Order, QueryFilter, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::crud_operations::crud_handlers;
use crate::core::traits::{fetch_by_id, fetch_page};
use crate::core::{CRUDResource, MergeIntoActiveModel, WriteMode};
use crate::entities::genre;
use crate::errors::ApiError;
use crate::validation::{ValidationError, ValidationErrors, required, validators};

const NAME_MAX_LENGTH: usize = 255;

/// A genre; the same shape serves the list and detail views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl From<genre::Model> for Genre {
    fn from(model: genre::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct GenreWrite {
    pub name: Option<String>,
}

impl MergeIntoActiveModel<genre::ActiveModel> for GenreWrite {
    fn merge_into_activemodel(
        self,
        mut existing: genre::ActiveModel,
    ) -> Result<genre::ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = Set(name);
        }
        Ok(existing)
    }
}

fn duplicate_name() -> ValidationError {
    ValidationError::new("name", "genre with this name already exists.")
}

/// Unique-constraint races that slip past the pre-check still report on `name`.
fn map_write_error(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            let mut errors = ValidationErrors::new();
            errors.add(duplicate_name());
            ApiError::validation_failed(errors)
        }
        _ => ApiError::database(err),
    }
}

impl GenreWrite {
    async fn validate(
        &self,
        db: &DatabaseConnection,
        mode: WriteMode,
        current_id: Option<i32>,
    ) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = required(&mut errors, "name", self.name.as_deref(), mode) {
            errors.check(validators::validate_required("name", name));
            errors.check(validators::validate_length("name", name, None, Some(NAME_MAX_LENGTH)));

            if !errors.has_field("name") {
                let mut taken = genre::Entity::find().filter(genre::Column::Name.eq(name));
                if let Some(id) = current_id {
                    taken = taken.filter(genre::Column::Id.ne(id));
                }
                if taken.one(db).await.map_err(ApiError::database)?.is_some() {
                    errors.add(duplicate_name());
                }
            }
        }

        errors.result().map_err(ApiError::from)
    }
}

#[async_trait]
impl CRUDResource for Genre {
    type EntityType = genre::Entity;
    type ColumnType = genre::Column;
    type Record = genre::Model;
    type ListModel = Genre;
    type WriteModel = GenreWrite;

    const ID_COLUMN: Self::ColumnType = genre::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "genre";
    const RESOURCE_NAME_PLURAL: &'static str = "genres";
    const RESOURCE_DESCRIPTION: &'static str = "Movie genres, unique by name.";

    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr> {
        fetch_page::<genre::Entity, _>(db, condition, order_column, order_direction, pagination)
            .await
    }

    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr> {
        fetch_by_id::<genre::Entity, _>(db, Self::ID_COLUMN, id, Self::RESOURCE_NAME_SINGULAR).await
    }

    async fn create(db: &DatabaseConnection, data: Self::WriteModel) -> Result<i32, ApiError> {
        data.validate(db, WriteMode::Create, None).await?;
        let active = data.merge_into_activemodel(genre::ActiveModel::new())?;
        let inserted = active.insert(db).await.map_err(map_write_error)?;
        Ok(inserted.id)
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        data: Self::WriteModel,
        mode: WriteMode,
    ) -> Result<(), ApiError> {
        let existing = Self::fetch_one(db, id)
            .await
            .map_err(|err| ApiError::from_lookup(err, Self::RESOURCE_NAME_SINGULAR, id))?;
        data.validate(db, mode, Some(id)).await?;

        let active = data.merge_into_activemodel(existing.into_active_model())?;
        if active.is_changed() {
            active.update(db).await.map_err(map_write_error)?;
        }
        Ok(())
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", genre::Column::Id), ("name", genre::Column::Name)]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![("id", genre::Column::Id), ("name", genre::Column::Name)]
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["name"]
    }
}

crud_handlers!(Genre, list = Genre, write = GenreWrite, tag = "genres");
