use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, DatabaseConnection, DbErr, IntoActiveModel,
    Order, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::crud_operations::crud_handlers;
use crate::core::traits::{fetch_by_id, fetch_page};
use crate::core::{CRUDResource, MergeIntoActiveModel, WriteMode};
use crate::entities::cinema_hall;
use crate::errors::ApiError;
use crate::validation::{ValidationErrors, required, validators};

const NAME_MAX_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CinemaHall {
    pub id: i32,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    /// `rows * seats_in_row`
    pub capacity: i64,
}

impl From<cinema_hall::Model> for CinemaHall {
    fn from(model: cinema_hall::Model) -> Self {
        let capacity = model.capacity();
        Self {
            id: model.id,
            name: model.name,
            rows: model.rows,
            seats_in_row: model.seats_in_row,
            capacity,
        }
    }
}

/// Counts are read wide so out-of-range input is reported per field.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CinemaHallWrite {
    pub name: Option<String>,
    #[schema(minimum = 0)]
    pub rows: Option<i64>,
    #[schema(minimum = 0)]
    pub seats_in_row: Option<i64>,
}

fn narrow(field: &str, value: i64) -> Result<i32, DbErr> {
    i32::try_from(value).map_err(|_| DbErr::Type(format!("{field} out of range: {value}")))
}

impl MergeIntoActiveModel<cinema_hall::ActiveModel> for CinemaHallWrite {
    fn merge_into_activemodel(
        self,
        mut existing: cinema_hall::ActiveModel,
    ) -> Result<cinema_hall::ActiveModel, DbErr> {
        if let Some(name) = self.name {
            existing.name = Set(name);
        }
        if let Some(rows) = self.rows {
            existing.rows = Set(narrow("rows", rows)?);
        }
        if let Some(seats_in_row) = self.seats_in_row {
            existing.seats_in_row = Set(narrow("seats_in_row", seats_in_row)?);
        }
        Ok(existing)
    }
}

impl CinemaHallWrite {
    fn validate(&self, mode: WriteMode) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = required(&mut errors, "name", self.name.as_deref(), mode) {
            errors.check(validators::validate_required("name", name));
            errors.check(validators::validate_length("name", name, None, Some(NAME_MAX_LENGTH)));
        }
        for (field, value) in [("rows", self.rows), ("seats_in_row", self.seats_in_row)] {
            if let Some(value) = required(&mut errors, field, value, mode) {
                errors.check(validators::validate_positive_integer(field, value));
            }
        }

        errors.result()
    }
}

#[async_trait]
impl CRUDResource for CinemaHall {
    type EntityType = cinema_hall::Entity;
    type ColumnType = cinema_hall::Column;
    type Record = cinema_hall::Model;
    type ListModel = CinemaHall;
    type WriteModel = CinemaHallWrite;

    const ID_COLUMN: Self::ColumnType = cinema_hall::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "cinema_hall";
    const RESOURCE_NAME_PLURAL: &'static str = "cinema_halls";
    const RESOURCE_DESCRIPTION: &'static str =
        "Screening rooms laid out as rows of seats; capacity is derived.";

    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr> {
        fetch_page::<cinema_hall::Entity, _>(
            db,
            condition,
            order_column,
            order_direction,
            pagination,
        )
        .await
    }

    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr> {
        fetch_by_id::<cinema_hall::Entity, _>(db, Self::ID_COLUMN, id, Self::RESOURCE_NAME_SINGULAR)
            .await
    }

    async fn create(db: &DatabaseConnection, data: Self::WriteModel) -> Result<i32, ApiError> {
        data.validate(WriteMode::Create)?;
        let active = data.merge_into_activemodel(cinema_hall::ActiveModel::new())?;
        let inserted = active.insert(db).await.map_err(ApiError::database)?;
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
        data.validate(mode)?;

        let active = data.merge_into_activemodel(existing.into_active_model())?;
        if active.is_changed() {
            active.update(db).await.map_err(ApiError::database)?;
        }
        Ok(())
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", cinema_hall::Column::Id),
            ("name", cinema_hall::Column::Name),
            ("rows", cinema_hall::Column::Rows),
            ("seats_in_row", cinema_hall::Column::SeatsInRow),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        Self::sortable_columns()
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["name"]
    }
}

crud_handlers!(
    CinemaHall,
    list = CinemaHall,
    write = CinemaHallWrite,
    tag = "cinema_halls"
);
