use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, DatabaseConnection, DbErr, IntoActiveModel,
    Order, Set,
};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use utoipa::ToSchema;

use crate::core::crud_operations::crud_handlers;
use crate::core::traits::{fetch_by_id, fetch_page};
use crate::core::{CRUDResource, MergeIntoActiveModel, WriteMode};
use crate::entities::actor;
use crate::errors::ApiError;
use crate::validation::{ValidationErrors, required, validators};

const PERSON_NAME_MAX_LENGTH: usize = 100;
const DISPLAY_NAME_MAX_LENGTH: usize = 255;

/// An actor in the list and detail views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub name: Option<String>,
    /// `name` when set, otherwise `"{first_name} {last_name}"`
    pub full_name: String,
}

impl From<actor::Model> for Actor {
    fn from(model: actor::Model) -> Self {
        let full_name = model.full_name();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            name: model.name,
            full_name,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ActorWrite {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Absent leaves the stored value alone, `null` clears it
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
}

impl MergeIntoActiveModel<actor::ActiveModel> for ActorWrite {
    fn merge_into_activemodel(
        self,
        mut existing: actor::ActiveModel,
    ) -> Result<actor::ActiveModel, DbErr> {
        if let Some(first_name) = self.first_name {
            existing.first_name = Set(first_name);
        }
        if let Some(last_name) = self.last_name {
            existing.last_name = Set(last_name);
        }
        if let Some(name) = self.name {
            existing.name = Set(name);
        }
        Ok(existing)
    }
}

impl ActorWrite {
    fn validate(&self, mode: WriteMode) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, value) in [
            ("first_name", self.first_name.as_deref()),
            ("last_name", self.last_name.as_deref()),
        ] {
            if let Some(value) = required(&mut errors, field, value, mode) {
                errors.check(validators::validate_required(field, value));
                errors.check(validators::validate_length(
                    field,
                    value,
                    None,
                    Some(PERSON_NAME_MAX_LENGTH),
                ));
            }
        }

        // optional, blank allowed
        if let Some(Some(name)) = &self.name {
            errors.check(validators::validate_length(
                "name",
                name,
                None,
                Some(DISPLAY_NAME_MAX_LENGTH),
            ));
        }

        errors.result()
    }
}

#[async_trait]
impl CRUDResource for Actor {
    type EntityType = actor::Entity;
    type ColumnType = actor::Column;
    type Record = actor::Model;
    type ListModel = Actor;
    type WriteModel = ActorWrite;

    const ID_COLUMN: Self::ColumnType = actor::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "actor";
    const RESOURCE_NAME_PLURAL: &'static str = "actors";
    const RESOURCE_DESCRIPTION: &'static str =
        "Actors, shown by their display name or first and last name.";

    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr> {
        fetch_page::<actor::Entity, _>(db, condition, order_column, order_direction, pagination)
            .await
    }

    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr> {
        fetch_by_id::<actor::Entity, _>(db, Self::ID_COLUMN, id, Self::RESOURCE_NAME_SINGULAR).await
    }

    async fn create(db: &DatabaseConnection, data: Self::WriteModel) -> Result<i32, ApiError> {
        data.validate(WriteMode::Create)?;
        let mut active = data.merge_into_activemodel(actor::ActiveModel::new())?;
        if active.name.is_not_set() {
            active.name = Set(None);
        }
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

        let replace = mode == WriteMode::Replace && data.name.is_none();
        let mut active = data.merge_into_activemodel(existing.into_active_model())?;
        // a replacing write without `name` resets it
        if replace {
            active.name = Set(None);
        }
        if active.is_changed() {
            active.update(db).await.map_err(ApiError::database)?;
        }
        Ok(())
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", actor::Column::Id),
            ("first_name", actor::Column::FirstName),
            ("last_name", actor::Column::LastName),
            ("name", actor::Column::Name),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", actor::Column::Id),
            ("first_name", actor::Column::FirstName),
            ("last_name", actor::Column::LastName),
            ("name", actor::Column::Name),
        ]
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["first_name", "last_name", "name"]
    }
}

crud_handlers!(Actor, list = Actor, write = ActorWrite, tag = "actors");
