use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Display name overriding `first_name last_name`
    pub name: Option<String>,
}

impl Model {
    /// The display name when set, otherwise `"{first_name} {last_name}"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_actor::Entity")]
    MovieActor,
}

impl Related<super::movie_actor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieActor.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_actor::Relation::Movie.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_actor::Relation::Actor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(name: Option<&str>) -> Model {
        Model {
            id: 1,
            first_name: "Keanu".to_string(),
            last_name: "Reeves".to_string(),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_full_name_is_derived_without_display_name() {
        assert_eq!(actor(None).full_name(), "Keanu Reeves");
    }

    #[test]
    fn test_empty_display_name_is_ignored() {
        assert_eq!(actor(Some("")).full_name(), "Keanu Reeves");
    }

    #[test]
    fn test_display_name_wins() {
        assert_eq!(actor(Some("Neo")).full_name(), "Neo");
    }
}
