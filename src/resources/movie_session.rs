use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, LoaderTrait, Order, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cinema_hall::CinemaHall;
use super::missing_ids;
use super::movie::{MovieList, MovieRecord, load_relations};
use crate::core::crud_operations::crud_handlers;
use crate::core::traits::{fetch_by_id, fetch_page};
use crate::core::{CRUDResource, MergeIntoActiveModel, WriteMode};
use crate::entities::{cinema_hall, movie, movie_session};
use crate::errors::ApiError;
use crate::validation::{ValidationError, ValidationErrors, required};

#[derive(Clone, Debug)]
pub struct MovieSessionRecord {
    pub session: movie_session::Model,
    pub movie: MovieRecord,
    pub cinema_hall: cinema_hall::Model,
}

async fn load_records<C>(
    db: &C,
    sessions: Vec<movie_session::Model>,
) -> Result<Vec<MovieSessionRecord>, DbErr>
where
    C: ConnectionTrait,
{
    if sessions.is_empty() {
        return Ok(Vec::new());
    }
    let movies = sessions
        .load_one(movie::Entity, db)
        .await?
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| DbErr::Custom("movie session references a missing movie".to_string()))?;
    let movies = load_relations(db, movies).await?;
    let halls = sessions.load_one(cinema_hall::Entity, db).await?;

    sessions
        .into_iter()
        .zip(movies)
        .zip(halls)
        .map(|((session, movie), hall)| {
            let cinema_hall = hall.ok_or_else(|| {
                DbErr::Custom("movie session references a missing cinema hall".to_string())
            })?;
            Ok(MovieSessionRecord {
                session,
                movie,
                cinema_hall,
            })
        })
        .collect()
}

/// Detail view: the movie in its list view and the full hall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MovieSession {
    pub id: i32,
    pub show_time: DateTime<Utc>,
    pub movie: MovieList,
    pub cinema_hall: CinemaHall,
}

impl From<MovieSessionRecord> for MovieSession {
    fn from(record: MovieSessionRecord) -> Self {
        Self {
            id: record.session.id,
            show_time: record.session.show_time,
            movie: MovieList::from(record.movie),
            cinema_hall: CinemaHall::from(record.cinema_hall),
        }
    }
}

/// List view, flattened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MovieSessionList {
    pub id: i32,
    pub show_time: DateTime<Utc>,
    pub movie_title: String,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i64,
}

impl From<MovieSessionRecord> for MovieSessionList {
    fn from(record: MovieSessionRecord) -> Self {
        let cinema_hall_capacity = record.cinema_hall.capacity();
        Self {
            id: record.session.id,
            show_time: record.session.show_time,
            movie_title: record.movie.movie.title,
            cinema_hall_name: record.cinema_hall.name,
            cinema_hall_capacity,
        }
    }
}

/// Write view. `show_time` must carry a UTC offset.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct MovieSessionWrite {
    pub show_time: Option<DateTime<Utc>>,
    pub movie: Option<i32>,
    pub cinema_hall: Option<i32>,
}

impl MergeIntoActiveModel<movie_session::ActiveModel> for MovieSessionWrite {
    fn merge_into_activemodel(
        self,
        mut existing: movie_session::ActiveModel,
    ) -> Result<movie_session::ActiveModel, DbErr> {
        if let Some(show_time) = self.show_time {
            existing.show_time = Set(show_time);
        }
        if let Some(movie_id) = self.movie {
            existing.movie_id = Set(movie_id);
        }
        if let Some(cinema_hall_id) = self.cinema_hall {
            existing.cinema_hall_id = Set(cinema_hall_id);
        }
        Ok(existing)
    }
}

impl MovieSessionWrite {
    async fn validate(&self, db: &DatabaseConnection, mode: WriteMode) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();

        required(&mut errors, "show_time", self.show_time, mode);
        if let Some(id) = required(&mut errors, "movie", self.movie, mode) {
            check_exists::<movie::Entity, _>(db, &mut errors, "movie", movie::Column::Id, id)
                .await?;
        }
        if let Some(id) = required(&mut errors, "cinema_hall", self.cinema_hall, mode) {
            check_exists::<cinema_hall::Entity, _>(
                db,
                &mut errors,
                "cinema_hall",
                cinema_hall::Column::Id,
                id,
            )
            .await?;
        }

        errors.result().map_err(ApiError::from)
    }
}

async fn check_exists<E, C>(
    db: &DatabaseConnection,
    errors: &mut ValidationErrors,
    field: &str,
    column: C,
    id: i32,
) -> Result<(), ApiError>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let missing = missing_ids::<E, C>(db, column, &[id])
        .await
        .map_err(ApiError::database)?;
    if !missing.is_empty() {
        errors.add(ValidationError::missing_related(field, id));
    }
    Ok(())
}

#[async_trait]
impl CRUDResource for MovieSession {
    type EntityType = movie_session::Entity;
    type ColumnType = movie_session::Column;
    type Record = MovieSessionRecord;
    type ListModel = MovieSessionList;
    type WriteModel = MovieSessionWrite;

    const ID_COLUMN: Self::ColumnType = movie_session::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "movie_session";
    const RESOURCE_NAME_PLURAL: &'static str = "movie_sessions";
    const RESOURCE_DESCRIPTION: &'static str =
        "Scheduled screenings of a movie in a cinema hall, latest first.";

    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr> {
        let sessions = fetch_page::<movie_session::Entity, _>(
            db,
            condition,
            order_column,
            order_direction,
            pagination,
        )
        .await?;
        load_records(db, sessions).await
    }

    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr> {
        let session = fetch_by_id::<movie_session::Entity, _>(
            db,
            Self::ID_COLUMN,
            id,
            Self::RESOURCE_NAME_SINGULAR,
        )
        .await?;
        load_records(db, vec![session])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::RESOURCE_NAME_SINGULAR)))
    }

    async fn create(db: &DatabaseConnection, data: Self::WriteModel) -> Result<i32, ApiError> {
        data.validate(db, WriteMode::Create).await?;
        let active = data.merge_into_activemodel(movie_session::ActiveModel::new())?;
        let inserted = active.insert(db).await.map_err(ApiError::database)?;
        Ok(inserted.id)
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        data: Self::WriteModel,
        mode: WriteMode,
    ) -> Result<(), ApiError> {
        let existing = fetch_by_id::<movie_session::Entity, _>(
            db,
            Self::ID_COLUMN,
            id,
            Self::RESOURCE_NAME_SINGULAR,
        )
        .await
        .map_err(|err| ApiError::from_lookup(err, Self::RESOURCE_NAME_SINGULAR, id))?;
        data.validate(db, mode).await?;

        let active = data.merge_into_activemodel(existing.into_active_model())?;
        if active.is_changed() {
            active.update(db).await.map_err(ApiError::database)?;
        }
        Ok(())
    }

    fn default_sort() -> (Self::ColumnType, Order) {
        (movie_session::Column::ShowTime, Order::Desc)
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", movie_session::Column::Id),
            ("show_time", movie_session::Column::ShowTime),
            ("movie", movie_session::Column::MovieId),
            ("cinema_hall", movie_session::Column::CinemaHallId),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", movie_session::Column::Id),
            ("movie", movie_session::Column::MovieId),
            ("cinema_hall", movie_session::Column::CinemaHallId),
        ]
    }
}

crud_handlers!(
    MovieSession,
    list = MovieSessionList,
    write = MovieSessionWrite,
    tag = "movie_sessions"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{actor, genre};
    use chrono::TimeZone;

    fn record() -> MovieSessionRecord {
        MovieSessionRecord {
            session: movie_session::Model {
                id: 5,
                show_time: Utc.with_ymd_and_hms(2024, 5, 1, 20, 30, 0).unwrap(),
                movie_id: 1,
                cinema_hall_id: 2,
            },
            movie: MovieRecord {
                movie: movie::Model {
                    id: 1,
                    title: "Alien".to_string(),
                    description: "In space no one can hear you scream.".to_string(),
                    duration: 117,
                },
                actors: vec![actor::Model {
                    id: 1,
                    first_name: "Sigourney".to_string(),
                    last_name: "Weaver".to_string(),
                    name: None,
                }],
                genres: vec![genre::Model {
                    id: 1,
                    name: "Horror".to_string(),
                }],
            },
            cinema_hall: cinema_hall::Model {
                id: 2,
                name: "Red".to_string(),
                rows: 10,
                seats_in_row: 12,
            },
        }
    }

    #[test]
    fn test_list_view_is_flat() {
        let list = MovieSessionList::from(record());
        assert_eq!(list.movie_title, "Alien");
        assert_eq!(list.cinema_hall_name, "Red");
        assert_eq!(list.cinema_hall_capacity, 120);
    }

    #[test]
    fn test_detail_view_nests_movie_list_view() {
        let detail = serde_json::to_value(MovieSession::from(record())).unwrap();
        assert_eq!(detail["movie"]["actors"][0], "Sigourney Weaver");
        assert_eq!(detail["cinema_hall"]["capacity"], 120);
        assert_eq!(detail["show_time"], "2024-05-01T20:30:00Z");
    }

    #[test]
    fn test_naive_show_time_is_rejected() {
        let parsed: Result<MovieSessionWrite, _> =
            serde_json::from_str(r#"{"show_time": "2024-05-01T20:30:00", "movie": 1, "cinema_hall": 1}"#);
        assert!(parsed.is_err());
    }
}
