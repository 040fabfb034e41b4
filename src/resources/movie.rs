use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, LoaderTrait, Order, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::actor::Actor;
use super::genre::Genre;
use super::{dedup_ids, missing_ids};
use crate::core::crud_operations::crud_handlers;
use crate::core::traits::{fetch_by_id, fetch_page};
use crate::core::{CRUDResource, MergeIntoActiveModel, WriteMode};
use crate::entities::{actor, genre, movie, movie_actor, movie_genre};
use crate::errors::ApiError;
use crate::validation::{ValidationError, ValidationErrors, required, validators};

const TITLE_MAX_LENGTH: usize = 255;

/// A movie row with its actors and genres, each ordered by id.
#[derive(Clone, Debug)]
pub struct MovieRecord {
    pub movie: movie::Model,
    pub actors: Vec<actor::Model>,
    pub genres: Vec<genre::Model>,
}

/// Eager-load actors and genres for a page of movies in two queries each.
pub(crate) async fn load_relations<C>(
    db: &C,
    movies: Vec<movie::Model>,
) -> Result<Vec<MovieRecord>, DbErr>
where
    C: ConnectionTrait,
{
    if movies.is_empty() {
        return Ok(Vec::new());
    }
    let actors = movies
        .load_many_to_many(actor::Entity, movie_actor::Entity, db)
        .await?;
    let genres = movies
        .load_many_to_many(genre::Entity, movie_genre::Entity, db)
        .await?;

    Ok(movies
        .into_iter()
        .zip(actors)
        .zip(genres)
        .map(|((movie, mut actors), mut genres)| {
            actors.sort_by_key(|actor| actor.id);
            genres.sort_by_key(|genre| genre.id);
            MovieRecord {
                movie,
                actors,
                genres,
            }
        })
        .collect())
}

/// Detail view: actors and genres nested in full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Minutes
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.movie.id,
            title: record.movie.title,
            description: record.movie.description,
            duration: record.movie.duration,
            genres: record.genres.into_iter().map(Genre::from).collect(),
            actors: record.actors.into_iter().map(Actor::from).collect(),
        }
    }
}

/// List view: genre names and actor full names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MovieList {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl From<MovieRecord> for MovieList {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.movie.id,
            title: record.movie.title,
            description: record.movie.description,
            duration: record.movie.duration,
            genres: record.genres.into_iter().map(|genre| genre.name).collect(),
            actors: record.actors.iter().map(actor::Model::full_name).collect(),
        }
    }
}

/// Write view: actors and genres as identifiers. A supplied list replaces
/// the whole association set.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct MovieWrite {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(minimum = 0)]
    pub duration: Option<i64>,
    pub actors: Option<Vec<i32>>,
    pub genres: Option<Vec<i32>>,
}

impl MergeIntoActiveModel<movie::ActiveModel> for MovieWrite {
    fn merge_into_activemodel(
        self,
        mut existing: movie::ActiveModel,
    ) -> Result<movie::ActiveModel, DbErr> {
        if let Some(title) = self.title {
            existing.title = Set(title);
        }
        if let Some(description) = self.description {
            existing.description = Set(description);
        }
        if let Some(duration) = self.duration {
            let duration = i32::try_from(duration)
                .map_err(|_| DbErr::Type(format!("duration out of range: {duration}")))?;
            existing.duration = Set(duration);
        }
        Ok(existing)
    }
}

impl MovieWrite {
    /// Field checks plus identifier resolution. Runs before any write.
    async fn validate(&self, db: &DatabaseConnection, mode: WriteMode) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();

        if let Some(title) = required(&mut errors, "title", self.title.as_deref(), mode) {
            errors.check(validators::validate_required("title", title));
            errors.check(validators::validate_length("title", title, None, Some(TITLE_MAX_LENGTH)));
        }
        if let Some(description) =
            required(&mut errors, "description", self.description.as_deref(), mode)
        {
            errors.check(validators::validate_required("description", description));
        }
        if let Some(duration) = required(&mut errors, "duration", self.duration, mode) {
            errors.check(validators::validate_positive_integer("duration", duration));
        }

        if let Some(ids) = required(&mut errors, "actors", self.actors.as_deref(), mode) {
            check_related::<actor::Entity, _>(db, &mut errors, "actors", actor::Column::Id, ids)
                .await?;
        }
        if let Some(ids) = required(&mut errors, "genres", self.genres.as_deref(), mode) {
            check_related::<genre::Entity, _>(db, &mut errors, "genres", genre::Column::Id, ids)
                .await?;
        }

        errors.result().map_err(ApiError::from)
    }
}

async fn check_related<E, C>(
    db: &DatabaseConnection,
    errors: &mut ValidationErrors,
    field: &str,
    column: C,
    ids: &[i32],
) -> Result<(), ApiError>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    for id in missing_ids::<E, C>(db, column, ids)
        .await
        .map_err(ApiError::database)?
    {
        errors.add(ValidationError::missing_related(field, id));
    }
    Ok(())
}

/// Replace the association sets that were supplied; `None` leaves a set alone.
async fn replace_links<C>(
    conn: &C,
    movie_id: i32,
    actors: Option<Vec<i32>>,
    genres: Option<Vec<i32>>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if let Some(actors) = actors {
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .exec(conn)
            .await?;
        let rows: Vec<movie_actor::ActiveModel> = dedup_ids(actors)
            .into_iter()
            .map(|actor_id| movie_actor::ActiveModel {
                movie_id: Set(movie_id),
                actor_id: Set(actor_id),
            })
            .collect();
        if !rows.is_empty() {
            movie_actor::Entity::insert_many(rows)
                .exec_without_returning(conn)
                .await?;
        }
    }

    if let Some(genres) = genres {
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(conn)
            .await?;
        let rows: Vec<movie_genre::ActiveModel> = dedup_ids(genres)
            .into_iter()
            .map(|genre_id| movie_genre::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            })
            .collect();
        if !rows.is_empty() {
            movie_genre::Entity::insert_many(rows)
                .exec_without_returning(conn)
                .await?;
        }
    }

    Ok(())
}

#[async_trait]
impl CRUDResource for Movie {
    type EntityType = movie::Entity;
    type ColumnType = movie::Column;
    type Record = MovieRecord;
    type ListModel = MovieList;
    type WriteModel = MovieWrite;

    const ID_COLUMN: Self::ColumnType = movie::Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "movie";
    const RESOURCE_NAME_PLURAL: &'static str = "movies";
    const RESOURCE_DESCRIPTION: &'static str =
        "Movies with their cast and genres. Deleting a movie removes its sessions.";

    async fn fetch_all(
        db: &DatabaseConnection,
        condition: &Condition,
        order_column: Self::ColumnType,
        order_direction: Order,
        pagination: Option<(u64, u64)>,
    ) -> Result<Vec<Self::Record>, DbErr> {
        let movies =
            fetch_page::<movie::Entity, _>(db, condition, order_column, order_direction, pagination)
                .await?;
        load_relations(db, movies).await
    }

    async fn fetch_one(db: &DatabaseConnection, id: i32) -> Result<Self::Record, DbErr> {
        let movie =
            fetch_by_id::<movie::Entity, _>(db, Self::ID_COLUMN, id, Self::RESOURCE_NAME_SINGULAR)
                .await?;
        load_relations(db, vec![movie])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbErr::RecordNotFound(format!("{} not found", Self::RESOURCE_NAME_SINGULAR)))
    }

    async fn create(db: &DatabaseConnection, mut data: Self::WriteModel) -> Result<i32, ApiError> {
        data.validate(db, WriteMode::Create).await?;
        let actors = data.actors.take();
        let genres = data.genres.take();
        let active = data.merge_into_activemodel(movie::ActiveModel::new())?;

        let txn = db.begin().await.map_err(ApiError::database)?;
        let inserted = active.insert(&txn).await.map_err(ApiError::database)?;
        replace_links(&txn, inserted.id, actors, genres)
            .await
            .map_err(ApiError::database)?;
        txn.commit().await.map_err(ApiError::database)?;
        Ok(inserted.id)
    }

    async fn update(
        db: &DatabaseConnection,
        id: i32,
        mut data: Self::WriteModel,
        mode: WriteMode,
    ) -> Result<(), ApiError> {
        let existing = fetch_by_id::<movie::Entity, _>(
            db,
            Self::ID_COLUMN,
            id,
            Self::RESOURCE_NAME_SINGULAR,
        )
        .await
        .map_err(|err| ApiError::from_lookup(err, Self::RESOURCE_NAME_SINGULAR, id))?;
        data.validate(db, mode).await?;
        let actors = data.actors.take();
        let genres = data.genres.take();
        let active = data.merge_into_activemodel(existing.into_active_model())?;

        let txn = db.begin().await.map_err(ApiError::database)?;
        if active.is_changed() {
            active.update(&txn).await.map_err(ApiError::database)?;
        }
        replace_links(&txn, id, actors, genres)
            .await
            .map_err(ApiError::database)?;
        txn.commit().await.map_err(ApiError::database)?;
        Ok(())
    }

    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", movie::Column::Id),
            ("title", movie::Column::Title),
            ("duration", movie::Column::Duration),
        ]
    }

    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![
            ("id", movie::Column::Id),
            ("title", movie::Column::Title),
            ("description", movie::Column::Description),
            ("duration", movie::Column::Duration),
        ]
    }

    fn like_filterable_columns() -> Vec<&'static str> {
        vec!["title", "description"]
    }
}

crud_handlers!(Movie, list = MovieList, write = MovieWrite, tag = "movies");
