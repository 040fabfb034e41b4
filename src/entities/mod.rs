//! Sea-ORM entities for the cinema catalog.
//!
//! Movies relate to actors and genres through the `movie_actors` and
//! `movie_genres` junction tables; sessions reference a movie and a hall.
//! Every foreign key cascades on delete.

pub mod actor;
pub mod cinema_hall;
pub mod genre;
pub mod movie;
pub mod movie_actor;
pub mod movie_genre;
pub mod movie_session;
