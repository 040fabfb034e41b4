//! # cinema-catalog
//!
//! A REST catalog for a cinema: movies, actors, genres, cinema halls and the
//! sessions scheduled in them. Entities live in a relational database behind
//! Sea-ORM and are served through Axum with three representations per
//! resource (list, detail and write).
//!
//! ```rust,ignore
//! use cinema_catalog::{build_router, migration::Migrator};
//! use sea_orm_migration::MigratorTrait;
//!
//! let db = sea_orm::Database::connect("sqlite::memory:").await?;
//! Migrator::up(&db, None).await?;
//! let app = build_router(&db);
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod resources;
pub mod routes;
pub mod validation;

pub use config::Config;
pub use crate::core::{Action, CRUDResource, MergeIntoActiveModel, Representation, View, WriteMode};
pub use errors::ApiError;
pub use routes::{API_PREFIX, build_router};
