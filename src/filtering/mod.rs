//! # Listing options
//!
//! Translates collection query parameters into Sea-ORM conditions, ordering
//! and slices. Everything here is opt-in: a bare `GET /movies` returns every
//! movie in the default order.
//!
//! ```rust,ignore
//! GET /api/cinema/movies?filter={"title":"matrix"}&sort_by=duration&order=DESC
//! GET /api/cinema/movie_sessions?page=2&per_page=20
//! ```

pub mod conditions;
pub mod pagination;
pub mod query_parser;
pub mod sort;

pub use conditions::apply_filters;
pub use pagination::{calculate_content_range, parse_pagination, parse_range};
pub use query_parser::FilterOptions;
pub use sort::parse_sorting;
