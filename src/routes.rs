use std::collections::BTreeMap;

use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa::openapi::tag::{Tag, TagBuilder};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

use crate::core::CRUDResource;
use crate::resources::{
    actor::{self, Actor},
    cinema_hall::{self, CinemaHall},
    genre::{self, Genre},
    movie::{self, Movie},
    movie_session::{self, MovieSession},
};

pub const API_PREFIX: &str = "/api/cinema";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cinema catalog",
        description = "Movies, actors, genres, cinema halls and movie sessions."
    )
)]
struct ApiDoc;

fn resource_tag<T: CRUDResource>() -> Tag {
    TagBuilder::new()
        .name(T::RESOURCE_NAME_PLURAL)
        .description(Some(T::RESOURCE_DESCRIPTION))
        .build()
}

fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.tags = Some(vec![
        resource_tag::<Genre>(),
        resource_tag::<Actor>(),
        resource_tag::<CinemaHall>(),
        resource_tag::<Movie>(),
        resource_tag::<MovieSession>(),
    ]);
    doc
}

fn collection_path<T: CRUDResource>() -> String {
    format!("{API_PREFIX}/{}", T::RESOURCE_NAME_PLURAL)
}

/// Every collection keyed by its name.
async fn api_root() -> Json<BTreeMap<&'static str, String>> {
    Json(BTreeMap::from([
        (Genre::RESOURCE_NAME_PLURAL, collection_path::<Genre>()),
        (Actor::RESOURCE_NAME_PLURAL, collection_path::<Actor>()),
        (CinemaHall::RESOURCE_NAME_PLURAL, collection_path::<CinemaHall>()),
        (Movie::RESOURCE_NAME_PLURAL, collection_path::<Movie>()),
        (MovieSession::RESOURCE_NAME_PLURAL, collection_path::<MovieSession>()),
    ]))
}

/// The full application: every resource under [`API_PREFIX`], the API root,
/// and the OpenAPI document rendered by Scalar at `/docs`.
pub fn build_router(db: &DatabaseConnection) -> Router {
    let (router, apidocs) = OpenApiRouter::with_openapi(api_doc())
        .nest(&collection_path::<Genre>(), genre::router(db))
        .nest(&collection_path::<Actor>(), actor::router(db))
        .nest(&collection_path::<CinemaHall>(), cinema_hall::router(db))
        .nest(&collection_path::<Movie>(), movie::router(db))
        .nest(&collection_path::<MovieSession>(), movie_session::router(db))
        .split_for_parts();

    router
        .route(API_PREFIX, get(api_root))
        .merge(Scalar::with_url("/docs", apidocs))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
