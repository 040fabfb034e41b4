//! Generic CRUD operations shared by every resource, and the `crud_handlers!`
//! macro that wraps them in concrete, OpenAPI-annotated axum handlers.

use axum::http::HeaderMap;
use sea_orm::DatabaseConnection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::core::{Action, CRUDResource, Representation, View, WriteMode, render};
use crate::errors::ApiError;
use crate::filtering::{
    FilterOptions, apply_filters, calculate_content_range, parse_pagination, parse_sorting,
};
use crate::validation::NON_FIELD_ERRORS;

/// `GET /`: every matching record in the list view.
///
/// # Errors
///
/// Returns `ApiError::Database` when the query fails.
pub async fn get_all<T: CRUDResource>(
    db: &DatabaseConnection,
    params: &FilterOptions,
) -> Result<(HeaderMap, Vec<Representation<T>>), ApiError> {
    let pagination = parse_pagination(params);
    let condition = apply_filters(
        params.filter.as_deref(),
        &T::filterable_columns(),
        &T::like_filterable_columns(),
    );
    let (order_column, order_direction) =
        parse_sorting(params, &T::sortable_columns(), T::default_sort());

    let records = T::fetch_all(db, &condition, order_column, order_direction, pagination)
        .await
        .map_err(ApiError::database)?;
    let total_count = T::total_count(db, &condition)
        .await
        .map_err(ApiError::database)?;

    let offset = pagination.map_or(0, |(offset, _)| offset);
    let headers = calculate_content_range(
        offset,
        records.len() as u64,
        total_count,
        T::RESOURCE_NAME_PLURAL,
    );
    tracing::debug!(
        resource = T::RESOURCE_NAME_PLURAL,
        returned = records.len(),
        total_count,
        "Listed records"
    );

    let view = Action::List.view().unwrap_or(View::List);
    let items = records
        .into_iter()
        .map(|record| render::<T>(record, view))
        .collect();
    Ok((headers, items))
}

/// `GET /{id}`: one record in the detail view.
///
/// # Errors
///
/// `NotFound` when the id does not exist.
pub async fn get_one<T: CRUDResource>(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Representation<T>, ApiError> {
    respond::<T>(db, id, Action::Retrieve).await
}

/// `POST /`: validate the write view, insert, answer with the detail view.
///
/// # Errors
///
/// `ValidationFailed` naming every bad field.
pub async fn create_one<T: CRUDResource>(
    db: &DatabaseConnection,
    data: T::WriteModel,
) -> Result<Representation<T>, ApiError> {
    let id = T::create(db, data).await?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, id, "Created record");
    respond::<T>(db, id, Action::Create).await
}

/// `PUT /{id}` and `PATCH /{id}`.
///
/// # Errors
///
/// `NotFound` before any validation when the id does not exist,
/// `ValidationFailed` otherwise.
pub async fn update_one<T: CRUDResource>(
    db: &DatabaseConnection,
    id: i32,
    data: T::WriteModel,
    action: Action,
) -> Result<Representation<T>, ApiError> {
    let mode = action.write_mode().unwrap_or(WriteMode::Replace);
    T::update(db, id, data, mode).await?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, id, ?mode, "Updated record");
    respond::<T>(db, id, action).await
}

/// `DELETE /{id}`.
///
/// # Errors
///
/// `NotFound` when the id does not exist.
pub async fn delete_one<T: CRUDResource>(db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
    T::delete(db, id)
        .await
        .map_err(|err| ApiError::from_lookup(err, T::RESOURCE_NAME_SINGULAR, id))?;
    tracing::debug!(resource = T::RESOURCE_NAME_SINGULAR, id, "Deleted record");
    Ok(())
}

async fn respond<T: CRUDResource>(
    db: &DatabaseConnection,
    id: i32,
    action: Action,
) -> Result<Representation<T>, ApiError> {
    let record = T::fetch_one(db, id)
        .await
        .map_err(|err| ApiError::from_lookup(err, T::RESOURCE_NAME_SINGULAR, id))?;
    let view = action.view().unwrap_or(View::Detail);
    Ok(render::<T>(record, view))
}

/// Identifiers that do not parse are reported the same way as missing rows.
///
/// # Errors
///
/// `NotFound` when the path segment is not an integer.
pub fn parse_id(
    path: Result<axum::extract::Path<i32>, axum::extract::rejection::PathRejection>,
    resource: &str,
) -> Result<i32, ApiError> {
    path.map(|axum::extract::Path(id)| id)
        .map_err(|_| ApiError::not_found(resource, None))
}

/// Decode a request body into a write view, reporting type errors under the
/// offending field.
///
/// # Errors
///
/// `ValidationFailed` keyed by field, or by `non_field_errors` when the body
/// is not a JSON object.
pub fn decode_body<W: DeserializeOwned>(body: &Value) -> Result<W, ApiError> {
    if !body.is_object() {
        return Err(ApiError::invalid_field(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                kind_of(body)
            ),
        ));
    }

    serde_path_to_error::deserialize(body).map_err(|err| {
        let path = err.path();
        let field = path
            .iter()
            .find_map(|segment| match segment {
                Segment::Map { key } => Some(key.clone()),
                _ => None,
            })
            .unwrap_or_else(|| NON_FIELD_ERRORS.to_string());
        let in_list = path
            .iter()
            .any(|segment| matches!(segment, Segment::Seq { .. }));
        let received = value_at(body, path).map_or("NoneType", kind_of);
        let message = type_error_message(&err.inner().to_string(), in_list, received);
        tracing::debug!(field, error = %err.inner(), "Rejected request body");
        ApiError::invalid_field(field, message)
    })
}

fn type_error_message(error: &str, in_list: bool, received: &str) -> String {
    let expects_integer = ["expected i32", "expected i64", "expected u32", "expected u64"]
        .iter()
        .any(|expected| error.contains(expected));

    if expects_integer && in_list {
        format!("Incorrect type. Expected pk value, received {received}.")
    } else if expects_integer {
        "A valid integer is required.".to_string()
    } else if error.contains("expected a string") {
        "Not a valid string.".to_string()
    } else if error.contains("expected a sequence") {
        format!("Expected a list of items but got type \"{received}\".")
    } else if error.starts_with("input ")
        || error.contains("premature end of input")
        || error.contains("trailing input")
        || error.contains("date and time")
    {
        "Datetime has wrong format. Use one of these formats instead: \
         YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z]."
            .to_string()
    } else {
        "Invalid value.".to_string()
    }
}

fn value_at<'a>(body: &'a Value, path: &serde_path_to_error::Path) -> Option<&'a Value> {
    path.iter().try_fold(body, |value, segment| match segment {
        Segment::Map { key } => value.get(key),
        Segment::Seq { index } => value.get(*index),
        _ => None,
    })
}

/// Type names as clients of the original API see them.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Generates `get_all_handler`, `get_one_handler`, `create_one_handler`,
/// `update_one_handler`, `partial_update_one_handler`, `delete_one_handler`
/// and `router()` for a resource in the calling module.
macro_rules! crud_handlers {
    ($resource:ty, list = $list:ty, write = $write:ty, tag = $tag:literal) => {
        #[utoipa::path(
            get,
            path = "/",
            tag = $tag,
            params(crate::filtering::FilterOptions),
            responses(
                (status = 200, description = "Every matching record in the list view", body = [$list]),
                (status = 500, description = "Internal Server Error")
            )
        )]
        pub async fn get_all_handler(
            axum::extract::Query(params): axum::extract::Query<crate::filtering::FilterOptions>,
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
        ) -> Result<
            (
                axum::http::HeaderMap,
                axum::Json<Vec<crate::core::Representation<$resource>>>,
            ),
            crate::errors::ApiError,
        > {
            let (headers, items) =
                crate::core::crud_operations::get_all::<$resource>(&db, &params).await?;
            Ok((headers, axum::Json(items)))
        }

        #[utoipa::path(
            get,
            path = "/{id}",
            tag = $tag,
            params(("id" = i32, Path, description = "Record identifier")),
            responses(
                (status = 200, description = "The record in the detail view", body = $resource),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn get_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<i32>, axum::extract::rejection::PathRejection>,
        ) -> Result<axum::Json<crate::core::Representation<$resource>>, crate::errors::ApiError>
        {
            let id = crate::core::crud_operations::parse_id(
                path,
                <$resource as crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
            )?;
            crate::core::crud_operations::get_one::<$resource>(&db, id)
                .await
                .map(axum::Json)
        }

        #[utoipa::path(
            post,
            path = "/",
            tag = $tag,
            request_body = $write,
            responses(
                (status = 201, description = "Created, returned in the detail view", body = $resource),
                (status = 400, description = "Field-keyed validation errors")
            )
        )]
        pub async fn create_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            payload: Result<axum::Json<serde_json::Value>, axum::extract::rejection::JsonRejection>,
        ) -> Result<
            (
                axum::http::StatusCode,
                axum::Json<crate::core::Representation<$resource>>,
            ),
            crate::errors::ApiError,
        > {
            let axum::Json(body) = payload?;
            let data = crate::core::crud_operations::decode_body::<$write>(&body)?;
            let created = crate::core::crud_operations::create_one::<$resource>(&db, data).await?;
            Ok((axum::http::StatusCode::CREATED, axum::Json(created)))
        }

        #[utoipa::path(
            put,
            path = "/{id}",
            tag = $tag,
            params(("id" = i32, Path, description = "Record identifier")),
            request_body = $write,
            responses(
                (status = 200, description = "Replaced, returned in the detail view", body = $resource),
                (status = 400, description = "Field-keyed validation errors"),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn update_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<i32>, axum::extract::rejection::PathRejection>,
            payload: Result<axum::Json<serde_json::Value>, axum::extract::rejection::JsonRejection>,
        ) -> Result<axum::Json<crate::core::Representation<$resource>>, crate::errors::ApiError>
        {
            let id = crate::core::crud_operations::parse_id(
                path,
                <$resource as crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
            )?;
            let axum::Json(body) = payload?;
            let data = crate::core::crud_operations::decode_body::<$write>(&body)?;
            crate::core::crud_operations::update_one::<$resource>(
                &db,
                id,
                data,
                crate::core::Action::Update,
            )
            .await
            .map(axum::Json)
        }

        #[utoipa::path(
            patch,
            path = "/{id}",
            tag = $tag,
            params(("id" = i32, Path, description = "Record identifier")),
            request_body = $write,
            responses(
                (status = 200, description = "Updated, returned in the detail view", body = $resource),
                (status = 400, description = "Field-keyed validation errors"),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn partial_update_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<i32>, axum::extract::rejection::PathRejection>,
            payload: Result<axum::Json<serde_json::Value>, axum::extract::rejection::JsonRejection>,
        ) -> Result<axum::Json<crate::core::Representation<$resource>>, crate::errors::ApiError>
        {
            let id = crate::core::crud_operations::parse_id(
                path,
                <$resource as crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
            )?;
            let axum::Json(body) = payload?;
            let data = crate::core::crud_operations::decode_body::<$write>(&body)?;
            crate::core::crud_operations::update_one::<$resource>(
                &db,
                id,
                data,
                crate::core::Action::PartialUpdate,
            )
            .await
            .map(axum::Json)
        }

        #[utoipa::path(
            delete,
            path = "/{id}",
            tag = $tag,
            params(("id" = i32, Path, description = "Record identifier")),
            responses(
                (status = 204, description = "Deleted along with dependent records"),
                (status = 404, description = "Not found")
            )
        )]
        pub async fn delete_one_handler(
            axum::extract::State(db): axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<i32>, axum::extract::rejection::PathRejection>,
        ) -> Result<axum::http::StatusCode, crate::errors::ApiError> {
            let id = crate::core::crud_operations::parse_id(
                path,
                <$resource as crate::core::CRUDResource>::RESOURCE_NAME_SINGULAR,
            )?;
            crate::core::crud_operations::delete_one::<$resource>(&db, id).await?;
            Ok(axum::http::StatusCode::NO_CONTENT)
        }

        pub fn router(db: &sea_orm::DatabaseConnection) -> utoipa_axum::router::OpenApiRouter {
            use utoipa_axum::routes;

            utoipa_axum::router::OpenApiRouter::new()
                .routes(routes!(get_all_handler, create_one_handler))
                .routes(routes!(
                    get_one_handler,
                    update_one_handler,
                    partial_update_one_handler,
                    delete_one_handler
                ))
                .with_state(db.clone())
        }
    };
}

pub(crate) use crud_handlers;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        title: Option<String>,
        #[allow(dead_code)]
        duration: Option<i64>,
        #[allow(dead_code)]
        actors: Option<Vec<i32>>,
    }

    fn field_errors(body: Value) -> serde_json::Value {
        match decode_body::<Sample>(&body).unwrap_err() {
            ApiError::ValidationFailed { errors } => serde_json::to_value(errors.field_map()).unwrap(),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_scalar_types_are_keyed_by_field() {
        assert_eq!(
            field_errors(json!({"duration": "abc"})),
            json!({"duration": ["A valid integer is required."]})
        );
        assert_eq!(
            field_errors(json!({"title": 42})),
            json!({"title": ["Not a valid string."]})
        );
    }

    #[test]
    fn test_list_errors_name_the_received_type() {
        assert_eq!(
            field_errors(json!({"actors": [1, "two"]})),
            json!({"actors": ["Incorrect type. Expected pk value, received str."]})
        );
        assert_eq!(
            field_errors(json!({"actors": 3})),
            json!({"actors": ["Expected a list of items but got type \"int\"."]})
        );
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(
            field_errors(json!([1, 2])),
            json!({"non_field_errors": ["Invalid data. Expected a dictionary, but got list."]})
        );
    }

    #[test]
    fn test_well_typed_body_decodes() {
        let sample: Sample = decode_body(&json!({"title": "Alien", "actors": [1]})).unwrap();
        assert_eq!(sample.actors, Some(vec![1]));
    }
}
