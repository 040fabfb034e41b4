//! REST resources of the catalog.
//!
//! Each module pairs the API views of one entity (detail, list and write)
//! with its `CRUDResource` implementation and the generated axum handlers.

pub mod actor;
pub mod cinema_hall;
pub mod genre;
pub mod movie;
pub mod movie_session;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};

/// Identifiers from `ids` with no row in `E`, in request order.
pub(crate) async fn missing_ids<E, C>(
    db: &DatabaseConnection,
    column: C,
    ids: &[i32],
) -> Result<Vec<i32>, DbErr>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let found: Vec<i32> = E::find()
        .select_only()
        .column(column)
        .filter(column.is_in(ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(dedup_ids(
        ids.iter().copied().filter(|id| !found.contains(id)).collect(),
    ))
}

/// Drop repeated identifiers, keeping the first occurrence.
pub(crate) fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(Vec::new()).is_empty());
    }
}
