use sea_orm::{ColumnTrait, sea_query::Order};

use super::FilterOptions;

/// Parse sort column and order from JSON array format
fn parse_json_sort(json: &str) -> Option<(String, Option<String>)> {
    let sort_vec: Vec<String> = serde_json::from_str(json).ok()?;
    let column = sort_vec.first()?.clone();
    Some((column, sort_vec.get(1).cloned()))
}

fn parse_order(sort_order: &str) -> Option<Order> {
    match sort_order.to_uppercase().as_str() {
        "ASC" => Some(Order::Asc),
        "DESC" => Some(Order::Desc),
        _ => None,
    }
}

/// Resolve the requested ordering against the resource's sortable columns.
///
/// Accepts `sort_by=col&order=DESC`, `sort=["col","DESC"]` and `sort=col`.
/// Unknown columns fall back to `default`; a known column without an order
/// sorts ascending.
pub fn parse_sorting<C>(
    params: &FilterOptions,
    sortable: &[(&str, C)],
    default: (C, Order),
) -> (C, Order)
where
    C: ColumnTrait + Copy,
{
    let requested = if let Some(sort_by) = &params.sort_by {
        Some((sort_by.clone(), params.order.clone()))
    } else if let Some(sort) = &params.sort {
        if sort.starts_with('[') {
            parse_json_sort(sort)
        } else {
            Some((sort.clone(), params.order.clone()))
        }
    } else {
        None
    };

    let Some((column_name, order)) = requested else {
        return default;
    };

    let Some(&(_, column)) = sortable.iter().find(|(name, _)| *name == column_name) else {
        return default;
    };

    let direction = order.as_deref().and_then(parse_order).unwrap_or(Order::Asc);
    (column, direction)
}
