use sea_orm::{ColumnTrait, Condition, Value};
use serde_json::Map;

fn json_to_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string().into()),
        serde_json::Value::Number(n) => n.as_i64().map(Into::into),
        serde_json::Value::Bool(b) => Some((*b).into()),
        _ => None,
    }
}

/// Translate a JSON `filter` parameter into a query condition.
///
/// Only whitelisted columns take part; unknown keys and values of an
/// unsupported type are ignored. An unparseable filter matches everything.
pub fn apply_filters<C>(
    filter: Option<&str>,
    filterable: &[(&str, C)],
    like_columns: &[&str],
) -> Condition
where
    C: ColumnTrait + Copy,
{
    let Some(filter) = filter else {
        return Condition::all();
    };
    let filters: Map<String, serde_json::Value> = match serde_json::from_str(filter) {
        Ok(filters) => filters,
        Err(err) => {
            tracing::debug!(error = %err, filter, "Ignoring unparseable filter");
            return Condition::all();
        }
    };

    let mut condition = Condition::all();

    if let Some(q) = filters.get("q").and_then(serde_json::Value::as_str) {
        let mut any = Condition::any();
        for (name, column) in filterable {
            if like_columns.contains(name) {
                any = any.add(column.contains(q.trim()));
            }
        }
        condition = condition.add(any);
    }

    for (key, value) in &filters {
        if key == "q" {
            continue;
        }
        let Some(&(name, column)) = filterable.iter().find(|(name, _)| *name == key.as_str()) else {
            continue;
        };

        match value {
            serde_json::Value::String(s) if like_columns.contains(&name) => {
                condition = condition.add(column.contains(s.trim()));
            }
            serde_json::Value::Array(items) => {
                let values: Vec<Value> = items.iter().filter_map(json_to_value).collect();
                condition = condition.add(column.is_in(values));
            }
            other => {
                if let Some(v) = json_to_value(other) {
                    condition = condition.add(column.eq(v));
                }
            }
        }
    }

    condition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::movie;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn sql_for(filter: &str) -> String {
        let filterable = [
            ("id", movie::Column::Id),
            ("title", movie::Column::Title),
            ("duration", movie::Column::Duration),
        ];
        let condition = apply_filters(Some(filter), &filterable, &["title"]);
        movie::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_text_column_uses_like() {
        let sql = sql_for(r#"{"title": "matrix"}"#);
        assert!(sql.contains(r#""title" LIKE '%matrix%'"#), "{sql}");
    }

    #[test]
    fn test_numeric_column_uses_equality() {
        let sql = sql_for(r#"{"duration": 136}"#);
        assert!(sql.contains(r#""duration" = 136"#), "{sql}");
    }

    #[test]
    fn test_array_uses_in() {
        let sql = sql_for(r#"{"id": [1, 2]}"#);
        assert!(sql.contains(r#""id" IN (1, 2)"#), "{sql}");
    }

    #[test]
    fn test_unknown_keys_and_bad_json_are_ignored() {
        let sql = sql_for(r#"{"secret": "x"}"#);
        assert!(!sql.contains(r#""secret""#), "{sql}");
        assert!(!sql.contains("WHERE") || sql.ends_with("WHERE TRUE"), "{sql}");

        let sql = sql_for("{not json");
        assert!(!sql.contains("WHERE") || sql.ends_with("WHERE TRUE"), "{sql}");
    }

    #[test]
    fn test_free_text_search() {
        let sql = sql_for(r#"{"q": "neo"}"#);
        assert!(sql.contains(r#""title" LIKE '%neo%'"#), "{sql}");
        assert!(!sql.contains(r#""duration" LIKE"#), "{sql}");
    }
}
