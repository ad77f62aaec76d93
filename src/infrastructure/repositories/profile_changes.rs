//! Field mask for partial profile updates.
//!
//! Only the *presence* of a field decides which SET clauses exist; every value
//! travels as a bound parameter and the query builder numbers the placeholders.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, UpdateMany, Value};

use crate::domain::ProfileUpdate;
use crate::models::user::{Column, Entity as UserEntity};

/// Columns to overwrite, in the order they were provided
#[derive(Debug, Default)]
pub struct ProfileChanges {
    assignments: Vec<(Column, Value)>,
}

impl ProfileChanges {
    /// Keep non-empty strings and positive counters; drop everything else.
    pub fn from_update(update: &ProfileUpdate) -> Self {
        let mut changes = Self::default();

        if let Some(bio) = update.bio.as_deref().filter(|b| !b.is_empty()) {
            changes.set(Column::Bio, bio.to_owned().into());
        }
        if let Some(full_name) = update.full_name.as_deref().filter(|n| !n.is_empty()) {
            changes.set(Column::FullName, full_name.to_owned().into());
        }
        if let Some(countries) = update.countries_visited.filter(|c| *c > 0) {
            changes.set(Column::CountriesVisited, countries.into());
        }

        changes
    }

    fn set(&mut self, column: Column, value: Value) {
        self.assignments.push((column, value));
    }

    /// Build the UPDATE for one live user. `updated_at` is always bumped,
    /// even when no profile field was provided.
    pub fn into_update(self, id: &str, updated_at: String) -> UpdateMany<UserEntity> {
        let mut update = UserEntity::update_many();
        for (column, value) in self.assignments {
            update = update.col_expr(column, Expr::value(value));
        }

        update
            .col_expr(Column::UpdatedAt, Expr::value(updated_at))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.eq(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn render(update: ProfileUpdate) -> (String, usize) {
        let stmt = ProfileChanges::from_update(&update)
            .into_update("user-1", "2024-07-16T11:19:28.613112Z".to_string())
            .build(DbBackend::Postgres);
        let bound = stmt.values.map(|v| v.0.len()).unwrap_or(0);
        (stmt.sql, bound)
    }

    #[test]
    fn empty_strings_and_non_positive_counters_are_ignored() {
        let (sql, bound) = render(ProfileUpdate {
            bio: Some(String::new()),
            full_name: Some(String::new()),
            countries_visited: Some(0),
        });

        assert!(sql.contains(r#"SET "updated_at" = $1 WHERE"#), "{sql}");
        assert_eq!(bound, 3);
    }

    #[test]
    fn only_provided_columns_are_set() {
        let (sql, bound) = render(ProfileUpdate {
            bio: None,
            full_name: None,
            countries_visited: Some(5),
        });

        assert!(sql.contains(r#""countries_visited" = $1"#), "{sql}");
        assert!(sql.contains(r#""updated_at" = $2"#), "{sql}");
        assert!(!sql.contains(r#""bio""#), "{sql}");
        assert!(!sql.contains(r#""full_name""#), "{sql}");
        // countries, updated_at, id, deleted_at
        assert_eq!(bound, 4);
    }

    #[test]
    fn placeholders_are_numbered_in_order() {
        let (sql, bound) = render(ProfileUpdate {
            bio: Some("A".to_string()),
            full_name: Some("B".to_string()),
            countries_visited: Some(3),
        });

        assert!(sql.contains(r#""bio" = $1"#), "{sql}");
        assert!(sql.contains(r#""full_name" = $2"#), "{sql}");
        assert!(sql.contains(r#""countries_visited" = $3"#), "{sql}");
        assert!(sql.contains(r#""updated_at" = $4"#), "{sql}");
        assert!(sql.contains(r#""deleted_at" = $6"#), "{sql}");
        assert_eq!(bound, 6);
    }

    #[test]
    fn nothing_provided_still_bumps_updated_at() {
        let (sql, bound) = render(ProfileUpdate::default());

        assert!(sql.contains(r#""updated_at" = $1"#), "{sql}");
        assert_eq!(bound, 3);
    }

    #[test]
    fn values_never_reach_the_sql_text() {
        let (sql, _) = render(ProfileUpdate {
            bio: Some("x'; DROP TABLE users; --".to_string()),
            full_name: Some("Robert".to_string()),
            countries_visited: None,
        });

        assert!(!sql.contains("DROP"), "{sql}");
        assert!(!sql.contains("Robert"), "{sql}");
    }
}
