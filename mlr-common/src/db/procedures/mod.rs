//! Stored-procedure layer
//!
//! One typed value per named procedure. Each runs on a single connection
//! inside the transaction opened by [`crate::db::Gateway::call`] and signals
//! application errors through [`crate::db::StoreCode`].

pub mod admin;
pub mod collaboration;
pub mod contributor;
pub mod dashboard;
pub mod employee;
pub mod person;
pub mod record_label;
pub mod song;

pub use person::RoleCreation;

/// `LIKE` filter clause that is skipped when its parameter is NULL
///
/// Placeholders are numbered (`?1`, `?2`...) so one bound value serves both
/// references in the clause.
pub(crate) fn like_filter(column: &str, param: usize) -> String {
    format!("(?{param} IS NULL OR {column} LIKE '%' || ?{param} || '%')")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_filter_reuses_placeholder() {
        assert_eq!(
            like_filter("name", 2),
            "(?2 IS NULL OR name LIKE '%' || ?2 || '%')"
        );
    }
}
