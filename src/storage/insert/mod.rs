//! INSERT statement construction.
//!
//! One parameterized statement per record:
//! `INSERT INTO <table>(<columns>) VALUES(<placeholders>)`.

mod placeholders;

pub use placeholders::{placeholder_list, PlaceholderCache};

/// Formats the INSERT statement for a single record.
///
/// `columns` is the record's comma-joined column list and `placeholders` the
/// cached marker list for its arity.
pub(crate) fn build_insert_query(table: &str, columns: &str, placeholders: &str) -> String {
    format!("INSERT INTO {}({}) VALUES({})", table, columns, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_insert_query() {
        let cache = PlaceholderCache::new(3);
        assert_eq!(
            build_insert_query("logs", "a,b", cache.get(2).unwrap()),
            "INSERT INTO logs(a,b) VALUES($1,$2)"
        );
    }

    #[test]
    fn test_build_insert_query_schema_qualified() {
        assert_eq!(
            build_insert_query("public.events", "tag", "$1"),
            "INSERT INTO public.events(tag) VALUES($1)"
        );
    }
}
