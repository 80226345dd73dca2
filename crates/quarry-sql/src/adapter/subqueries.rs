use super::{Functions, Operators};
use crate::Sql;

/// Correlation predicates and the wrappers that turn a correlated inner
/// query into a single JSON value.
pub trait Subqueries: Operators + Functions {
    /// `inner.a = outer.a AND ..` for each `(inner, outer)` pair.
    fn correlation(&self, pairs: Vec<(Sql, Sql)>) -> Sql {
        self.and(
            pairs
                .into_iter()
                .map(|(inner, outer)| self.eq(inner, outer))
                .collect(),
        )
    }

    /// `(SELECT <object> FROM (<inner>) AS alias)`. `inner` returns at most
    /// one row, so the result is one object or NULL.
    fn to_one(&self, object: Sql, inner: Sql, alias: &str) -> Sql {
        let mut sql = Sql::raw("(SELECT ");
        fmt!(&mut sql, object, " FROM ", inner.parenthesized(), " AS ", alias, ")");
        sql
    }

    /// `(SELECT COALESCE(<array agg>, <empty array>) FROM (<inner>) AS alias)`.
    /// Never NULL: no related rows yield an empty array.
    fn to_many(&self, object: Sql, inner: Sql, alias: &str) -> Sql {
        let array = self.coalesce(vec![self.json_array_agg(object), self.json_empty_array()]);

        let mut sql = Sql::raw("(SELECT ");
        fmt!(&mut sql, array, " FROM ", inner.parenthesized(), " AS ", alias, ")");
        sql
    }

    /// A subquery used as a scalar expression.
    fn scalar(&self, query: Sql) -> Sql {
        query.parenthesized()
    }
}
