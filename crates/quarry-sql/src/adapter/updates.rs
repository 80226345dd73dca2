use super::{operators::binary, Functions};
use crate::Sql;

use quarry_core::stmt::Value;

/// Right-hand sides of `SET column = ..` for each update operator.
pub trait Updates: Functions {
    fn increment(&self, column: Sql, value: Sql) -> Sql {
        binary(column, " + ", value)
    }

    fn decrement(&self, column: Sql, value: Sql) -> Sql {
        binary(column, " - ", value)
    }

    fn multiply(&self, column: Sql, value: Sql) -> Sql {
        binary(column, " * ", value)
    }

    fn divide(&self, column: Sql, value: Sql) -> Sql {
        binary(column, " / ", value)
    }

    /// Appends a value, or every value of a list, to a list column.
    fn push(&self, column: Sql, value: Value) -> Sql;

    /// Shallow-merges a JSON object into a JSON column.
    fn merge(&self, column: Sql, value: serde_json::Value) -> Sql;

    /// Replaces the value at `path` inside a JSON column.
    fn set_path(&self, column: Sql, path: &[String], value: serde_json::Value) -> Sql;
}
