use crate::{Comma, Sql};

use quarry_core::stmt::{AggregateFn, Value};

/// Aggregates, JSON construction, and the helpers for the storage formats
/// that differ between databases (lists, documents, vectors, points).
pub trait Functions {
    fn count_all(&self) -> Sql {
        Sql::raw("COUNT(*)")
    }

    fn aggregate(&self, function: AggregateFn, expr: Sql) -> Sql {
        let mut sql = Sql::raw(match function {
            AggregateFn::Count => "COUNT(",
            AggregateFn::Sum => "SUM(",
            AggregateFn::Avg => "AVG(",
            AggregateFn::Min => "MIN(",
            AggregateFn::Max => "MAX(",
        });
        fmt!(&mut sql, expr, ")");
        sql
    }

    fn lower(&self, expr: Sql) -> Sql {
        call("LOWER", vec![expr])
    }

    fn coalesce(&self, operands: Vec<Sql>) -> Sql {
        call("COALESCE", operands)
    }

    /// A JSON object built from `(key, value)` pairs.
    fn json_object(&self, pairs: Vec<(String, Sql)>) -> Sql;

    /// Aggregates row values into a JSON array.
    fn json_array_agg(&self, expr: Sql) -> Sql;

    fn json_empty_array(&self) -> Sql;

    /// Marks a value read back from a subquery as JSON, so it nests as a
    /// document instead of a string when placed inside `json_object`.
    fn json_nested(&self, expr: Sql) -> Sql {
        expr
    }

    /// A JSON document bound as a parameter.
    fn json_param(&self, value: serde_json::Value) -> Sql {
        Sql::param(Value::Json(value))
    }

    /// Extracts the value at `path`. With `as_text`, scalars come back as
    /// text.
    fn json_path(&self, expr: Sql, path: &[String], as_text: bool) -> Sql;

    /// The JSON document `expr` contains `value`.
    fn json_contains(&self, expr: Sql, value: serde_json::Value) -> Sql;

    /// A list of values bound as one parameter.
    fn list_param(&self, values: Vec<Value>) -> Sql {
        self.json_param(Value::List(values).to_json())
    }

    fn list_has(&self, list: Sql, value: Value) -> Sql;

    fn list_has_every(&self, list: Sql, values: Vec<Value>) -> Sql;

    fn list_has_some(&self, list: Sql, values: Vec<Value>) -> Sql;

    fn list_is_empty(&self, list: Sql) -> Sql;

    fn vector_param(&self, value: Value) -> Sql {
        Sql::param(value)
    }

    fn point_param(&self, value: Value) -> Sql {
        Sql::param(value)
    }

    fn point_eq(&self, lhs: Sql, rhs: Sql) -> Sql {
        super::operators::binary(lhs, " = ", rhs)
    }

    /// The key generated by the most recent insert into `table`.
    fn last_insert_id(&self, table: &str, column: &str) -> Sql;
}

pub(super) fn call(name: &str, args: Vec<Sql>) -> Sql {
    let mut sql = Sql::raw(name);
    fmt!(&mut sql, "(", Comma(args), ")");
    sql
}

/// `$."a"."b"[0]` path syntax understood by MySQL and SQLite.
pub(super) fn json_path_string(path: &[String]) -> String {
    let mut out = String::from("$");
    for segment in path {
        if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            out.push_str(".\"");
            out.push_str(&segment.replace('"', "\\\""));
            out.push('"');
        }
    }
    out
}

/// Flattens `values` into a JSON array, wrapping a scalar into a one-element
/// array.
pub(super) fn json_array(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(_) => value,
        other => serde_json::Value::Array(vec![other]),
    }
}
