use super::{
    functions::call, identifiers::double_quote, operators::binary, Adapter, Clauses, Functions,
    Identifiers, InsertSource, OnConflict, Operators, Subqueries, Updates,
};
use crate::{Comma, Sql};

use quarry_core::{stmt::Value, Capability};

/// PostgreSQL dialect: `$n` placeholders, `ILIKE`, array parameters, jsonb
/// operators and data-modifying CTEs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgresql;

impl Adapter for Postgresql {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    fn placeholder(&self, position: usize, dst: &mut String) {
        dst.push('$');
        dst.push_str(&position.to_string());
    }
}

impl Identifiers for Postgresql {
    fn quote(&self, ident: &str) -> String {
        double_quote(ident)
    }
}

impl Operators for Postgresql {
    fn in_list(&self, lhs: Sql, values: Vec<Value>) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " = ANY(", Sql::param(Value::List(values)), ")");
        sql
    }

    fn not_in_list(&self, lhs: Sql, values: Vec<Value>) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " <> ALL(", Sql::param(Value::List(values)), ")");
        sql
    }

    fn like(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " LIKE ", pattern)
    }

    fn ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " ILIKE ", pattern)
    }

    fn not_like(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " NOT LIKE ", pattern)
    }

    fn not_ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " NOT ILIKE ", pattern)
    }
}

impl Functions for Postgresql {
    fn json_object(&self, pairs: Vec<(String, Sql)>) -> Sql {
        let mut args = vec![];
        for (key, value) in pairs {
            args.push(self.literal(&key));
            args.push(value);
        }
        call("json_build_object", args)
    }

    fn json_array_agg(&self, expr: Sql) -> Sql {
        call("json_agg", vec![expr])
    }

    fn json_empty_array(&self) -> Sql {
        Sql::raw("'[]'")
    }

    fn json_param(&self, value: serde_json::Value) -> Sql {
        let mut sql = Sql::param(Value::Json(value));
        fmt!(&mut sql, "::jsonb");
        sql
    }

    fn json_path(&self, expr: Sql, path: &[String], as_text: bool) -> Sql {
        let function = if as_text {
            "jsonb_extract_path_text"
        } else {
            "jsonb_extract_path"
        };

        let mut args = vec![expr];
        args.extend(path.iter().map(|segment| Sql::param(segment.as_str())));
        call(function, args)
    }

    fn json_contains(&self, expr: Sql, value: serde_json::Value) -> Sql {
        binary(expr, " @> ", self.json_param(value))
    }

    fn list_param(&self, values: Vec<Value>) -> Sql {
        Sql::param(Value::List(values))
    }

    fn list_has(&self, list: Sql, value: Value) -> Sql {
        let mut sql = Sql::param(value);
        fmt!(&mut sql, " = ANY(", list, ")");
        sql
    }

    fn list_has_every(&self, list: Sql, values: Vec<Value>) -> Sql {
        binary(list, " @> ", self.list_param(values))
    }

    fn list_has_some(&self, list: Sql, values: Vec<Value>) -> Sql {
        binary(list, " && ", self.list_param(values))
    }

    fn list_is_empty(&self, list: Sql) -> Sql {
        binary(call("cardinality", vec![list]), " = ", Sql::raw("0"))
    }

    fn vector_param(&self, value: Value) -> Sql {
        let mut sql = Sql::param(value);
        fmt!(&mut sql, "::vector");
        sql
    }

    fn point_param(&self, value: Value) -> Sql {
        match value {
            Value::Point { x, y } => call("point", vec![Sql::param(x), Sql::param(y)]),
            other => Sql::param(other),
        }
    }

    fn point_eq(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " ~= ", rhs)
    }

    fn last_insert_id(&self, table: &str, column: &str) -> Sql {
        let sequence = call(
            "pg_get_serial_sequence",
            vec![self.literal(&self.quote(table)), self.literal(column)],
        );
        call("currval", vec![sequence])
    }
}

impl Updates for Postgresql {
    fn push(&self, column: Sql, value: Value) -> Sql {
        match value {
            Value::List(values) => call("array_cat", vec![column, Sql::param(Value::List(values))]),
            value => call("array_append", vec![column, Sql::param(value)]),
        }
    }

    fn merge(&self, column: Sql, value: serde_json::Value) -> Sql {
        binary(column, " || ", self.json_param(value))
    }

    fn set_path(&self, column: Sql, path: &[String], value: serde_json::Value) -> Sql {
        let path = Value::List(path.iter().map(|s| Value::from(s.as_str())).collect());
        call(
            "jsonb_set",
            vec![column, Sql::param(path), self.json_param(value)],
        )
    }
}

impl Subqueries for Postgresql {}

impl Clauses for Postgresql {
    fn insert(
        &self,
        table: &str,
        columns: Vec<String>,
        source: InsertSource,
        on_conflict: OnConflict,
    ) -> Sql {
        let mut sql = Sql::raw("INSERT INTO ");
        fmt!(&mut sql, self.insert_body(table, columns, source));
        on_conflict_clause(self, &mut sql, on_conflict);
        sql
    }
}

/// `ON CONFLICT` as understood by PostgreSQL and SQLite.
pub(super) fn on_conflict_clause(adapter: &dyn Clauses, sql: &mut Sql, on_conflict: OnConflict) {
    match on_conflict {
        OnConflict::Fail => {}
        OnConflict::Ignore => fmt!(sql, " ON CONFLICT DO NOTHING"),
        OnConflict::Update {
            target,
            assignments,
        } => fmt!(
            sql,
            " ON CONFLICT (",
            Comma(target.iter().map(|column| adapter.quote(column))),
            ") DO UPDATE SET ",
            adapter.assignments(assignments)
        ),
    }
}
