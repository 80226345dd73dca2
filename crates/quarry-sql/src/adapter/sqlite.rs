use super::{
    functions::{call, json_array, json_path_string},
    identifiers::double_quote,
    operators::{binary, escape_like},
    postgresql::on_conflict_clause,
    Adapter, Clauses, Functions, Identifiers, InsertSource, OnConflict, Operators,
    PatternPosition, Subqueries, Updates,
};
use crate::Sql;

use quarry_core::{
    stmt::{QueryMode, Value},
    Capability,
};

/// SQLite dialect: `?n` placeholders, `GLOB` for case-sensitive matching,
/// lists stored as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Adapter for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn placeholder(&self, position: usize, dst: &mut String) {
        dst.push('?');
        dst.push_str(&position.to_string());
    }
}

impl Identifiers for Sqlite {
    fn quote(&self, ident: &str) -> String {
        double_quote(ident)
    }
}

impl Operators for Sqlite {
    // LIKE ignores ASCII case in SQLite, GLOB does not.
    fn like(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " GLOB ", pattern)
    }

    fn ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        let mut sql = binary(lhs, " LIKE ", pattern);
        fmt!(&mut sql, " ESCAPE '\\'");
        sql
    }

    fn not_like(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(lhs, " NOT GLOB ", pattern)
    }

    fn not_ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        let mut sql = binary(lhs, " NOT LIKE ", pattern);
        fmt!(&mut sql, " ESCAPE '\\'");
        sql
    }

    fn pattern(&self, text: &str, position: PatternPosition, mode: QueryMode) -> String {
        let (escaped, any) = match mode {
            QueryMode::Insensitive => (escape_like(text), '%'),
            QueryMode::Default => (escape_glob(text), '*'),
        };

        match position {
            PatternPosition::Contains => format!("{any}{escaped}{any}"),
            PatternPosition::StartsWith => format!("{escaped}{any}"),
            PatternPosition::EndsWith => format!("{any}{escaped}"),
        }
    }
}

impl Functions for Sqlite {
    fn json_object(&self, pairs: Vec<(String, Sql)>) -> Sql {
        let mut args = vec![];
        for (key, value) in pairs {
            args.push(self.literal(&key));
            args.push(value);
        }
        call("json_object", args)
    }

    fn json_array_agg(&self, expr: Sql) -> Sql {
        call("json_group_array", vec![expr])
    }

    fn json_empty_array(&self) -> Sql {
        Sql::raw("'[]'")
    }

    fn json_nested(&self, expr: Sql) -> Sql {
        call("json", vec![expr])
    }

    fn json_param(&self, value: serde_json::Value) -> Sql {
        call("json", vec![Sql::param(Value::Json(value))])
    }

    fn json_path(&self, expr: Sql, path: &[String], as_text: bool) -> Sql {
        let extract = call("json_extract", vec![expr, Sql::param(json_path_string(path))]);
        if as_text {
            let mut sql = Sql::raw("CAST(");
            fmt!(&mut sql, extract, " AS TEXT)");
            sql
        } else {
            extract
        }
    }

    fn json_contains(&self, expr: Sql, value: serde_json::Value) -> Sql {
        let mut sql = Sql::raw("NOT EXISTS (SELECT 1 FROM json_each(");
        fmt!(
            &mut sql,
            Sql::param(Value::Json(json_array(value))),
            ") AS wanted WHERE wanted.value NOT IN (SELECT value FROM json_each(",
            expr,
            ")))"
        );
        sql
    }

    fn list_has(&self, list: Sql, value: Value) -> Sql {
        let mut sql = Sql::raw("EXISTS (SELECT 1 FROM json_each(");
        fmt!(&mut sql, list, ") WHERE value = ", Sql::param(value), ")");
        sql
    }

    fn list_has_every(&self, list: Sql, values: Vec<Value>) -> Sql {
        self.json_contains(list, Value::List(values).to_json())
    }

    fn list_has_some(&self, list: Sql, values: Vec<Value>) -> Sql {
        let mut sql = Sql::raw("EXISTS (SELECT 1 FROM json_each(");
        fmt!(
            &mut sql,
            list,
            ") WHERE value IN (SELECT value FROM json_each(",
            Sql::param(Value::List(values).to_json()),
            ")))"
        );
        sql
    }

    fn list_is_empty(&self, list: Sql) -> Sql {
        binary(call("json_array_length", vec![list]), " = ", Sql::raw("0"))
    }

    fn vector_param(&self, value: Value) -> Sql {
        self.json_param(value.to_json())
    }

    fn point_param(&self, value: Value) -> Sql {
        self.json_param(value.to_json())
    }

    fn last_insert_id(&self, _table: &str, _column: &str) -> Sql {
        Sql::raw("last_insert_rowid()")
    }
}

impl Updates for Sqlite {
    fn push(&self, column: Sql, value: Value) -> Sql {
        let values = match value {
            Value::List(values) => values,
            value => vec![value],
        };

        let mut args = vec![self.coalesce(vec![column, self.json_empty_array()])];
        for value in values {
            args.push(Sql::raw("'$[#]'"));
            args.push(Sql::param(value));
        }
        call("json_insert", args)
    }

    fn merge(&self, column: Sql, value: serde_json::Value) -> Sql {
        call("json_patch", vec![column, self.json_param(value)])
    }

    fn set_path(&self, column: Sql, path: &[String], value: serde_json::Value) -> Sql {
        call(
            "json_set",
            vec![
                column,
                Sql::param(json_path_string(path)),
                self.json_param(value),
            ],
        )
    }
}

impl Subqueries for Sqlite {}

impl Clauses for Sqlite {
    fn limit(&self, take: Option<Sql>, skip: Option<Sql>) -> Sql {
        let mut sql = Sql::raw("LIMIT ");
        match take {
            Some(take) => fmt!(&mut sql, take),
            None => fmt!(&mut sql, "-1"),
        }
        if let Some(skip) = skip {
            fmt!(&mut sql, " OFFSET ", skip);
        }
        sql
    }

    fn default_value(&self) -> Option<Sql> {
        None
    }

    fn insert(
        &self,
        table: &str,
        columns: Vec<String>,
        source: InsertSource,
        on_conflict: OnConflict,
    ) -> Sql {
        let mut sql = Sql::raw(match on_conflict {
            OnConflict::Ignore => "INSERT OR IGNORE INTO ",
            _ => "INSERT INTO ",
        });
        fmt!(&mut sql, self.insert_body(table, columns, source));

        if let OnConflict::Update { .. } = on_conflict {
            on_conflict_clause(self, &mut sql, on_conflict);
        }
        sql
    }
}

fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '*' => escaped.push_str("[*]"),
            '?' => escaped.push_str("[?]"),
            '[' => escaped.push_str("[[]"),
            ch => escaped.push(ch),
        }
    }
    escaped
}
