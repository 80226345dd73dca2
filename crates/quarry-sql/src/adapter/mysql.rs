use super::{
    functions::{call, json_array, json_path_string},
    operators::binary,
    Adapter, Clauses, Functions, Identifiers, InsertSource, OnConflict, Operators, Subqueries,
    Updates,
};
use crate::Sql;

use quarry_core::{
    stmt::{Direction, Nulls, Value},
    Capability,
};

/// MySQL dialect: backtick identifiers, `?` placeholders, JSON-backed lists,
/// no RETURNING.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Adapter for Mysql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    fn placeholder(&self, _position: usize, dst: &mut String) {
        dst.push('?');
    }
}

impl Identifiers for Mysql {
    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn literal(&self, text: &str) -> Sql {
        Sql::raw(format!(
            "'{}'",
            text.replace('\\', "\\\\").replace('\'', "''")
        ))
    }
}

impl Operators for Mysql {
    fn like(&self, lhs: Sql, pattern: Sql) -> Sql {
        let mut sql = binary(lhs, " LIKE ", pattern);
        fmt!(&mut sql, " COLLATE utf8mb4_bin");
        sql
    }

    fn ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        binary(self.lower(lhs), " LIKE ", self.lower(pattern))
    }
}

impl Functions for Mysql {
    fn json_object(&self, pairs: Vec<(String, Sql)>) -> Sql {
        let mut args = vec![];
        for (key, value) in pairs {
            args.push(self.literal(&key));
            args.push(value);
        }
        call("JSON_OBJECT", args)
    }

    fn json_array_agg(&self, expr: Sql) -> Sql {
        call("JSON_ARRAYAGG", vec![expr])
    }

    fn json_empty_array(&self) -> Sql {
        Sql::raw("JSON_ARRAY()")
    }

    fn json_param(&self, value: serde_json::Value) -> Sql {
        let mut sql = Sql::raw("CAST(");
        fmt!(&mut sql, Sql::param(Value::Json(value)), " AS JSON)");
        sql
    }

    fn json_path(&self, expr: Sql, path: &[String], as_text: bool) -> Sql {
        let extract = call(
            "JSON_EXTRACT",
            vec![expr, Sql::param(json_path_string(path))],
        );
        if as_text {
            call("JSON_UNQUOTE", vec![extract])
        } else {
            extract
        }
    }

    fn json_contains(&self, expr: Sql, value: serde_json::Value) -> Sql {
        call("JSON_CONTAINS", vec![expr, self.json_param(value)])
    }

    fn list_has(&self, list: Sql, value: Value) -> Sql {
        self.json_contains(list, value.to_json())
    }

    fn list_has_every(&self, list: Sql, values: Vec<Value>) -> Sql {
        self.json_contains(list, Value::List(values).to_json())
    }

    fn list_has_some(&self, list: Sql, values: Vec<Value>) -> Sql {
        call(
            "JSON_OVERLAPS",
            vec![list, self.json_param(json_array(Value::List(values).to_json()))],
        )
    }

    fn list_is_empty(&self, list: Sql) -> Sql {
        binary(call("JSON_LENGTH", vec![list]), " = ", Sql::raw("0"))
    }

    fn vector_param(&self, value: Value) -> Sql {
        call(
            "STRING_TO_VECTOR",
            vec![Sql::param(value.to_json().to_string())],
        )
    }

    fn point_param(&self, value: Value) -> Sql {
        match value {
            Value::Point { x, y } => call("POINT", vec![Sql::param(x), Sql::param(y)]),
            other => Sql::param(other),
        }
    }

    fn point_eq(&self, lhs: Sql, rhs: Sql) -> Sql {
        call("ST_Equals", vec![lhs, rhs])
    }

    fn last_insert_id(&self, _table: &str, _column: &str) -> Sql {
        Sql::raw("LAST_INSERT_ID()")
    }
}

impl Updates for Mysql {
    fn push(&self, column: Sql, value: Value) -> Sql {
        let list = self.coalesce(vec![column, self.json_empty_array()]);
        call(
            "JSON_MERGE_PRESERVE",
            vec![list, self.json_param(json_array(value.to_json()))],
        )
    }

    fn merge(&self, column: Sql, value: serde_json::Value) -> Sql {
        call("JSON_MERGE_PATCH", vec![column, self.json_param(value)])
    }

    fn set_path(&self, column: Sql, path: &[String], value: serde_json::Value) -> Sql {
        call(
            "JSON_SET",
            vec![
                column,
                Sql::param(json_path_string(path)),
                self.json_param(value),
            ],
        )
    }
}

impl Subqueries for Mysql {}

impl Clauses for Mysql {
    // MySQL has no NULLS FIRST/LAST; sort on the null test first.
    fn order_item(&self, expr: Sql, direction: Direction, nulls: Option<Nulls>) -> Sql {
        let direction = match direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        };

        let mut sql = Sql::new();
        if let Some(nulls) = nulls {
            fmt!(
                &mut sql,
                self.is_null(expr.clone()),
                match nulls {
                    Nulls::First => " DESC, ",
                    Nulls::Last => " ASC, ",
                }
            );
        }
        fmt!(&mut sql, expr, direction);
        sql
    }

    fn limit(&self, take: Option<Sql>, skip: Option<Sql>) -> Sql {
        let mut sql = Sql::raw("LIMIT ");
        match take {
            Some(take) => fmt!(&mut sql, take),
            // Largest row count MySQL accepts; OFFSET requires a LIMIT.
            None => fmt!(&mut sql, "18446744073709551615"),
        }
        if let Some(skip) = skip {
            fmt!(&mut sql, " OFFSET ", skip);
        }
        sql
    }

    fn insert(
        &self,
        table: &str,
        columns: Vec<String>,
        source: InsertSource,
        on_conflict: OnConflict,
    ) -> Sql {
        let mut sql = Sql::raw(match on_conflict {
            OnConflict::Ignore => "INSERT IGNORE INTO ",
            _ => "INSERT INTO ",
        });

        match source {
            InsertSource::DefaultValues => fmt!(&mut sql, self.table(table), " () VALUES ()"),
            source => fmt!(&mut sql, self.insert_body(table, columns, source)),
        }

        if let OnConflict::Update { assignments, .. } = on_conflict {
            fmt!(
                &mut sql,
                " ON DUPLICATE KEY UPDATE ",
                self.assignments(assignments)
            );
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_quoting_doubles_backticks() {
        assert_eq!(Mysql.quote("we`ird"), "`we``ird`");
    }

    #[test]
    fn offset_without_limit() {
        let sql = Mysql.limit(None, Some(Sql::param(5))).render(&Mysql);
        assert_eq!(sql.sql, "LIMIT 18446744073709551615 OFFSET ?");
    }
}
