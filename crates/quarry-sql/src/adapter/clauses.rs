use super::{Identifiers, Operators};
use crate::{Comma, Sql};

use quarry_core::stmt::{Direction, Nulls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    FullOuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// Rows written by an INSERT.
#[derive(Debug, Clone)]
pub enum InsertSource {
    Values(Vec<Vec<Sql>>),
    Select(Sql),
    DefaultValues,
}

/// What an INSERT does when it hits a unique constraint.
#[derive(Debug, Clone, Default)]
pub enum OnConflict {
    #[default]
    Fail,

    /// Skip the conflicting row.
    Ignore,

    /// Update the existing row. `target` lists the conflicting columns and
    /// `assignments` pairs a column name with its new value.
    Update {
        target: Vec<String>,
        assignments: Vec<(String, Sql)>,
    },
}

/// Clause builders. Each returns its clause without surrounding whitespace;
/// the assembler joins them.
pub trait Clauses: Identifiers + Operators {
    fn select(&self, columns: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("SELECT ");
        fmt!(&mut sql, Comma(columns));
        sql
    }

    fn select_distinct(&self, columns: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("SELECT DISTINCT ");
        fmt!(&mut sql, Comma(columns));
        sql
    }

    fn select_distinct_on(&self, on: Vec<Sql>, columns: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("SELECT DISTINCT ON (");
        fmt!(&mut sql, Comma(on), ") ", Comma(columns));
        sql
    }

    fn from(&self, source: Sql) -> Sql {
        let mut sql = Sql::raw("FROM ");
        fmt!(&mut sql, source);
        sql
    }

    fn join(&self, kind: JoinKind, source: Sql, on: Sql) -> Sql {
        let mut sql = Sql::raw(match kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
            JoinKind::FullOuter => "FULL OUTER JOIN ",
        });
        fmt!(&mut sql, source, " ON ", on);
        sql
    }

    fn filter(&self, condition: Sql) -> Sql {
        let mut sql = Sql::raw("WHERE ");
        fmt!(&mut sql, condition);
        sql
    }

    fn group_by(&self, columns: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("GROUP BY ");
        fmt!(&mut sql, Comma(columns));
        sql
    }

    fn having(&self, condition: Sql) -> Sql {
        let mut sql = Sql::raw("HAVING ");
        fmt!(&mut sql, condition);
        sql
    }

    fn order_by(&self, items: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("ORDER BY ");
        fmt!(&mut sql, Comma(items));
        sql
    }

    fn order_item(&self, expr: Sql, direction: Direction, nulls: Option<Nulls>) -> Sql {
        let mut sql = expr;
        fmt!(
            &mut sql,
            match direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            },
            match nulls {
                Some(Nulls::First) => " NULLS FIRST",
                Some(Nulls::Last) => " NULLS LAST",
                None => "",
            },
        );
        sql
    }

    /// LIMIT / OFFSET. At least one of `take` and `skip` is set.
    fn limit(&self, take: Option<Sql>, skip: Option<Sql>) -> Sql {
        let mut sql = Sql::new();
        if let Some(take) = take {
            fmt!(&mut sql, "LIMIT ", take);
        }
        if let Some(skip) = skip {
            if !sql.is_empty() {
                fmt!(&mut sql, " ");
            }
            fmt!(&mut sql, "OFFSET ", skip);
        }
        sql
    }

    /// `WITH name AS (..), ..`
    fn with(&self, ctes: Vec<(String, Sql)>) -> Sql {
        let mut sql = Sql::raw("WITH ");
        fmt!(
            &mut sql,
            Comma(ctes.into_iter().map(|(name, query)| {
                let mut cte = Sql::raw(name);
                fmt!(&mut cte, " AS ", query.parenthesized());
                cte
            }))
        );
        sql
    }

    fn set_operation(&self, op: SetOperation, lhs: Sql, rhs: Sql) -> Sql {
        let mut sql = lhs;
        fmt!(
            &mut sql,
            match op {
                SetOperation::Union => " UNION ",
                SetOperation::UnionAll => " UNION ALL ",
                SetOperation::Intersect => " INTERSECT ",
                SetOperation::Except => " EXCEPT ",
            },
            rhs
        );
        sql
    }

    /// The keyword that fills a column missing from one row of a multi-row
    /// VALUES list. `None` when the database has no such keyword.
    fn default_value(&self) -> Option<Sql> {
        Some(Sql::raw("DEFAULT"))
    }

    fn insert(
        &self,
        table: &str,
        columns: Vec<String>,
        source: InsertSource,
        on_conflict: OnConflict,
    ) -> Sql;

    /// Qualifier for existing-row columns inside an upsert's update list.
    fn upsert_qualifier(&self, table: &str) -> String {
        self.quote(table)
    }

    fn update(
        &self,
        table: &str,
        alias: &str,
        assignments: Vec<(String, Sql)>,
        filter: Option<Sql>,
    ) -> Sql {
        let mut sql = Sql::raw("UPDATE ");
        fmt!(
            &mut sql,
            self.table_as(table, alias),
            " SET ",
            self.assignments(assignments)
        );
        if let Some(filter) = filter {
            fmt!(&mut sql, " ", self.filter(filter));
        }
        sql
    }

    fn delete(&self, table: &str, alias: &str, filter: Option<Sql>) -> Sql {
        let mut sql = Sql::raw("DELETE FROM ");
        fmt!(&mut sql, self.table_as(table, alias));
        if let Some(filter) = filter {
            fmt!(&mut sql, " ", self.filter(filter));
        }
        sql
    }

    fn returning(&self, columns: Vec<Sql>) -> Sql {
        let mut sql = Sql::raw("RETURNING ");
        fmt!(&mut sql, Comma(columns));
        sql
    }

    /// `"a" = v1, "b" = v2`
    fn assignments(&self, assignments: Vec<(String, Sql)>) -> Sql {
        let mut sql = Sql::new();
        fmt!(
            &mut sql,
            Comma(assignments.into_iter().map(|(column, value)| {
                let mut assignment = Sql::raw(self.quote(&column));
                fmt!(&mut assignment, " = ", value);
                assignment
            }))
        );
        sql
    }

    /// `INSERT INTO "t" ("a", "b") VALUES (..), (..)` without conflict
    /// handling, shared by the dialects.
    fn insert_body(&self, table: &str, columns: Vec<String>, source: InsertSource) -> Sql {
        let mut sql = self.table(table);

        if !matches!(source, InsertSource::DefaultValues) {
            fmt!(
                &mut sql,
                " (",
                Comma(columns.iter().map(|column| self.quote(column))),
                ")"
            );
        }

        match source {
            InsertSource::Values(rows) => fmt!(
                &mut sql,
                " VALUES ",
                Comma(rows.into_iter().map(|row| {
                    let mut values = Sql::raw("(");
                    fmt!(&mut values, Comma(row), ")");
                    values
                }))
            ),
            InsertSource::Select(query) => fmt!(&mut sql, " ", query),
            InsertSource::DefaultValues => fmt!(&mut sql, " DEFAULT VALUES"),
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Postgresql, Sqlite};

    use quarry_core::stmt::Value;

    fn select(value: i64) -> Sql {
        let mut sql = Sql::raw("SELECT ");
        fmt!(&mut sql, Sql::param(value));
        sql
    }

    #[test]
    fn set_operations_keep_param_order() {
        let stmt = Postgresql
            .set_operation(SetOperation::UnionAll, select(1), select(2))
            .render(&Postgresql);

        assert_eq!(stmt.sql, "SELECT $1 UNION ALL SELECT $2");
        assert_eq!(stmt.params, vec![Value::I64(1), Value::I64(2)]);
    }

    #[test]
    fn set_operation_keywords() {
        let keyword = |op: SetOperation| {
            Sqlite
                .set_operation(op, Sql::raw("SELECT a"), Sql::raw("SELECT b"))
                .render(&Sqlite)
                .sql
        };

        assert_eq!(keyword(SetOperation::Union), "SELECT a UNION SELECT b");
        assert_eq!(keyword(SetOperation::Intersect), "SELECT a INTERSECT SELECT b");
        assert_eq!(keyword(SetOperation::Except), "SELECT a EXCEPT SELECT b");
    }
}
