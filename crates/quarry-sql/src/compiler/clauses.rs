use crate::{adapter::JoinKind, Adapter, Sql};

use quarry_core::{Error, Result};

/// Pieces of one SELECT, collected while walking an operation and consumed
/// once by [`Clauses::assemble`].
#[derive(Debug, Default)]
pub(crate) struct Clauses {
    pub(crate) ctes: Vec<(String, Sql)>,
    pub(crate) distinct: Distinct,
    pub(crate) columns: Vec<Sql>,

    /// Relation subqueries spliced after the base columns
    pub(crate) includes: Vec<Sql>,
    pub(crate) from: Option<Sql>,
    pub(crate) joins: Vec<Join>,

    /// Conjoined into the WHERE clause
    pub(crate) filters: Vec<Sql>,
    pub(crate) group_by: Vec<Sql>,
    pub(crate) having: Option<Sql>,
    pub(crate) order_by: Vec<Sql>,
    pub(crate) take: Option<Sql>,
    pub(crate) skip: Option<Sql>,
}

#[derive(Debug, Default)]
pub(crate) enum Distinct {
    #[default]
    None,
    All,
    On(Vec<Sql>),
}

#[derive(Debug)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) source: Sql,
    pub(crate) on: Sql,
}

impl Clauses {
    pub(crate) fn select_from(source: Sql) -> Clauses {
        Clauses {
            from: Some(source),
            ..Clauses::default()
        }
    }

    /// Joins the clauses in their fixed order: CTEs, SELECT, FROM, JOINs,
    /// WHERE, GROUP BY, HAVING, ORDER BY, LIMIT. Absent clauses are skipped.
    pub(crate) fn assemble(self, adapter: &dyn Adapter) -> Result<Sql> {
        let mut columns = self.columns;
        columns.extend(self.includes);

        if columns.is_empty() {
            return Err(Error::invalid_statement("select list is empty"));
        }

        let mut parts = vec![];

        if !self.ctes.is_empty() {
            parts.push(adapter.with(self.ctes));
        }

        parts.push(match self.distinct {
            Distinct::None => adapter.select(columns),
            Distinct::All => adapter.select_distinct(columns),
            Distinct::On(on) => adapter.select_distinct_on(on, columns),
        });

        if let Some(from) = self.from {
            parts.push(adapter.from(from));
        }

        for join in self.joins {
            if join.kind == JoinKind::FullOuter && !adapter.capability().full_outer_join {
                return Err(Error::unsupported_feature(format!(
                    "FULL OUTER JOIN is not supported by {}",
                    adapter.name()
                )));
            }
            parts.push(adapter.join(join.kind, join.source, join.on));
        }

        if !self.filters.is_empty() {
            parts.push(adapter.filter(adapter.and(self.filters)));
        }

        if !self.group_by.is_empty() {
            parts.push(adapter.group_by(self.group_by));
        }

        if let Some(having) = self.having {
            parts.push(adapter.having(having));
        }

        if !self.order_by.is_empty() {
            parts.push(adapter.order_by(self.order_by));
        }

        if self.take.is_some() || self.skip.is_some() {
            parts.push(adapter.limit(self.take, self.skip));
        }

        let mut sql = Sql::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                fmt!(&mut sql, " ");
            }
            fmt!(&mut sql, part);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mysql, Postgresql, Sqlite};

    use quarry_core::stmt::Value;

    fn full_outer(adapter: &dyn Adapter) -> Result<Sql> {
        let mut clauses = Clauses::select_from(Sql::raw("\"a\" AS t0"));
        clauses.columns.push(Sql::raw("t0.\"id\""));
        clauses.joins.push(Join {
            kind: JoinKind::FullOuter,
            source: Sql::raw("\"b\" AS t1"),
            on: Sql::raw("t1.\"id\" = t0.\"id\""),
        });
        clauses.assemble(adapter)
    }

    #[test]
    fn clauses_follow_fixed_order() {
        let mut clauses = Clauses::select_from(Sql::raw("\"users\" AS t0"));
        clauses.columns.push(Sql::raw("t0.\"name\""));
        clauses.order_by.push(Sql::raw("t0.\"name\" ASC"));
        clauses.filters.push(Sql::raw("t0.\"id\" > 1"));
        clauses.group_by.push(Sql::raw("t0.\"name\""));
        clauses.take = Some(Sql::param(Value::I64(5)));

        let stmt = clauses.assemble(&Postgresql).unwrap().render(&Postgresql);
        assert_eq!(
            stmt.sql,
            "SELECT t0.\"name\" FROM \"users\" AS t0 WHERE t0.\"id\" > 1 \
             GROUP BY t0.\"name\" ORDER BY t0.\"name\" ASC LIMIT $1"
        );
    }

    #[test]
    fn full_outer_join_requires_capability() {
        assert!(full_outer(&Postgresql).is_ok());
        assert!(full_outer(&Sqlite).is_ok());

        let err = full_outer(&Mysql).unwrap_err();
        assert!(err.is_unsupported_feature());
    }

    #[test]
    fn empty_select_list_is_rejected() {
        let clauses = Clauses::select_from(Sql::raw("\"users\" AS t0"));
        assert!(clauses.assemble(&Sqlite).unwrap_err().is_invalid_statement());
    }
}
