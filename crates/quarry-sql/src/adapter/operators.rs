use crate::{fragment::Group, Comma, Sql};

use quarry_core::stmt::{QueryMode, Value};

/// Where a pattern's text sits in the matched value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPosition {
    Contains,
    StartsWith,
    EndsWith,
}

pub trait Operators {
    fn bool_literal(&self, value: bool) -> Sql {
        Sql::raw(if value { "TRUE" } else { "FALSE" })
    }

    fn eq(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " = ", rhs)
    }

    fn neq(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " <> ", rhs)
    }

    fn lt(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " < ", rhs)
    }

    fn lte(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " <= ", rhs)
    }

    fn gt(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " > ", rhs)
    }

    fn gte(&self, lhs: Sql, rhs: Sql) -> Sql {
        binary(lhs, " >= ", rhs)
    }

    fn between(&self, lhs: Sql, low: Sql, high: Sql) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " BETWEEN ", low, " AND ", high);
        sql
    }

    fn not_between(&self, lhs: Sql, low: Sql, high: Sql) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " NOT BETWEEN ", low, " AND ", high);
        sql
    }

    /// Membership in a non-empty list of values.
    fn in_list(&self, lhs: Sql, values: Vec<Value>) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " IN (", Comma(values.into_iter().map(Sql::param)), ")");
        sql
    }

    fn not_in_list(&self, lhs: Sql, values: Vec<Value>) -> Sql {
        let mut sql = lhs;
        fmt!(&mut sql, " NOT IN (", Comma(values.into_iter().map(Sql::param)), ")");
        sql
    }

    /// Case-sensitive pattern match.
    fn like(&self, lhs: Sql, pattern: Sql) -> Sql;

    /// Case-insensitive pattern match.
    fn ilike(&self, lhs: Sql, pattern: Sql) -> Sql;

    fn not_like(&self, lhs: Sql, pattern: Sql) -> Sql {
        self.not(self.like(lhs, pattern))
    }

    fn not_ilike(&self, lhs: Sql, pattern: Sql) -> Sql {
        self.not(self.ilike(lhs, pattern))
    }

    /// Builds the pattern text `like`/`ilike` match against. Wildcards in
    /// `text` are escaped with a backslash.
    fn pattern(&self, text: &str, position: PatternPosition, _mode: QueryMode) -> String {
        let escaped = escape_like(text);
        match position {
            PatternPosition::Contains => format!("%{escaped}%"),
            PatternPosition::StartsWith => format!("{escaped}%"),
            PatternPosition::EndsWith => format!("%{escaped}"),
        }
    }

    /// Conjunction. No operands yields `TRUE`, one operand is returned as is.
    fn and(&self, operands: Vec<Sql>) -> Sql {
        logical(operands, Group::And, self.bool_literal(true))
    }

    /// Disjunction. No operands yields `FALSE`, one operand is returned as is.
    fn or(&self, operands: Vec<Sql>) -> Sql {
        logical(operands, Group::Or, self.bool_literal(false))
    }

    fn not(&self, operand: Sql) -> Sql {
        let mut sql = Sql::raw("NOT ");
        fmt!(&mut sql, operand.parenthesized());
        sql
    }

    fn is_null(&self, operand: Sql) -> Sql {
        let mut sql = operand;
        fmt!(&mut sql, " IS NULL");
        sql
    }

    fn is_not_null(&self, operand: Sql) -> Sql {
        let mut sql = operand;
        fmt!(&mut sql, " IS NOT NULL");
        sql
    }

    /// True unless `operand` is TRUE; NULL counts as not true.
    fn is_not_true(&self, operand: Sql) -> Sql {
        let mut sql = operand.parenthesized();
        fmt!(&mut sql, " IS NOT TRUE");
        sql
    }

    fn exists(&self, subquery: Sql) -> Sql {
        let mut sql = Sql::raw("EXISTS ");
        fmt!(&mut sql, subquery.parenthesized());
        sql
    }

    fn not_exists(&self, subquery: Sql) -> Sql {
        let mut sql = Sql::raw("NOT EXISTS ");
        fmt!(&mut sql, subquery.parenthesized());
        sql
    }
}

pub(super) fn binary(lhs: Sql, op: &str, rhs: Sql) -> Sql {
    let mut sql = lhs;
    fmt!(&mut sql, op, rhs);
    sql
}

pub(super) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn logical(operands: Vec<Sql>, group: Group, neutral: Sql) -> Sql {
    if operands.len() <= 1 {
        return operands.into_iter().next().unwrap_or(neutral);
    }

    let separator = match group {
        Group::Or => " OR ",
        _ => " AND ",
    };

    let mut sql = Sql::new();
    for (i, operand) in operands.into_iter().enumerate() {
        if i > 0 {
            fmt!(&mut sql, separator);
        }

        if operand.group() == Group::Atom || operand.group() == group {
            fmt!(&mut sql, operand);
        } else {
            fmt!(&mut sql, operand.parenthesized());
        }
    }

    sql.with_group(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mysql, Postgresql};

    fn text(sql: Sql) -> String {
        sql.render(&Postgresql).sql
    }

    #[test]
    fn empty_connectives_are_neutral() {
        assert_eq!(text(Postgresql.and(vec![])), "TRUE");
        assert_eq!(text(Postgresql.or(vec![])), "FALSE");
        assert_eq!(Mysql.and(vec![]).render(&Mysql).sql, "TRUE");
        assert_eq!(Mysql.or(vec![]).render(&Mysql).sql, "FALSE");
    }

    #[test]
    fn single_operand_is_unwrapped() {
        let operand = || Postgresql.eq(Sql::raw("a"), Sql::param(1));

        assert_eq!(text(Postgresql.and(vec![operand()])), "a = $1");
        assert_eq!(text(Postgresql.or(vec![operand()])), "a = $1");
    }

    #[test]
    fn mixed_connectives_are_parenthesized() {
        let either = Postgresql.or(vec![Sql::raw("a"), Sql::raw("b")]);
        assert_eq!(
            text(Postgresql.and(vec![either, Sql::raw("c")])),
            "(a OR b) AND c"
        );

        let both = Postgresql.and(vec![Sql::raw("a"), Sql::raw("b")]);
        assert_eq!(
            text(Postgresql.and(vec![both, Sql::raw("c")])),
            "a AND b AND c"
        );
    }

    #[test]
    fn default_negated_patterns_wrap_the_match() {
        let sql = Mysql.not_like(Sql::raw("a"), Sql::param("x%"));
        assert_eq!(sql.render(&Mysql).sql, "NOT (a LIKE ? COLLATE utf8mb4_bin)");
    }
}
