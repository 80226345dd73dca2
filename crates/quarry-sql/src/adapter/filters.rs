//! Scalar filters, generic over operator families.
//!
//! Every [`ScalarKind`] belongs to one family. [`scalar`] matches on the kind
//! once and hands off to [`family`], which is monomorphised per family. An
//! operator the family does not support is an `invalid_operator` error.

use super::{Adapter, PatternPosition};
use crate::Sql;

use quarry_core::{
    schema::ScalarKind,
    stmt::{FilterOp, QueryMode, ScalarFilter, Value},
    Error, Result,
};

/// What to apply a filter to.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// Dotted path used in error messages
    pub path: &'a str,
    pub kind: ScalarKind,
    pub list: bool,
}

impl Target<'_> {
    /// `String`, or `String[]` for a list.
    pub fn kind_name(&self) -> String {
        if self.list {
            format!("{}[]", self.kind)
        } else {
            self.kind.to_string()
        }
    }
}

pub trait ScalarFamily {
    /// `lt`, `lte`, `gt`, `gte`, `between`
    const ORDERED: bool = false;

    /// `contains`, `startsWith`, `endsWith`
    const TEXT: bool = false;

    /// `in`, `notIn`
    const MEMBERSHIP: bool = true;

    /// Converts a literal before it is bound.
    fn convert(value: &Value) -> Value {
        value.clone()
    }

    fn encode(_adapter: &dyn Adapter, value: &Value) -> Sql {
        Sql::param(Self::convert(value))
    }

    fn equals(adapter: &dyn Adapter, lhs: Sql, rhs: Sql, _mode: QueryMode) -> Sql {
        adapter.eq(lhs, rhs)
    }

    /// Family-specific operators.
    fn extra(
        _adapter: &dyn Adapter,
        _lhs: &Sql,
        _op: &FilterOp,
        _target: Target<'_>,
    ) -> Option<Result<Sql>> {
        None
    }
}

pub struct Text;
pub struct Numeric;
pub struct Temporal;
pub struct Boolean;
pub struct Enumerated;
pub struct Json;
pub struct Binary;
pub struct Vector;
pub struct Spatial;
pub struct List;

/// Text extracted from a JSON document by a path filter.
struct JsonText;

impl ScalarFamily for Text {
    const ORDERED: bool = true;
    const TEXT: bool = true;

    fn equals(adapter: &dyn Adapter, lhs: Sql, rhs: Sql, mode: QueryMode) -> Sql {
        match mode {
            QueryMode::Default => adapter.eq(lhs, rhs),
            QueryMode::Insensitive => adapter.eq(adapter.lower(lhs), adapter.lower(rhs)),
        }
    }
}

impl ScalarFamily for Numeric {
    const ORDERED: bool = true;
}

impl ScalarFamily for Temporal {
    const ORDERED: bool = true;
}

impl ScalarFamily for Boolean {
    const MEMBERSHIP: bool = false;
}

impl ScalarFamily for Enumerated {}

impl ScalarFamily for Binary {
    const MEMBERSHIP: bool = false;
}

impl ScalarFamily for Json {
    const MEMBERSHIP: bool = false;

    fn encode(adapter: &dyn Adapter, value: &Value) -> Sql {
        adapter.json_param(value.to_json())
    }

    fn extra(
        adapter: &dyn Adapter,
        lhs: &Sql,
        op: &FilterOp,
        target: Target<'_>,
    ) -> Option<Result<Sql>> {
        match op {
            FilterOp::Path { path, op } => {
                let extracted = adapter.json_path(lhs.clone(), path, true);
                Some(apply::<JsonText>(
                    adapter,
                    &extracted,
                    op,
                    QueryMode::Default,
                    target,
                ))
            }
            FilterOp::JsonContains(value) => {
                Some(Ok(adapter.json_contains(lhs.clone(), value.to_json())))
            }
            _ => None,
        }
    }
}

impl ScalarFamily for JsonText {
    const TEXT: bool = true;

    fn convert(value: &Value) -> Value {
        value.to_json_text()
    }
}

impl ScalarFamily for Vector {
    const MEMBERSHIP: bool = false;

    fn encode(adapter: &dyn Adapter, value: &Value) -> Sql {
        adapter.vector_param(value.clone())
    }
}

impl ScalarFamily for Spatial {
    const MEMBERSHIP: bool = false;

    fn encode(adapter: &dyn Adapter, value: &Value) -> Sql {
        adapter.point_param(value.clone())
    }

    fn equals(adapter: &dyn Adapter, lhs: Sql, rhs: Sql, _mode: QueryMode) -> Sql {
        adapter.point_eq(lhs, rhs)
    }
}

impl ScalarFamily for List {
    const MEMBERSHIP: bool = false;

    fn encode(adapter: &dyn Adapter, value: &Value) -> Sql {
        match value {
            Value::List(values) => adapter.list_param(values.clone()),
            value => adapter.list_param(vec![value.clone()]),
        }
    }

    fn extra(
        adapter: &dyn Adapter,
        lhs: &Sql,
        op: &FilterOp,
        _target: Target<'_>,
    ) -> Option<Result<Sql>> {
        let sql = match op {
            FilterOp::Has(value) => adapter.list_has(lhs.clone(), value.clone()),
            FilterOp::HasEvery(values) => adapter.list_has_every(lhs.clone(), values.clone()),
            FilterOp::HasSome(values) if values.is_empty() => adapter.bool_literal(false),
            FilterOp::HasSome(values) => adapter.list_has_some(lhs.clone(), values.clone()),
            FilterOp::IsEmpty(true) => adapter.list_is_empty(lhs.clone()),
            FilterOp::IsEmpty(false) => adapter.not(adapter.list_is_empty(lhs.clone())),
            _ => return None,
        };
        Some(Ok(sql))
    }
}

/// Translates `filter` against `lhs`. Returns `None` when the filter holds
/// no operators.
pub fn scalar(
    adapter: &dyn Adapter,
    lhs: &Sql,
    filter: &ScalarFilter,
    target: Target<'_>,
) -> Result<Option<Sql>> {
    if filter.ops.is_empty() {
        return Ok(None);
    }

    if target.list {
        return family::<List>(adapter, lhs, filter, target).map(Some);
    }

    let sql = match target.kind {
        ScalarKind::String => family::<Text>(adapter, lhs, filter, target),
        ScalarKind::Int | ScalarKind::Float | ScalarKind::Decimal | ScalarKind::BigInt => {
            family::<Numeric>(adapter, lhs, filter, target)
        }
        ScalarKind::DateTime | ScalarKind::Date | ScalarKind::Time => {
            family::<Temporal>(adapter, lhs, filter, target)
        }
        ScalarKind::Boolean => family::<Boolean>(adapter, lhs, filter, target),
        ScalarKind::Enum => family::<Enumerated>(adapter, lhs, filter, target),
        ScalarKind::Json => family::<Json>(adapter, lhs, filter, target),
        ScalarKind::Bytes => family::<Binary>(adapter, lhs, filter, target),
        ScalarKind::Vector => family::<Vector>(adapter, lhs, filter, target),
        ScalarKind::Point => family::<Spatial>(adapter, lhs, filter, target),
    }?;

    Ok(Some(sql))
}

/// `lhs = value`, routing NULL to `IS NULL`.
pub fn equals(adapter: &dyn Adapter, lhs: &Sql, value: &Value, target: Target<'_>) -> Result<Sql> {
    let filter = ScalarFilter::new().equals(value.clone());
    Ok(scalar(adapter, lhs, &filter, target)?.unwrap_or_else(|| adapter.bool_literal(true)))
}

pub fn family<F: ScalarFamily>(
    adapter: &dyn Adapter,
    lhs: &Sql,
    filter: &ScalarFilter,
    target: Target<'_>,
) -> Result<Sql> {
    let conjuncts = filter
        .ops
        .iter()
        .map(|op| apply::<F>(adapter, lhs, op, filter.mode, target))
        .collect::<Result<Vec<_>>>()?;

    Ok(adapter.and(conjuncts))
}

fn apply<F: ScalarFamily>(
    adapter: &dyn Adapter,
    lhs: &Sql,
    op: &FilterOp,
    mode: QueryMode,
    target: Target<'_>,
) -> Result<Sql> {
    let invalid = || Error::invalid_operator(target.path, op.name(), target.kind_name());

    let sql = match op {
        FilterOp::Equals(value) if value.is_null() => adapter.is_null(lhs.clone()),
        FilterOp::Equals(value) => F::equals(adapter, lhs.clone(), F::encode(adapter, value), mode),
        FilterOp::NotEquals(value) if value.is_null() => adapter.is_not_null(lhs.clone()),
        FilterOp::NotEquals(value) => adapter.not(F::equals(
            adapter,
            lhs.clone(),
            F::encode(adapter, value),
            mode,
        )),
        FilterOp::In(_) | FilterOp::NotIn(_) if !F::MEMBERSHIP => return Err(invalid()),
        FilterOp::In(values) if values.is_empty() => adapter.bool_literal(false),
        FilterOp::In(values) => adapter.in_list(lhs.clone(), values.iter().map(F::convert).collect()),
        FilterOp::NotIn(values) if values.is_empty() => adapter.bool_literal(true),
        FilterOp::NotIn(values) => {
            adapter.not_in_list(lhs.clone(), values.iter().map(F::convert).collect())
        }
        FilterOp::Lt(_)
        | FilterOp::Lte(_)
        | FilterOp::Gt(_)
        | FilterOp::Gte(_)
        | FilterOp::Between(..)
        | FilterOp::NotBetween(..)
            if !F::ORDERED =>
        {
            return Err(invalid())
        }
        FilterOp::Lt(value) => adapter.lt(lhs.clone(), F::encode(adapter, value)),
        FilterOp::Lte(value) => adapter.lte(lhs.clone(), F::encode(adapter, value)),
        FilterOp::Gt(value) => adapter.gt(lhs.clone(), F::encode(adapter, value)),
        FilterOp::Gte(value) => adapter.gte(lhs.clone(), F::encode(adapter, value)),
        FilterOp::Between(low, high) => adapter.between(
            lhs.clone(),
            F::encode(adapter, low),
            F::encode(adapter, high),
        ),
        FilterOp::NotBetween(low, high) => adapter.not_between(
            lhs.clone(),
            F::encode(adapter, low),
            F::encode(adapter, high),
        ),
        FilterOp::Contains(_) | FilterOp::StartsWith(_) | FilterOp::EndsWith(_) => {
            pattern_match::<F>(adapter, lhs, op, mode, target, false)?
        }
        FilterOp::Not(inner) => {
            let mode = match (mode, inner.mode) {
                (QueryMode::Insensitive, _) | (_, QueryMode::Insensitive) => {
                    QueryMode::Insensitive
                }
                _ => QueryMode::Default,
            };

            match inner.ops.as_slice() {
                [pattern @ (FilterOp::Contains(_)
                | FilterOp::StartsWith(_)
                | FilterOp::EndsWith(_))] => {
                    pattern_match::<F>(adapter, lhs, pattern, mode, target, true)?
                }
                ops => {
                    let inner = ScalarFilter {
                        ops: ops.to_vec(),
                        mode,
                    };
                    adapter.not(family::<F>(adapter, lhs, &inner, target)?)
                }
            }
        }
        _ => return F::extra(adapter, lhs, op, target).unwrap_or_else(|| Err(invalid())),
    };

    Ok(sql)
}

/// `contains`, `startsWith` and `endsWith`, optionally negated.
fn pattern_match<F: ScalarFamily>(
    adapter: &dyn Adapter,
    lhs: &Sql,
    op: &FilterOp,
    mode: QueryMode,
    target: Target<'_>,
    negated: bool,
) -> Result<Sql> {
    let invalid = || Error::invalid_operator(target.path, op.name(), target.kind_name());

    let (value, position) = match op {
        FilterOp::Contains(value) => (value, PatternPosition::Contains),
        FilterOp::StartsWith(value) => (value, PatternPosition::StartsWith),
        FilterOp::EndsWith(value) => (value, PatternPosition::EndsWith),
        _ => return Err(invalid()),
    };

    let text = match F::convert(value) {
        Value::String(text) if F::TEXT => text,
        _ => return Err(invalid()),
    };

    let lhs = lhs.clone();
    let pattern = Sql::param(adapter.pattern(&text, position, mode));

    Ok(match (mode, negated) {
        (QueryMode::Default, false) => adapter.like(lhs, pattern),
        (QueryMode::Default, true) => adapter.not_like(lhs, pattern),
        (QueryMode::Insensitive, false) => adapter.ilike(lhs, pattern),
        (QueryMode::Insensitive, true) => adapter.not_ilike(lhs, pattern),
    })
}
