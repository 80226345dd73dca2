//! Correlated subqueries over relations.
//!
//! A traversed relation is classified once into [`Correlated::ToOne`] or
//! [`Correlated::ToMany`]. The variant decides which filter quantifiers are
//! accepted and how projected rows are wrapped, so a to-many quantifier
//! never reaches a to-one relation.

use super::{
    clauses::{Clauses, Join},
    filter, select, Cx,
};
use crate::{adapter::JoinKind, Adapter, Sql};

use quarry_core::{
    schema::{Field, ForeignKeySide, Relation},
    stmt::{FindArgs, OrderTarget, RelationFilter, ToManyFilter, ToOneFilter, Where},
    Error, Result, Schema,
};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Correlated<'a> {
    ToOne(&'a Relation),
    ToMany(&'a Relation),
}

impl<'a> Correlated<'a> {
    pub(crate) fn new(relation: &'a Relation) -> Correlated<'a> {
        if relation.is_to_many() {
            Correlated::ToMany(relation)
        } else {
            Correlated::ToOne(relation)
        }
    }

    fn relation(self) -> &'a Relation {
        match self {
            Correlated::ToOne(relation) | Correlated::ToMany(relation) => relation,
        }
    }

    /// Applies a relation filter, as an `EXISTS` or `NOT EXISTS` predicate.
    ///
    /// Returns `None` for an `every` whose inner filter constrains nothing,
    /// which holds for any parent row.
    fn quantify(self, cx: &Cx<'_>, filter: &RelationFilter) -> Result<Option<Sql>> {
        let adapter = cx.adapter();
        let relation = self.relation();

        let sql = match (self, filter) {
            (Correlated::ToMany(_), RelationFilter::ToMany(quantifier)) => match quantifier {
                ToManyFilter::Some(inner) => adapter.exists(related_rows(cx, relation, inner)?),
                ToManyFilter::None(inner) => {
                    adapter.not_exists(related_rows(cx, relation, inner)?)
                }
                ToManyFilter::Every(inner) => match counterexample(cx, relation, inner)? {
                    Some(sql) => adapter.not_exists(sql),
                    None => return Ok(None),
                },
            },
            (Correlated::ToOne(_), RelationFilter::ToOne(quantifier)) => {
                let (inner, exists) = match quantifier {
                    ToOneFilter::Is(inner) => (inner.as_ref(), inner.is_some()),
                    ToOneFilter::IsNot(inner) => (inner.as_ref(), inner.is_none()),
                };

                let rows = related_rows(cx, relation, inner.unwrap_or(&Where::new()))?;
                if exists {
                    adapter.exists(rows)
                } else {
                    adapter.not_exists(rows)
                }
            }
            (_, RelationFilter::ToMany(quantifier)) => {
                return Err(mismatch(cx, relation, quantifier.quantifier()))
            }
            (_, RelationFilter::ToOne(quantifier)) => {
                return Err(mismatch(cx, relation, quantifier.quantifier()))
            }
        };

        Ok(Some(sql))
    }

    /// Collapses the rows of `inner` into one JSON value: an object or NULL
    /// for to-one, an array for to-many.
    fn wrap(self, adapter: &dyn Adapter, object: Sql, inner: Sql, alias: &str) -> Sql {
        match self {
            Correlated::ToOne(_) => adapter.to_one(object, inner, alias),
            Correlated::ToMany(_) => adapter.to_many(object, inner, alias),
        }
    }
}

/// Translates a relation condition of a where description. `None` when the
/// condition holds for every row.
pub(crate) fn filter(
    cx: &Cx<'_>,
    relation: &Relation,
    filter: &RelationFilter,
) -> Result<Option<Sql>> {
    Correlated::new(relation).quantify(cx, filter)
}

/// The related records selected by an include, as one JSON value.
pub(crate) fn include(cx: &Cx<'_>, relation: &Relation, args: &FindArgs) -> Result<Sql> {
    let adapter = cx.adapter();
    let correlated = Correlated::new(relation);

    let child = cx.scope(relation);
    let clauses = correlate(cx, &child, relation);

    let single = matches!(correlated, Correlated::ToOne(_));
    let (inner, outputs) = select::find(&child, args, clauses, single)?;

    let wrapper = child.alias.derived("r");
    let object = select::object(adapter, wrapper, &outputs);
    Ok(correlated.wrap(adapter, object, inner, &wrapper.name()))
}

/// `(SELECT COUNT(*) FROM .. WHERE <correlation>)`
pub(crate) fn count(cx: &Cx<'_>, relation: &Relation) -> Result<Sql> {
    let adapter = cx.adapter();
    let child = cx.scope(relation);

    let mut clauses = correlate(cx, &child, relation);
    clauses.columns.push(adapter.count_all());
    Ok(adapter.scalar(clauses.assemble(adapter)?))
}

/// A value of the record behind a to-one relation, usable as a sort key.
pub(crate) fn order_scalar(cx: &Cx<'_>, relation: &Relation, target: &OrderTarget) -> Result<Sql> {
    if relation.is_to_many() {
        return Err(mismatch(cx, relation, "orderBy"));
    }

    let adapter = cx.adapter();
    let child = cx.scope(relation);

    let mut clauses = correlate(cx, &child, relation);
    clauses.columns.push(select::order_expr(&child, target)?);
    clauses.take = Some(Sql::raw("1"));
    Ok(adapter.scalar(clauses.assemble(adapter)?))
}

/// Key fields on both ends: `(relation.fields, relation.references)`.
pub(crate) fn keys<'a>(schema: &'a Schema, relation: &Relation) -> (Vec<&'a Field>, Vec<&'a Field>) {
    let fields = relation.fields.iter().map(|id| schema.field(*id)).collect();
    let references = relation
        .references
        .iter()
        .map(|id| schema.field(*id))
        .collect();
    (fields, references)
}

/// Source rows of `child`, restricted to those related to the current row
/// of `parent`.
fn correlate(parent: &Cx<'_>, child: &Cx<'_>, relation: &Relation) -> Clauses {
    let adapter = parent.adapter();
    let (fields, references) = keys(parent.schema(), relation);

    let mut clauses = Clauses::select_from(child.table());

    match relation.foreign_key {
        ForeignKeySide::Local | ForeignKeySide::Target => {
            clauses.filters.push(
                adapter.correlation(
                    references
                        .iter()
                        .zip(&fields)
                        .map(|(inner, outer)| (child.column(inner), parent.column(outer)))
                        .collect(),
                ),
            );
        }
        ForeignKeySide::JoinTable => {
            let join_table = relation.expect_join_table();
            let alias = child.alias.derived("j").name();

            clauses.joins.push(Join {
                kind: JoinKind::Inner,
                source: adapter.table_as(&join_table.name, &alias),
                on: adapter.correlation(
                    join_table
                        .target_columns
                        .iter()
                        .zip(&references)
                        .map(|(column, inner)| {
                            (adapter.column(Some(&alias), column), child.column(inner))
                        })
                        .collect(),
                ),
            });

            clauses.filters.push(
                adapter.correlation(
                    join_table
                        .local_columns
                        .iter()
                        .zip(&fields)
                        .map(|(column, outer)| {
                            (adapter.column(Some(&alias), column), parent.column(outer))
                        })
                        .collect(),
                ),
            );
        }
    }

    clauses
}

/// `SELECT 1 FROM <related> WHERE <correlation> AND <inner>`
fn related_rows(cx: &Cx<'_>, relation: &Relation, inner: &Where) -> Result<Sql> {
    let adapter = cx.adapter();
    let child = cx.scope(relation);

    let mut clauses = correlate(cx, &child, relation);
    clauses.columns.push(Sql::raw("1"));
    clauses.filters.extend(filter::translate(&child, inner)?);
    clauses.assemble(adapter)
}

/// `SELECT 1 FROM <related> WHERE <correlation> AND (<inner>) IS NOT TRUE`,
/// or `None` when `inner` constrains nothing and no related row can fail it.
fn counterexample(cx: &Cx<'_>, relation: &Relation, inner: &Where) -> Result<Option<Sql>> {
    let adapter = cx.adapter();
    let child = cx.scope(relation);

    let Some(predicate) = filter::translate(&child, inner)? else {
        return Ok(None);
    };

    let mut clauses = correlate(cx, &child, relation);
    clauses.columns.push(Sql::raw("1"));
    clauses.filters.push(adapter.is_not_true(predicate));
    clauses.assemble(adapter).map(Some)
}

fn mismatch(cx: &Cx<'_>, relation: &Relation, quantifier: &str) -> Error {
    Error::cardinality_mismatch(
        cx.path(&relation.name),
        quantifier,
        relation.arity().name(),
    )
}
