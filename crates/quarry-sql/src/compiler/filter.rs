use super::{relation, Cx};
use crate::{adapter::filters, Sql};

use quarry_core::{
    schema::{Field, Member},
    stmt::{Condition, Where},
    Error, Result,
};

/// Translates a where description against `cx`.
///
/// Returns `None` when the description constrains nothing, in which case no
/// WHERE clause is emitted.
pub(crate) fn translate(cx: &Cx<'_>, filter: &Where) -> Result<Option<Sql>> {
    let mut conjuncts = vec![];
    conjoin(cx, filter, &mut conjuncts)?;

    if conjuncts.is_empty() {
        return Ok(None);
    }

    Ok(Some(cx.adapter().and(conjuncts)))
}

fn conjoin(cx: &Cx<'_>, filter: &Where, out: &mut Vec<Sql>) -> Result<()> {
    let adapter = cx.adapter();

    for (name, condition) in &filter.conditions {
        if let Some(sql) = condition_sql(cx, name, condition)? {
            out.push(sql);
        }
    }

    // `AND` entries share the enclosing conjunction.
    for item in &filter.and {
        conjoin(cx, item, out)?;
    }

    if let Some(items) = &filter.or {
        let disjuncts = items
            .iter()
            .map(|item| translate(cx, item))
            .collect::<Result<Vec<_>>>()?;

        // A branch that constrains nothing makes the whole disjunction hold
        if let Some(disjuncts) = disjuncts.into_iter().collect::<Option<Vec<_>>>() {
            out.push(adapter.or(disjuncts));
        }
    }

    for item in &filter.not {
        if let Some(sql) = translate(cx, item)? {
            out.push(adapter.not(sql));
        }
    }

    Ok(())
}

fn condition_sql(cx: &Cx<'_>, name: &str, condition: &Condition) -> Result<Option<Sql>> {
    match (cx.member(name)?, condition) {
        (Member::Field(field), Condition::Equals(value)) => {
            let path = cx.path(name);
            filters::equals(cx.adapter(), &cx.column(field), value, target(field, &path)).map(Some)
        }
        (Member::Field(field), Condition::Filter(filter)) => {
            let path = cx.path(name);
            filters::scalar(cx.adapter(), &cx.column(field), filter, target(field, &path))
        }
        (Member::Relation(relation), Condition::Relation(filter)) => {
            relation::filter(cx, relation, filter)
        }
        (Member::Field(field), Condition::Relation(_)) => Err(Error::invalid_operator(
            cx.path(name),
            "relation filter",
            field.kind.name(),
        )),
        (Member::Relation(relation), _) => Err(Error::invalid_operator(
            cx.path(name),
            "equals",
            format!("{} relation", relation.arity().name()),
        )),
    }
}

pub(crate) fn target<'a>(field: &Field, path: &'a str) -> filters::Target<'a> {
    filters::Target {
        path,
        kind: field.kind,
        list: field.list,
    }
}
