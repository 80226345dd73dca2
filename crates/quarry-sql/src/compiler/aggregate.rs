use super::{
    clauses::Clauses,
    filter,
    select::{self, count_param},
    Cx,
};
use crate::{adapter::filters, Adapter, Sql};

use quarry_core::{
    schema::{Field, ScalarKind},
    stmt::{
        AggregateArgs, AggregateFn, AggregateSelection, CountArgs, GroupByArgs, Having,
        OrderTarget, Where,
    },
    Error, Result,
};

/// `SELECT COUNT(*) AS "_count" ..`, plus `COUNT(col) AS "_count.<field>"`
/// per requested field.
pub(crate) fn count(cx: &Cx<'_>, args: &CountArgs) -> Result<Sql> {
    let adapter = cx.adapter();
    let fields = args
        .fields
        .iter()
        .map(|name| cx.field(name))
        .collect::<Result<Vec<_>>>()?;

    let columns = |column: &dyn Fn(&Field) -> Sql| {
        let mut columns = vec![adapter.aliased(adapter.count_all(), "_count")];
        for &field in &fields {
            columns.push(adapter.aliased(
                adapter.aggregate(AggregateFn::Count, column(field)),
                &format!("_count.{}", field.app_name()),
            ));
        }
        columns
    };

    let mut inner = Clauses::select_from(cx.table());
    inner.filters.extend(filter::translate(cx, &args.filter)?);

    if args.take.is_none() && args.skip.is_none() {
        inner.columns = columns(&|field| cx.column(field));
        return inner.assemble(adapter);
    }

    // Paginate first, then count the rows that are left
    inner.columns = if fields.is_empty() {
        vec![Sql::raw("1")]
    } else {
        fields.iter().map(|field| select::projected(cx, field)).collect()
    };
    inner.take = args.take.map(count_param);
    inner.skip = args.skip.map(count_param);

    let derived = cx.alias.derived("d").name();
    let mut outer = Clauses::select_from(derived_table(inner.assemble(adapter)?, &derived));
    outer.columns = columns(&|field| adapter.column(Some(&derived), field.app_name()));
    outer.assemble(adapter)
}

/// `_count._all`, `_count.<f>`, `_sum.<f>`, `_avg.<f>`, `_min.<f>` and
/// `_max.<f>` over the filtered rows.
pub(crate) fn aggregate(cx: &Cx<'_>, args: &AggregateArgs) -> Result<Sql> {
    let adapter = cx.adapter();

    if args.select.is_empty() {
        return Err(Error::invalid_statement(
            "aggregate requires at least one aggregate",
        ));
    }

    let requested = resolve(cx, &args.select)?;

    let mut inner = Clauses::select_from(cx.table());
    inner.filters.extend(filter::translate(cx, &args.filter)?);

    if args.take.is_none() && args.skip.is_none() {
        inner.columns = aggregate_columns(adapter, &args.select, &requested, &|field| {
            cx.column(field)
        });
        return inner.assemble(adapter);
    }

    // Only the paginated rows are aggregated
    let mut referenced: Vec<&Field> = vec![];
    for &(_, field) in &requested {
        if !referenced.iter().any(|seen| seen.id == field.id) {
            referenced.push(field);
        }
    }

    inner.columns = if referenced.is_empty() {
        vec![Sql::raw("1")]
    } else {
        referenced
            .iter()
            .map(|field| select::projected(cx, field))
            .collect()
    };
    inner.order_by = select::order_by(cx, &args.order_by)?;
    inner.take = args.take.map(count_param);
    inner.skip = args.skip.map(count_param);

    let derived = cx.alias.derived("d").name();
    let mut outer = Clauses::select_from(derived_table(inner.assemble(adapter)?, &derived));
    outer.columns = aggregate_columns(adapter, &args.select, &requested, &|field| {
        adapter.column(Some(&derived), field.app_name())
    });
    outer.assemble(adapter)
}

/// Grouped fields plus aggregates per group, filtered by HAVING and
/// paginated after grouping.
pub(crate) fn group_by(cx: &Cx<'_>, args: &GroupByArgs) -> Result<Sql> {
    let adapter = cx.adapter();

    if args.by.is_empty() {
        return Err(Error::invalid_statement(
            "groupBy requires at least one field",
        ));
    }

    let by = args
        .by
        .iter()
        .map(|name| cx.field(name))
        .collect::<Result<Vec<_>>>()?;
    let requested = resolve(cx, &args.select)?;

    let mut clauses = Clauses::select_from(cx.table());
    clauses.columns = by.iter().map(|field| select::projected(cx, field)).collect();
    clauses.columns.extend(aggregate_columns(
        adapter,
        &args.select,
        &requested,
        &|field| cx.column(field),
    ));
    clauses.filters.extend(filter::translate(cx, &args.filter)?);
    clauses.group_by = by.iter().map(|field| cx.column(field)).collect();
    clauses.having = having_predicate(cx, &args.having, &by)?;

    for item in &args.order_by {
        let expr = match &item.target {
            OrderTarget::Field(name) => {
                let field = cx.field(name)?;
                if !by.iter().any(|grouped| grouped.id == field.id) {
                    return Err(Error::invalid_statement(format!(
                        "`{}` must be grouped to order by it",
                        cx.path(name)
                    )));
                }
                cx.column(field)
            }
            OrderTarget::Aggregate { function, field } => {
                let field = cx.field(field)?;
                check(cx, *function, field)?;
                adapter.aggregate(*function, cx.column(field))
            }
            _ => {
                return Err(Error::invalid_statement(
                    "groupBy orders by grouped fields or aggregates only",
                ))
            }
        };
        clauses
            .order_by
            .push(adapter.order_item(expr, item.direction, item.nulls));
    }

    clauses.take = args.take.map(count_param);
    clauses.skip = args.skip.map(count_param);
    clauses.assemble(adapter)
}

/// `SELECT EXISTS (SELECT 1 FROM .. WHERE ..) AS "exists"`
pub(crate) fn exists(cx: &Cx<'_>, filter: &Where) -> Result<Sql> {
    let adapter = cx.adapter();

    let mut inner = Clauses::select_from(cx.table());
    inner.columns.push(Sql::raw("1"));
    inner.filters.extend(filter::translate(cx, filter)?);

    let mut outer = Clauses::default();
    outer
        .columns
        .push(adapter.aliased(adapter.exists(inner.assemble(adapter)?), "exists"));
    outer.assemble(adapter)
}

fn derived_table(query: Sql, alias: &str) -> Sql {
    let mut sql = query.parenthesized();
    fmt!(&mut sql, " AS ", alias);
    sql
}

fn resolve<'a>(cx: &Cx<'a>, select: &AggregateSelection) -> Result<Vec<(AggregateFn, &'a Field)>> {
    select
        .fields()
        .map(|(function, name)| {
            let field = cx.field(name)?;
            check(cx, function, field)?;
            Ok((function, field))
        })
        .collect()
}

fn aggregate_columns(
    adapter: &dyn Adapter,
    select: &AggregateSelection,
    requested: &[(AggregateFn, &Field)],
    column: &dyn Fn(&Field) -> Sql,
) -> Vec<Sql> {
    let mut columns = vec![];

    if select.count_all {
        columns.push(adapter.aliased(adapter.count_all(), "_count._all"));
    }

    for &(function, field) in requested {
        columns.push(adapter.aliased(
            adapter.aggregate(function, column(field)),
            &format!("{}.{}", function.prefix(), field.app_name()),
        ));
    }

    columns
}

/// Sum and average need numbers; min and max need an ordered kind.
fn check(cx: &Cx<'_>, function: AggregateFn, field: &Field) -> Result<()> {
    let valid = match function {
        AggregateFn::Count => true,
        AggregateFn::Sum | AggregateFn::Avg => field.kind.is_numeric() && !field.list,
        AggregateFn::Min | AggregateFn::Max => {
            !field.list
                && !matches!(
                    field.kind,
                    ScalarKind::Boolean
                        | ScalarKind::Json
                        | ScalarKind::Bytes
                        | ScalarKind::Vector
                        | ScalarKind::Point
                )
        }
    };

    if valid {
        Ok(())
    } else {
        Err(Error::invalid_operator(
            cx.path(field.app_name()),
            function.prefix(),
            field.kind.name(),
        ))
    }
}

fn having_predicate(cx: &Cx<'_>, having: &Having, by: &[&Field]) -> Result<Option<Sql>> {
    let mut conjuncts = vec![];
    conjoin_having(cx, having, by, &mut conjuncts)?;

    if conjuncts.is_empty() {
        return Ok(None);
    }

    Ok(Some(cx.adapter().and(conjuncts)))
}

fn conjoin_having(cx: &Cx<'_>, having: &Having, by: &[&Field], out: &mut Vec<Sql>) -> Result<()> {
    let adapter = cx.adapter();

    for condition in &having.conditions {
        let field = cx.field(&condition.field)?;
        let path = cx.path(&condition.field);

        let (lhs, target) = match condition.aggregate {
            None => {
                if !by.iter().any(|grouped| grouped.id == field.id) {
                    return Err(Error::invalid_statement(format!(
                        "`{path}` must be grouped or aggregated to filter groups by it"
                    )));
                }
                (cx.column(field), filter::target(field, &path))
            }
            Some(function) => {
                check(cx, function, field)?;
                let kind = match function {
                    AggregateFn::Count => ScalarKind::Int,
                    AggregateFn::Avg => ScalarKind::Float,
                    _ => field.kind,
                };
                let target = filters::Target {
                    path: &path,
                    kind,
                    list: false,
                };
                (adapter.aggregate(function, cx.column(field)), target)
            }
        };

        out.extend(filters::scalar(adapter, &lhs, &condition.filter, target)?);
    }

    for item in &having.and {
        conjoin_having(cx, item, by, out)?;
    }

    if let Some(items) = &having.or {
        let disjuncts = items
            .iter()
            .map(|item| having_predicate(cx, item, by))
            .collect::<Result<Vec<_>>>()?;

        if let Some(disjuncts) = disjuncts.into_iter().collect::<Option<Vec<_>>>() {
            out.push(adapter.or(disjuncts));
        }
    }

    for item in &having.not {
        if let Some(sql) = having_predicate(cx, item, by)? {
            out.push(adapter.not(sql));
        }
    }

    Ok(())
}
