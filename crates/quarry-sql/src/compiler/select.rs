use super::{
    alias::Alias,
    clauses::{Clauses, Distinct},
    filter, relation, Cx,
};
use crate::{Adapter, Sql};

use quarry_core::{
    schema::Field,
    stmt::{Direction, FindArgs, OrderBy, OrderTarget, Scalars, Value, Where},
    Error, Result,
};

/// A column of a compiled read, as seen by an enclosing query.
#[derive(Debug, Clone)]
pub(crate) struct Output {
    pub(crate) name: String,

    /// The column holds a JSON document that must nest as JSON, not as a
    /// string, when wrapped into an object.
    pub(crate) json: bool,
}

/// Compiles a read of `cx.model` on top of `clauses`, which already holds the
/// row source. `single` limits the result to one row.
pub(crate) fn find(
    cx: &Cx<'_>,
    args: &FindArgs,
    mut clauses: Clauses,
    single: bool,
) -> Result<(Sql, Vec<Output>)> {
    let adapter = cx.adapter();
    let fields = scalar_fields(cx, &args.selection.scalars)?;

    let mut outputs = vec![];

    for field in &fields {
        clauses.columns.push(projected(cx, field));
        outputs.push(Output {
            name: field.app_name().to_string(),
            json: field.kind.is_json() || field.list,
        });
    }

    for (name, nested) in &args.selection.relations {
        let sql = relation::include(cx, cx.relation(name)?, nested)?;
        clauses.includes.push(adapter.aliased(sql, name));
        outputs.push(Output {
            name: name.clone(),
            json: true,
        });
    }

    if !args.selection.counts.is_empty() {
        let counts = args
            .selection
            .counts
            .iter()
            .map(|name| Ok((name.clone(), relation::count(cx, cx.relation(name)?)?)))
            .collect::<Result<Vec<_>>>()?;

        clauses
            .includes
            .push(adapter.aliased(adapter.json_object(counts), "_count"));
        outputs.push(Output {
            name: "_count".to_string(),
            json: true,
        });
    }

    if let Some(predicate) = filter::translate(cx, &args.filter)? {
        clauses.filters.push(predicate);
    }

    let mut order_by = order_by(cx, &args.order_by)?;

    if let Some(cursor) = &args.cursor {
        let (keys, implied) = cursor_keys(cx, &args.order_by)?;

        // Rows must follow the key chain the cursor compares on
        if implied {
            order_by.extend(
                keys.iter()
                    .map(|&(field, direction)| adapter.order_item(cx.column(field), direction, None)),
            );
        }

        clauses.filters.push(cursor_predicate(cx, cursor, &keys)?);
    }

    distinct(cx, args, &fields, order_by, &mut clauses)?;

    if single {
        clauses.take = Some(Sql::raw("1"));
    } else {
        clauses.take = args.take.map(count_param);
    }
    clauses.skip = args.skip.map(count_param);

    Ok((clauses.assemble(adapter)?, outputs))
}

/// The scalar fields a selection names, in model order for `All` and
/// `Omit`, and in payload order for `Only`.
pub(crate) fn scalar_fields<'a>(cx: &Cx<'a>, scalars: &Scalars) -> Result<Vec<&'a Field>> {
    match scalars {
        Scalars::All => Ok(cx.model.fields.iter().collect()),
        Scalars::Only(names) => names.iter().map(|name| cx.field(name)).collect(),
        Scalars::Omit(names) => {
            for name in names {
                cx.field(name)?;
            }

            Ok(cx
                .model
                .fields
                .iter()
                .filter(|field| !names.iter().any(|name| name == field.app_name()))
                .collect())
        }
    }
}

/// A column, renamed to the field name when the storage name differs.
pub(crate) fn projected(cx: &Cx<'_>, field: &Field) -> Sql {
    let column = cx.column(field);

    if field.column_name() == field.app_name() {
        column
    } else {
        cx.adapter().aliased(column, field.app_name())
    }
}

/// A JSON object over the output columns of a derived table.
pub(crate) fn object(adapter: &dyn Adapter, alias: Alias, outputs: &[Output]) -> Sql {
    let alias = alias.name();

    adapter.json_object(
        outputs
            .iter()
            .map(|output| {
                let column = adapter.column(Some(&alias), &output.name);
                let value = if output.json {
                    adapter.json_nested(column)
                } else {
                    column
                };
                (output.name.clone(), value)
            })
            .collect(),
    )
}

pub(crate) fn order_by(cx: &Cx<'_>, items: &[OrderBy]) -> Result<Vec<Sql>> {
    items
        .iter()
        .map(|item| {
            let expr = order_expr(cx, &item.target)?;
            Ok(cx.adapter().order_item(expr, item.direction, item.nulls))
        })
        .collect()
}

/// The sort key an ordering target refers to.
pub(crate) fn order_expr(cx: &Cx<'_>, target: &OrderTarget) -> Result<Sql> {
    match target {
        OrderTarget::Field(name) => Ok(cx.column(cx.field(name)?)),
        OrderTarget::Relation { relation, target } => {
            relation::order_scalar(cx, cx.relation(relation)?, target)
        }
        OrderTarget::RelationCount(name) => relation::count(cx, cx.relation(name)?),
        OrderTarget::Aggregate { function, field } => Err(Error::invalid_statement(format!(
            "ordering by `{}({})` is only valid in groupBy",
            function.prefix(),
            cx.path(field)
        ))),
    }
}

/// Take and skip are bound, never inlined.
pub(crate) fn count_param(count: u64) -> Sql {
    Sql::param(Value::I64(i64::try_from(count).unwrap_or(i64::MAX)))
}

type CursorKey<'a> = (&'a Field, Direction);

/// The fields a cursor is compared on: the field orderings, or the primary
/// key ascending when there are none. The flag is set in the latter case.
fn cursor_keys<'a>(cx: &Cx<'a>, order_by: &[OrderBy]) -> Result<(Vec<CursorKey<'a>>, bool)> {
    let mut keys = vec![];
    for item in order_by {
        if let OrderTarget::Field(name) = &item.target {
            keys.push((cx.field(name)?, item.direction));
        }
    }

    if !keys.is_empty() {
        return Ok((keys, false));
    }

    keys = cx
        .model
        .primary_key_fields()
        .map(|field| (field, Direction::Asc))
        .collect();

    if keys.is_empty() {
        return Err(Error::invalid_statement(format!(
            "cursor on `{}` needs an ordering or a primary key",
            cx.model.name
        )));
    }

    Ok((keys, true))
}

/// Rows at or after the cursor row in the requested order.
///
/// The keys form a lexicographic chain: `a > ca OR (a = ca AND b >= cb)`.
/// The last comparison is inclusive so the cursor row itself is returned.
fn cursor_predicate(cx: &Cx<'_>, cursor: &Where, keys: &[CursorKey<'_>]) -> Result<Sql> {
    let adapter = cx.adapter();

    // The cursor row, read through its own alias
    let row = cx.rebind(cx.alias.derived("c"));
    let located = filter::translate(&row, cursor)?;

    let boundary = |field: &Field| -> Result<Sql> {
        let mut clauses = Clauses::select_from(row.table());
        clauses.columns.push(row.column(field));
        clauses.filters.extend(located.clone());
        Ok(adapter.scalar(clauses.assemble(adapter)?))
    };

    let mut terms = vec![];
    for (i, &(field, direction)) in keys.iter().enumerate() {
        let mut conjuncts = vec![];

        for &(prior, _) in &keys[..i] {
            conjuncts.push(adapter.eq(cx.column(prior), boundary(prior)?));
        }

        let last = i + 1 == keys.len();
        let column = cx.column(field);
        let bound = boundary(field)?;
        conjuncts.push(match (direction, last) {
            (Direction::Asc, false) => adapter.gt(column, bound),
            (Direction::Asc, true) => adapter.gte(column, bound),
            (Direction::Desc, false) => adapter.lt(column, bound),
            (Direction::Desc, true) => adapter.lte(column, bound),
        });

        terms.push(adapter.and(conjuncts));
    }

    Ok(adapter.or(terms))
}

fn distinct(
    cx: &Cx<'_>,
    args: &FindArgs,
    selected: &[&Field],
    mut order_by: Vec<Sql>,
    clauses: &mut Clauses,
) -> Result<()> {
    if args.distinct.is_empty() {
        clauses.order_by = order_by;
        return Ok(());
    }

    let adapter = cx.adapter();
    let fields = args
        .distinct
        .iter()
        .map(|name| cx.field(name))
        .collect::<Result<Vec<_>>>()?;

    if adapter.capability().distinct_on {
        // DISTINCT ON expressions must lead the ORDER BY
        if !order_by.is_empty() {
            let mut leading: Vec<_> = fields
                .iter()
                .map(|field| adapter.order_item(cx.column(field), Direction::Asc, None))
                .collect();
            leading.append(&mut order_by);
            order_by = leading;
        }

        clauses.distinct = Distinct::On(fields.iter().map(|field| cx.column(field)).collect());
    } else if args.selection.is_scalar_only()
        && selected
            .iter()
            .all(|field| fields.iter().any(|distinct| distinct.id == field.id))
    {
        clauses.distinct = Distinct::All;
    } else {
        return Err(Error::unsupported_feature(format!(
            "distinct on a subset of the selected fields is not supported by {}",
            adapter.name()
        )));
    }

    clauses.order_by = order_by;
    Ok(())
}
