use super::{
    clauses::Clauses,
    filter,
    nested::{self, RowRef, Writer},
    select, Cx, Env, Plan,
};
use crate::{
    adapter::{InsertSource, OnConflict},
    Adapter, Sql,
};

use indexmap::IndexMap;
use quarry_core::{
    schema::{Field, ForeignKeySide, Model, Relation, ScalarKind},
    stmt::{
        Condition, CreateArgs, CreateManyArgs, Data, DeleteArgs, FilterOp, FindArgs, Selection,
        UpdateArgs, UpdateManyArgs, UpdateOp, UpsertArgs, Value, Where,
    },
    Error, Result,
};

/// How a mutation hands back the records it wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readback {
    Returning,
    FollowUp,
}

pub(crate) fn create(env: Env<'_>, model: &Model, args: &CreateArgs) -> Result<Plan> {
    let adapter = env.adapter;
    let nested = args.data.relations().next().is_some();
    let chained = nested && adapter.capability().cte_with_mutations;
    let readback = readback(env, args.selection.as_ref())?;

    let returning = match (&args.selection, readback) {
        (Some(selection), Some(Readback::Returning)) if !chained => {
            Some(returning_columns(&Cx::root(env, model), selection)?)
        }
        _ => None,
    };

    let mut writer = Writer::new(env, chained);
    let row = writer.create(model, &args.data, vec![], OnConflict::Fail, returning)?;

    let result = if chained {
        chain_result(&mut writer, env, model, &row, args.selection.as_ref(), readback)?
    } else {
        match (&args.selection, readback) {
            (Some(selection), Some(Readback::FollowUp)) => {
                let cx = Cx::root(env, model);
                let mut clauses = Clauses::select_from(cx.table());

                let mut conjuncts = vec![];
                for key in model.primary_key_fields() {
                    conjuncts.push(adapter.eq(cx.column(key), row.value(&mut writer, key)?));
                }
                clauses.filters.push(adapter.and(conjuncts));

                writer.statement(read_one(&cx, selection, clauses)?)
            }
            _ => row.statement.unwrap_or(0),
        }
    };

    Ok(Plan {
        statements: writer.finish(),
        result,
    })
}

pub(crate) fn create_many(env: Env<'_>, model: &Model, args: &CreateManyArgs) -> Result<Plan> {
    let adapter = env.adapter;

    if args.data.is_empty() {
        return Err(Error::invalid_statement(format!(
            "createMany on `{}` requires at least one row",
            model.name
        )));
    }

    let on_conflict = if args.skip_duplicates {
        OnConflict::Ignore
    } else {
        OnConflict::Fail
    };

    let mut rows = vec![];
    for data in &args.data {
        if let Some((name, _)) = data.relations().next() {
            return Err(Error::invalid_statement(format!(
                "createMany does not accept nested writes (`{}.{name}`)",
                model.name
            )));
        }

        let (mut columns, _) = insert_columns(adapter, model, data)?;
        columns.sort_by_key(|(field, _)| field.id.index);
        rows.push(columns);
    }

    // Rows sharing a column list become one multi-row VALUES.
    let groups: Vec<(Vec<&Field>, Vec<Vec<Sql>>)> = match adapter.default_value() {
        Some(default) => {
            let mut union: Vec<&Field> = vec![];
            for &(field, _) in rows.iter().flatten() {
                if !union.iter().any(|seen| seen.id == field.id) {
                    union.push(field);
                }
            }
            union.sort_by_key(|field| field.id.index);

            let values = rows
                .into_iter()
                .map(|row| {
                    let mut row: IndexMap<usize, Sql> = row
                        .into_iter()
                        .map(|(field, value)| (field.id.index, value))
                        .collect();
                    union
                        .iter()
                        .map(|field| {
                            row.swap_remove(&field.id.index)
                                .unwrap_or_else(|| default.clone())
                        })
                        .collect()
                })
                .collect();

            vec![(union, values)]
        }
        None => {
            let mut groups: IndexMap<Vec<usize>, (Vec<&Field>, Vec<Vec<Sql>>)> = IndexMap::new();

            for row in rows {
                let (fields, values): (Vec<&Field>, Vec<Sql>) = row.into_iter().unzip();
                let key = fields.iter().map(|field| field.id.index).collect();
                groups
                    .entry(key)
                    .or_insert_with(|| (fields, vec![]))
                    .1
                    .push(values);
            }

            groups.into_values().collect()
        }
    };

    let limit = env
        .config
        .max_bind_params
        .unwrap_or(adapter.capability().max_bind_params)
        .max(1);

    let mut statements = vec![];

    for (fields, rows) in groups {
        if fields.is_empty() {
            for _ in rows {
                statements.push(adapter.insert(
                    model.table_name(),
                    vec![],
                    InsertSource::DefaultValues,
                    on_conflict.clone(),
                ));
            }
            continue;
        }

        let columns: Vec<String> = fields
            .iter()
            .map(|field| field.column_name().to_string())
            .collect();
        let per_statement = (limit / columns.len()).max(1);

        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<Vec<Sql>> = rows.by_ref().take(per_statement).collect();
            statements.push(adapter.insert(
                model.table_name(),
                columns.clone(),
                InsertSource::Values(chunk),
                on_conflict.clone(),
            ));
        }
    }

    tracing::trace!(
        rows = args.data.len(),
        statements = statements.len(),
        limit,
        "split createMany"
    );

    let result = statements.len() - 1;
    Ok(Plan { statements, result })
}

pub(crate) fn update(env: Env<'_>, model: &Model, args: &UpdateArgs) -> Result<Plan> {
    let adapter = env.adapter;

    if args.data.is_empty() {
        return Err(Error::invalid_statement(format!(
            "update of `{}` requires data",
            model.name
        )));
    }

    let readback = readback(env, args.selection.as_ref())?;
    let mut writer = Writer::new(env, false);
    let parent = RowRef::filtered(model, args.filter.clone());

    let mut owned = vec![];
    let mut remote = vec![];

    for (name, writes) in args.data.relations() {
        let relation = relation_of(model, name)?;

        match relation.foreign_key {
            ForeignKeySide::Local => {
                if let Some(target) = writer.owned(Some(&parent), relation, writes)? {
                    owned.push((relation, target));
                }
            }
            _ => remote.push((relation, writes)),
        }
    }

    for (relation, writes) in remote {
        writer.write_related(&parent, relation, writes)?;
    }

    let cx = Cx::root(env, model);
    let mut assignments = scalar_assignments(&cx, &args.data)?;

    for (relation, target) in owned {
        for (field, value) in writer.resolve_owned(relation, target)? {
            assignments.push((field.column_name().to_string(), value));
        }
    }

    let mut updated = None;

    if !assignments.is_empty() {
        let mut sql = adapter.update(
            model.table_name(),
            &cx.alias.name(),
            assignments,
            filter::translate(&cx, &args.filter)?,
        );

        if let (Some(selection), Some(Readback::Returning)) = (&args.selection, readback) {
            fmt!(&mut sql, " ", adapter.returning(returning_columns(&cx, selection)?));
        }

        updated = Some(writer.statement(sql));
    }

    let result = match (&args.selection, readback, updated) {
        (Some(_), Some(Readback::Returning), Some(index)) => index,
        (Some(selection), Some(_), _) => {
            let cx = Cx::root(env, model);
            let filter = rewritten(model, &args.filter, &args.data)?;
            let sql = read_where(&cx, selection, &filter)?;
            writer.statement(sql)
        }
        (_, _, Some(index)) => index,
        _ => writer.statement_count().checked_sub(1).ok_or_else(|| {
            Error::invalid_statement(format!("update of `{}` writes nothing", model.name))
        })?,
    };

    Ok(Plan {
        statements: writer.finish(),
        result,
    })
}

pub(crate) fn update_many(env: Env<'_>, model: &Model, args: &UpdateManyArgs) -> Result<Plan> {
    nested::reject_nested(model, &args.data)?;

    let cx = Cx::root(env, model);
    let assignments = scalar_assignments(&cx, &args.data)?;

    if assignments.is_empty() {
        return Err(Error::invalid_statement(format!(
            "updateMany of `{}` requires data",
            model.name
        )));
    }

    let sql = env.adapter.update(
        model.table_name(),
        &cx.alias.name(),
        assignments,
        filter::translate(&cx, &args.filter)?,
    );

    Ok(Plan {
        statements: vec![sql],
        result: 0,
    })
}

pub(crate) fn upsert(env: Env<'_>, model: &Model, args: &UpsertArgs) -> Result<Plan> {
    let adapter = env.adapter;

    for data in [&args.create, &args.update] {
        if let Some((name, _)) = data.relations().next() {
            return Err(Error::unsupported_feature(format!(
                "nested writes inside upsert (`{}.{name}`)",
                model.name
            )));
        }
    }

    let readback = readback(env, args.selection.as_ref())?;
    let keys = conflict_target(model, &args.filter)?;
    let (columns, _) = insert_columns(adapter, model, &args.create)?;
    let assignments = upsert_assignments(adapter, model, &args.update, &keys)?;

    let mut sql = insert(
        adapter,
        model,
        columns,
        OnConflict::Update {
            target: keys.iter().map(|key| key.column_name().to_string()).collect(),
            assignments,
        },
    );

    let mut statements = vec![];

    let result = match (&args.selection, readback) {
        (Some(selection), Some(Readback::Returning)) => {
            let columns = returning_columns(&Cx::root(env, model), selection)?;
            fmt!(&mut sql, " ", adapter.returning(columns));
            statements.push(sql);
            0
        }
        (Some(selection), Some(Readback::FollowUp)) => {
            let filter = rewritten(model, &args.filter, &args.update)?;

            // Either branch may have run, so both must leave the filter true
            for (name, op) in args.update.scalars() {
                let agrees = args.create.literal(name) == written(op).as_ref();
                if mentions(&args.filter, name) && !agrees {
                    return Err(unreadable(model, name, op));
                }
            }

            statements.push(sql);
            statements.push(read_where(&Cx::root(env, model), selection, &filter)?);
            1
        }
        _ => {
            statements.push(sql);
            0
        }
    };

    Ok(Plan { statements, result })
}

pub(crate) fn delete(env: Env<'_>, model: &Model, args: &DeleteArgs) -> Result<Plan> {
    let adapter = env.adapter;
    let readback = readback(env, args.selection.as_ref())?;
    let mut statements = vec![];

    // Emulated results are read before the rows disappear.
    if let (Some(selection), Some(Readback::FollowUp)) = (&args.selection, readback) {
        statements.push(read_where(&Cx::root(env, model), selection, &args.filter)?);
    }

    let cx = Cx::root(env, model);
    let mut sql = adapter.delete(
        model.table_name(),
        &cx.alias.name(),
        filter::translate(&cx, &args.filter)?,
    );

    if let (Some(selection), Some(Readback::Returning)) = (&args.selection, readback) {
        fmt!(&mut sql, " ", adapter.returning(returning_columns(&cx, selection)?));
    }

    statements.push(sql);

    let result = match readback {
        Some(Readback::FollowUp) => 0,
        _ => statements.len() - 1,
    };

    Ok(Plan { statements, result })
}

pub(crate) fn delete_many(env: Env<'_>, model: &Model, filter: &Where) -> Result<Plan> {
    let cx = Cx::root(env, model);
    let sql = env.adapter.delete(
        model.table_name(),
        &cx.alias.name(),
        filter::translate(&cx, filter)?,
    );

    Ok(Plan {
        statements: vec![sql],
        result: 0,
    })
}

/// `INSERT INTO "t" (..) VALUES (..)` for one row, or `DEFAULT VALUES` when
/// no column is written.
pub(crate) fn insert(
    adapter: &dyn Adapter,
    model: &Model,
    columns: Vec<(&Field, Sql)>,
    on_conflict: OnConflict,
) -> Sql {
    if columns.is_empty() {
        return adapter.insert(
            model.table_name(),
            vec![],
            InsertSource::DefaultValues,
            on_conflict,
        );
    }

    let (fields, values): (Vec<&Field>, Vec<Sql>) = columns.into_iter().unzip();

    adapter.insert(
        model.table_name(),
        fields
            .iter()
            .map(|field| field.column_name().to_string())
            .collect(),
        InsertSource::Values(vec![values]),
        on_conflict,
    )
}

/// The columns an INSERT writes for `data`, plus the literal values among
/// them.
pub(crate) fn insert_columns<'a>(
    adapter: &dyn Adapter,
    model: &'a Model,
    data: &Data,
) -> Result<(Vec<(&'a Field, Sql)>, IndexMap<String, Value>)> {
    let mut columns = vec![];
    let mut literals = IndexMap::new();

    for (name, op) in data.scalars() {
        let field = field_of(model, name)?;

        let value = match op {
            UpdateOp::Set(value) => {
                literals.insert(name.to_string(), value.clone());
                encode(adapter, field, value)
            }
            UpdateOp::Unset => Sql::param(Value::Null),
            op => {
                return Err(Error::invalid_operator(
                    format!("{}.{name}", model.name),
                    op.name(),
                    kind_name(field),
                ))
            }
        };

        columns.push((field, value));
    }

    Ok((columns, literals))
}

/// `SET` assignments for the scalar entries of `data`, against the row
/// aliased by `cx`.
pub(crate) fn scalar_assignments(cx: &Cx<'_>, data: &Data) -> Result<Vec<(String, Sql)>> {
    let mut assignments = vec![];

    for (name, op) in data.scalars() {
        let field = cx.field(name)?;
        let value = assignment(cx.adapter(), &cx.path(name), field, op, cx.column(field))?;
        assignments.push((field.column_name().to_string(), value));
    }

    Ok(assignments)
}

/// The update list of an upsert. Existing values are read through the
/// adapter's upsert qualifier. An empty update rewrites the first key
/// column with itself so the statement still reports the row.
pub(crate) fn upsert_assignments(
    adapter: &dyn Adapter,
    model: &Model,
    data: &Data,
    keys: &[&Field],
) -> Result<Vec<(String, Sql)>> {
    let qualifier = adapter.upsert_qualifier(model.table_name());
    let mut assignments = vec![];

    for (name, op) in data.scalars() {
        let field = field_of(model, name)?;
        let current = adapter.column(Some(&qualifier), field.column_name());
        let value = assignment(
            adapter,
            &format!("{}.{name}", model.name),
            field,
            op,
            current,
        )?;
        assignments.push((field.column_name().to_string(), value));
    }

    if assignments.is_empty() {
        if let Some(key) = keys.first() {
            assignments.push((
                key.column_name().to_string(),
                adapter.column(Some(&qualifier), key.column_name()),
            ));
        }
    }

    Ok(assignments)
}

/// The fields an upsert conflicts on: those the unique filter compares for
/// equality.
pub(crate) fn conflict_target<'a>(model: &'a Model, filter: &Where) -> Result<Vec<&'a Field>> {
    let mut keys = vec![];

    for (name, condition) in &filter.conditions {
        let equality = match condition {
            Condition::Equals(_) => true,
            Condition::Filter(filter) => matches!(filter.ops.as_slice(), [FilterOp::Equals(_)]),
            Condition::Relation(_) => false,
        };

        if equality {
            keys.push(field_of(model, name)?);
        }
    }

    if keys.is_empty() {
        return Err(Error::invalid_statement(format!(
            "upsert on `{}` requires a unique filter with equality conditions",
            model.name
        )));
    }

    Ok(keys)
}

/// One update operator applied to `current`, checked against the field's
/// kind.
pub(crate) fn assignment(
    adapter: &dyn Adapter,
    path: &str,
    field: &Field,
    op: &UpdateOp,
    current: Sql,
) -> Result<Sql> {
    let numeric = field.kind.is_numeric() && !field.list;
    let json = field.kind.is_json() && !field.list;

    let sql = match op {
        UpdateOp::Set(value) => encode(adapter, field, value),
        UpdateOp::Unset if field.nullable => Sql::param(Value::Null),
        UpdateOp::Increment(value) if numeric => adapter.increment(current, Sql::param(value.clone())),
        UpdateOp::Decrement(value) if numeric => adapter.decrement(current, Sql::param(value.clone())),
        UpdateOp::Multiply(value) if numeric => adapter.multiply(current, Sql::param(value.clone())),
        UpdateOp::Divide(value) if numeric => adapter.divide(current, Sql::param(value.clone())),
        UpdateOp::Push(value) if field.list => adapter.push(current, value.clone()),
        UpdateOp::Merge(value) if json => adapter.merge(current, value.to_json()),
        UpdateOp::SetPath { path: segments, value } if json => {
            adapter.set_path(current, segments, value.to_json())
        }
        _ => return Err(Error::invalid_operator(path, op.name(), kind_name(field))),
    };

    Ok(sql)
}

/// A value written to `field`, bound the way the field's kind requires.
pub(crate) fn encode(adapter: &dyn Adapter, field: &Field, value: &Value) -> Sql {
    match value {
        Value::Null => Sql::param(Value::Null),
        Value::List(values) if field.list => adapter.list_param(values.clone()),
        _ if field.list => adapter.list_param(vec![value.clone()]),
        _ if field.kind.is_json() => adapter.json_param(value.to_json()),
        _ => match field.kind {
            ScalarKind::Vector => adapter.vector_param(value.clone()),
            ScalarKind::Point => adapter.point_param(value.clone()),
            _ => Sql::param(value.clone()),
        },
    }
}

pub(crate) fn relation_of<'a>(model: &'a Model, name: &str) -> Result<&'a Relation> {
    model
        .relation_by_name(name)
        .ok_or_else(|| Error::unknown_field(format!("{}.{name}", model.name)))
}

fn field_of<'a>(model: &'a Model, name: &str) -> Result<&'a Field> {
    model
        .field_by_name(name)
        .ok_or_else(|| Error::unknown_field(format!("{}.{name}", model.name)))
}

fn kind_name(field: &Field) -> String {
    filter::target(field, "").kind_name()
}

fn readback(env: Env<'_>, selection: Option<&Selection>) -> Result<Option<Readback>> {
    let Some(selection) = selection else {
        return Ok(None);
    };

    let adapter = env.adapter;

    if selection.is_scalar_only() && adapter.capability().returning {
        return Ok(Some(Readback::Returning));
    }

    if !adapter.capability().returning && !env.config.emulate_returning {
        return Err(Error::unsupported_feature(format!(
            "{} has no RETURNING and returning emulation is disabled",
            adapter.name()
        )));
    }

    Ok(Some(Readback::FollowUp))
}

/// Unqualified columns for a RETURNING clause.
fn returning_columns(cx: &Cx<'_>, selection: &Selection) -> Result<Vec<Sql>> {
    let adapter = cx.adapter();

    Ok(select::scalar_fields(cx, &selection.scalars)?
        .into_iter()
        .map(|field| {
            let column = adapter.column(None, field.column_name());
            if field.column_name() == field.app_name() {
                column
            } else {
                adapter.aliased(column, field.app_name())
            }
        })
        .collect())
}

/// Reads one record of `cx.model` matching `filter`.
fn read_where(cx: &Cx<'_>, selection: &Selection, filter: &Where) -> Result<Sql> {
    let args = FindArgs {
        filter: filter.clone(),
        selection: selection.clone(),
        ..FindArgs::default()
    };
    let (sql, _) = select::find(cx, &args, Clauses::select_from(cx.table()), true)?;
    Ok(sql)
}

/// `filter` as it reads once `data` is written: a condition on a field the
/// data sets to a literal compares against the new value instead.
fn rewritten(model: &Model, filter: &Where, data: &Data) -> Result<Where> {
    let mut filter = filter.clone();
    overlay(model, &mut filter, data)?;
    Ok(filter)
}

fn overlay(model: &Model, filter: &mut Where, data: &Data) -> Result<()> {
    for (name, condition) in filter.conditions.iter_mut() {
        let Some((_, op)) = data.scalars().find(|(field, _)| *field == name.as_str()) else {
            continue;
        };

        match written(op) {
            Some(value) => *condition = Condition::Equals(value),
            None => return Err(unreadable(model, name, op)),
        }
    }

    for item in &mut filter.and {
        overlay(model, item, data)?;
    }

    for item in filter.or.iter().flatten().chain(&filter.not) {
        if let Some((name, op)) = data.scalars().find(|(name, _)| mentions(item, name)) {
            return Err(unreadable(model, name, op));
        }
    }

    Ok(())
}

/// The value an update operator leaves behind, when known without reading
/// the row.
fn written(op: &UpdateOp) -> Option<Value> {
    match op {
        UpdateOp::Set(value) => Some(value.clone()),
        UpdateOp::Unset => Some(Value::Null),
        _ => None,
    }
}

fn mentions(filter: &Where, name: &str) -> bool {
    filter.conditions.contains_key(name)
        || filter
            .and
            .iter()
            .chain(filter.or.iter().flatten())
            .chain(&filter.not)
            .any(|item| mentions(item, name))
}

fn unreadable(model: &Model, name: &str, op: &UpdateOp) -> Error {
    Error::unsupported_feature(format!(
        "reading back `{}` after `{}.{name}` rewrites a filtered field",
        model.name,
        op.name()
    ))
}

fn read_one(cx: &Cx<'_>, selection: &Selection, clauses: Clauses) -> Result<Sql> {
    let args = FindArgs {
        selection: selection.clone(),
        ..FindArgs::default()
    };
    let (sql, _) = select::find(cx, &args, clauses, true)?;
    Ok(sql)
}

/// Ends a CTE chain with the SELECT that answers a nested create.
fn chain_result(
    writer: &mut Writer<'_>,
    env: Env<'_>,
    model: &Model,
    row: &RowRef<'_>,
    selection: Option<&Selection>,
    readback: Option<Readback>,
) -> Result<usize> {
    let adapter = env.adapter;
    let ctes = writer.take_ctes();

    let Some(name) = row.cte() else {
        return Err(Error::invalid_statement("created row is missing from the CTE chain"));
    };

    let cx = Cx::root(env, model);
    let mut clauses = Clauses::select_from(Sql::raw(format!("{name} AS {}", cx.alias)));
    clauses.ctes = ctes;

    let scalars = match (selection, readback) {
        (Some(selection), Some(Readback::Returning)) => selection.clone(),
        (Some(selection), _) => Selection {
            scalars: selection.scalars.clone(),
            ..Selection::default()
        },
        (None, _) => Selection::only(model.primary_key_fields().map(|field| field.app_name())),
    };

    let main = writer.statement(read_one(&cx, &scalars, clauses)?);

    let (Some(selection), Some(Readback::FollowUp)) = (selection, readback) else {
        return Ok(main);
    };

    // Relations of the created row are loaded once the chain has run.
    let Some(key) = row.key_filter() else {
        return Err(Error::unsupported_feature(format!(
            "{} cannot include relations of a nested create without a literal key on `{}`",
            adapter.name(),
            model.name
        )));
    };

    let cx = Cx::root(env, model);
    Ok(writer.statement(read_where(&cx, selection, &key)?))
}
