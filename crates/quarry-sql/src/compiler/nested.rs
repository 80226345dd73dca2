use super::{clauses::Clauses, filter, mutation, relation, Cx, Env};
use crate::{
    adapter::{InsertSource, OnConflict},
    Sql,
};

use indexmap::IndexMap;
use quarry_core::{
    schema::{Field, ForeignKeySide, Model, Relation},
    stmt::{Condition, Data, FilterOp, NestedWrites, QueryMode, Value, Where},
    Error, Result,
};

/// Accumulates the statements of one mutation, in execution order.
///
/// With CTE chaining enabled every emitted statement becomes a `wN` CTE and
/// the caller finishes the chain with a single SELECT.
pub(crate) struct Writer<'a> {
    env: Env<'a>,
    statements: Vec<Sql>,
    ctes: Option<Vec<(String, Sql)>>,

    /// INSERTs emitted so far outside of a CTE chain
    inserts: usize,
}

/// A row written, or about to be written, by the current mutation.
pub(crate) struct RowRef<'a> {
    model: &'a Model,

    /// Values the row is known to hold, by field name
    literals: IndexMap<String, Value>,
    source: RowSource,

    /// The statement that wrote the row, when it was not chained
    pub(crate) statement: Option<usize>,
}

enum RowSource {
    /// An existing row matched by a unique filter
    Filter(Where),

    /// A row returned by a CTE
    Cte(String),

    /// A row whose key the database generated. Readable through
    /// `last_insert_id` until the next INSERT; the value is the insert count
    /// right after the row was written.
    Generated(usize),

    /// A row with no key to find it by
    Unknown,
}

/// A column of another written row, copied into an INSERT once every
/// prerequisite of the INSERT has been emitted.
pub(crate) struct Link<'r, 'a> {
    row: &'r RowRef<'a>,
    field: &'a Field,
}

/// The related row a parent's own foreign key points at after the write.
pub(crate) enum Owned<'a> {
    Row(RowRef<'a>),
    Lookup(&'a Where),

    /// A row created unless it already existed, then looked up
    Coalesce(RowRef<'a>, &'a Where),
    Null,
}

enum Emitted {
    Statement(usize),
    Cte(String),
}

impl<'a> Writer<'a> {
    pub(crate) fn new(env: Env<'a>, chained: bool) -> Writer<'a> {
        Writer {
            env,
            statements: vec![],
            ctes: if chained { Some(vec![]) } else { None },
            inserts: 0,
        }
    }

    pub(crate) fn is_chained(&self) -> bool {
        self.ctes.is_some()
    }

    /// Ends the CTE chain. Later statements are emitted standalone.
    pub(crate) fn take_ctes(&mut self) -> Vec<(String, Sql)> {
        self.ctes.take().unwrap_or_default()
    }

    /// Emits a statement outside of any CTE chain and returns its index.
    pub(crate) fn statement(&mut self, sql: Sql) -> usize {
        self.statements.push(sql);
        self.statements.len() - 1
    }

    pub(crate) fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub(crate) fn finish(self) -> Vec<Sql> {
        self.statements
    }

    fn push(&mut self, sql: Sql, insert: bool) -> Emitted {
        match &mut self.ctes {
            Some(ctes) => {
                let name = format!("w{}", ctes.len());
                ctes.push((name.clone(), sql));
                Emitted::Cte(name)
            }
            None => {
                if insert {
                    self.inserts += 1;
                }
                Emitted::Statement(self.statement(sql))
            }
        }
    }

    /// Inserts one `model` row from `data`, writing the relations it owns
    /// first and the relations that point at it afterwards.
    pub(crate) fn create(
        &mut self,
        model: &'a Model,
        data: &'a Data,
        links: Vec<(&'a Field, Link<'_, 'a>)>,
        on_conflict: OnConflict,
        returning: Option<Vec<Sql>>,
    ) -> Result<RowRef<'a>> {
        let mut owned = vec![];
        let mut remote = vec![];

        for (name, writes) in data.relations() {
            let relation = mutation::relation_of(model, name)?;

            if !writes.is_create_only() {
                return Err(Error::invalid_statement(format!(
                    "`{}.{name}` only accepts create, connect and connectOrCreate inside a create",
                    model.name
                )));
            }

            match relation.foreign_key {
                ForeignKeySide::Local => {
                    if let Some(target) = self.owned(None, relation, writes)? {
                        owned.push((relation, target));
                    }
                }
                _ => remote.push((relation, writes)),
            }
        }

        // Values are resolved only once every prerequisite row is written.
        let (mut columns, literals) = mutation::insert_columns(self.env.adapter, model, data)?;

        for (field, link) in links {
            columns.push((field, link.row.value(self, link.field)?));
        }

        for (relation, target) in owned {
            columns.extend(self.resolve_owned(relation, target)?);
        }

        let row = self.insert(model, columns, literals, on_conflict, returning)?;

        for (relation, writes) in remote {
            self.write_related(&row, relation, writes)?;
        }

        Ok(row)
    }

    /// Processes the directives of a relation whose foreign key lives on the
    /// parent. Returns the row the key must point at, if it changes.
    ///
    /// `parent` is `None` while the parent itself is being created.
    pub(crate) fn owned(
        &mut self,
        parent: Option<&RowRef<'a>>,
        relation: &'a Relation,
        writes: &'a NestedWrites,
    ) -> Result<Option<Owned<'a>>> {
        let target = self.env.schema.target(relation);
        let path = format!("{}.{}", relation_owner(self, relation).name, relation.name);
        let mut result = None;

        if writes.set.is_some() {
            return Err(Error::invalid_statement(format!(
                "`{path}` is a to-one relation and does not accept set"
            )));
        }

        if !writes.upsert.is_empty() {
            return Err(Error::unsupported_feature(format!(
                "upsert through `{path}`, which holds the foreign key"
            )));
        }

        if let Some(parent) = parent {
            for filter in &writes.disconnect {
                if filter.is_empty() {
                    result = Some(Owned::Null);
                } else {
                    self.disconnect_guarded(parent, relation, filter)?;
                }
            }

            for filter in &writes.delete {
                let cx = Cx::root(self.env, target);
                let predicate = self.linked_to(&cx, relation, parent, filter)?;
                let sql = self
                    .env
                    .adapter
                    .delete(target.table_name(), &cx.alias.name(), Some(predicate));
                self.push(sql, false);
            }

            for update in &writes.update {
                let cx = Cx::root(self.env, target);
                let predicate = self.linked_to(&cx, relation, parent, &update.filter)?;
                let sql = nested_update(&cx, &update.data, predicate)?;
                self.push(sql, false);
            }
        }

        for data in &writes.create {
            result = Some(Owned::Row(self.create(
                target,
                data,
                vec![],
                OnConflict::Fail,
                None,
            )?));
        }

        for item in &writes.connect_or_create {
            let row = self.create(target, &item.create, vec![], OnConflict::Ignore, None)?;
            result = Some(if self.is_chained() {
                Owned::Coalesce(row, &item.filter)
            } else {
                Owned::Lookup(&item.filter)
            });
        }

        if let Some(filter) = writes.connect.last() {
            result = Some(Owned::Lookup(filter));
        }

        Ok(result)
    }

    /// The parent's foreign-key assignments for `owned`.
    pub(crate) fn resolve_owned(
        &mut self,
        relation: &'a Relation,
        owned: Owned<'a>,
    ) -> Result<Vec<(&'a Field, Sql)>> {
        let adapter = self.env.adapter;
        let target = self.env.schema.target(relation);
        let (fields, references) = relation::keys(self.env.schema, relation);

        let mut assignments = vec![];

        for (field, reference) in fields.into_iter().zip(references) {
            let value = match &owned {
                Owned::Row(row) => row.value(self, reference)?,
                Owned::Lookup(filter) => lookup(self.env, target, filter, reference)?,
                Owned::Coalesce(row, filter) => adapter.coalesce(vec![
                    row.value(self, reference)?,
                    lookup(self.env, target, filter, reference)?,
                ]),
                Owned::Null if field.nullable => Sql::param(Value::Null),
                Owned::Null => {
                    return Err(Error::invalid_statement(format!(
                        "`{}.{}` is required and cannot be disconnected",
                        relation_owner(self, relation).name,
                        relation.name
                    )))
                }
            };
            assignments.push((field, value));
        }

        Ok(assignments)
    }

    /// Processes the directives of a relation whose foreign key lives on the
    /// target or in a join table.
    pub(crate) fn write_related(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        writes: &'a NestedWrites,
    ) -> Result<()> {
        match relation.foreign_key {
            ForeignKeySide::Target => self.write_children(parent, relation, writes),
            ForeignKeySide::JoinTable => self.write_linked(parent, relation, writes),
            ForeignKeySide::Local => Err(Error::invalid_statement(format!(
                "`{}.{}` holds its own foreign key",
                parent.model.name, relation.name
            ))),
        }
    }

    fn write_children(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        writes: &'a NestedWrites,
    ) -> Result<()> {
        let adapter = self.env.adapter;
        let target = self.env.schema.target(relation);
        let (fields, references) = relation::keys(self.env.schema, relation);

        for filter in &writes.disconnect {
            self.disconnect_children(parent, relation, filter)?;
        }

        if let Some(filters) = &writes.set {
            self.disconnect_children(parent, relation, &Where::new())?;

            for filter in filters {
                self.connect_children(parent, relation, filter)?;
            }
        }

        for filter in &writes.delete {
            let cx = Cx::root(self.env, target);
            let predicate = self.linked_to(&cx, relation, parent, filter)?;
            let sql = adapter.delete(target.table_name(), &cx.alias.name(), Some(predicate));
            self.push(sql, false);
        }

        for update in &writes.update {
            let cx = Cx::root(self.env, target);
            let predicate = self.linked_to(&cx, relation, parent, &update.filter)?;
            let sql = nested_update(&cx, &update.data, predicate)?;
            self.push(sql, false);
        }

        for upsert in &writes.upsert {
            for data in [&upsert.create, &upsert.update] {
                reject_nested(target, data)?;
            }

            let keys = mutation::conflict_target(target, &upsert.filter)?;
            let (mut columns, _) = mutation::insert_columns(adapter, target, &upsert.create)?;

            for (&reference, &field) in references.iter().zip(&fields) {
                columns.push((reference, parent.value(self, field)?));
            }

            let assignments = mutation::upsert_assignments(adapter, target, &upsert.update, &keys)?;
            let sql = mutation::insert(
                adapter,
                target,
                columns,
                OnConflict::Update {
                    target: keys.iter().map(|key| key.column_name().to_string()).collect(),
                    assignments,
                },
            );
            self.push(sql, true);
        }

        for data in &writes.create {
            let links = references
                .iter()
                .zip(&fields)
                .map(|(&reference, &field)| (reference, Link { row: parent, field }))
                .collect();
            self.create(target, data, links, OnConflict::Fail, None)?;
        }

        for item in &writes.connect_or_create {
            self.connect_children(parent, relation, &item.filter)?;

            let links = references
                .iter()
                .zip(&fields)
                .map(|(&reference, &field)| (reference, Link { row: parent, field }))
                .collect();
            self.create(target, &item.create, links, OnConflict::Ignore, None)?;
        }

        for filter in &writes.connect {
            self.connect_children(parent, relation, filter)?;
        }

        Ok(())
    }

    fn write_linked(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        writes: &'a NestedWrites,
    ) -> Result<()> {
        let adapter = self.env.adapter;
        let target = self.env.schema.target(relation);
        let join_table = relation.expect_join_table();
        let (fields, references) = relation::keys(self.env.schema, relation);

        let columns: Vec<String> = join_table
            .local_columns
            .iter()
            .chain(&join_table.target_columns)
            .cloned()
            .collect();

        for filter in &writes.disconnect {
            self.unlink(parent, relation, Some(filter))?;
        }

        if let Some(filters) = &writes.set {
            self.unlink(parent, relation, None)?;

            for filter in filters {
                self.link(parent, relation, filter)?;
            }
        }

        for filter in &writes.delete {
            let cx = Cx::root(self.env, target);
            let predicate = self.linked_to(&cx, relation, parent, filter)?;
            let sql = adapter.delete(target.table_name(), &cx.alias.name(), Some(predicate));
            self.push(sql, false);
        }

        for update in &writes.update {
            let cx = Cx::root(self.env, target);
            let predicate = self.linked_to(&cx, relation, parent, &update.filter)?;
            let sql = nested_update(&cx, &update.data, predicate)?;
            self.push(sql, false);
        }

        if !writes.upsert.is_empty() {
            return Err(Error::unsupported_feature(format!(
                "upsert through the many-to-many relation `{}.{}`",
                parent.model.name, relation.name
            )));
        }

        for data in &writes.create {
            let row = self.create(target, data, vec![], OnConflict::Fail, None)?;

            let mut values = vec![];
            for &field in &fields {
                values.push(parent.value(self, field)?);
            }
            for &reference in &references {
                values.push(row.value(self, reference)?);
            }

            let sql = adapter.insert(
                &join_table.name,
                columns.clone(),
                InsertSource::Values(vec![values]),
                OnConflict::Fail,
            );
            self.push(sql, true);
        }

        for item in &writes.connect_or_create {
            let row = self.create(target, &item.create, vec![], OnConflict::Ignore, None)?;

            if !self.is_chained() {
                self.link(parent, relation, &item.filter)?;
                continue;
            }

            let mut values = vec![];
            for &field in &fields {
                values.push(parent.value(self, field)?);
            }
            for &reference in &references {
                values.push(adapter.coalesce(vec![
                    row.value(self, reference)?,
                    lookup(self.env, target, &item.filter, reference)?,
                ]));
            }

            let sql = adapter.insert(
                &join_table.name,
                columns.clone(),
                InsertSource::Values(vec![values]),
                OnConflict::Ignore,
            );
            self.push(sql, true);
        }

        for filter in &writes.connect {
            self.link(parent, relation, filter)?;
        }

        Ok(())
    }

    fn insert(
        &mut self,
        model: &'a Model,
        columns: Vec<(&'a Field, Sql)>,
        literals: IndexMap<String, Value>,
        on_conflict: OnConflict,
        returning: Option<Vec<Sql>>,
    ) -> Result<RowRef<'a>> {
        let adapter = self.env.adapter;
        let mut sql = mutation::insert(adapter, model, columns, on_conflict);

        if self.is_chained() {
            fmt!(&mut sql, " ", adapter.returning(vec![Sql::raw("*")]));
        } else if let Some(columns) = returning {
            fmt!(&mut sql, " ", adapter.returning(columns));
        }

        let (source, statement) = match self.push(sql, true) {
            Emitted::Cte(name) => (RowSource::Cte(name), None),
            Emitted::Statement(index) => (key_source(model, &literals, self.inserts), Some(index)),
        };

        Ok(RowRef {
            model,
            literals,
            source,
            statement,
        })
    }

    /// `UPDATE target SET fk = parent key WHERE <filter>`
    fn connect_children(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        filter: &Where,
    ) -> Result<()> {
        let target = self.env.schema.target(relation);
        let (fields, references) = relation::keys(self.env.schema, relation);
        let cx = Cx::root(self.env, target);

        let mut assignments = vec![];
        for (reference, &field) in references.iter().zip(&fields) {
            assignments.push((reference.column_name().to_string(), parent.value(self, field)?));
        }

        let sql = self.env.adapter.update(
            target.table_name(),
            &cx.alias.name(),
            assignments,
            filter::translate(&cx, filter)?,
        );
        self.push(sql, false);
        Ok(())
    }

    /// `UPDATE target SET fk = NULL WHERE fk = parent key AND <filter>`
    fn disconnect_children(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        filter: &Where,
    ) -> Result<()> {
        let target = self.env.schema.target(relation);
        let (_, references) = relation::keys(self.env.schema, relation);

        if let Some(required) = references.iter().find(|reference| !reference.nullable) {
            return Err(Error::invalid_statement(format!(
                "`{}.{}` cannot be disconnected: `{}.{}` is required",
                parent.model.name,
                relation.name,
                target.name,
                required.app_name()
            )));
        }

        let cx = Cx::root(self.env, target);
        let predicate = self.linked_to(&cx, relation, parent, filter)?;
        let assignments = references
            .iter()
            .map(|reference| (reference.column_name().to_string(), Sql::param(Value::Null)))
            .collect();

        let sql = self.env.adapter.update(
            target.table_name(),
            &cx.alias.name(),
            assignments,
            Some(predicate),
        );
        self.push(sql, false);
        Ok(())
    }

    /// Clears the parent's foreign key only when the linked record matches
    /// `filter`.
    fn disconnect_guarded(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        filter: &Where,
    ) -> Result<()> {
        let RowSource::Filter(selector) = &parent.source else {
            return Err(Error::unsupported_feature(format!(
                "filtered disconnect of `{}.{}` on a row without a unique filter",
                parent.model.name, relation.name
            )));
        };

        let guarded = selector
            .clone()
            .is(relation.name.clone(), Some(filter.clone()));
        let cx = Cx::root(self.env, parent.model);
        let predicate = filter::translate(&cx, &guarded)?;
        let assignments = self
            .resolve_owned(relation, Owned::Null)?
            .into_iter()
            .map(|(field, value)| (field.column_name().to_string(), value))
            .collect();

        let sql = self.env.adapter.update(
            parent.model.table_name(),
            &cx.alias.name(),
            assignments,
            predicate,
        );
        self.push(sql, false);
        Ok(())
    }

    /// `INSERT INTO jt (..) SELECT parent key, ref FROM target WHERE <filter>`
    fn link(&mut self, parent: &RowRef<'a>, relation: &'a Relation, filter: &Where) -> Result<()> {
        let adapter = self.env.adapter;
        let target = self.env.schema.target(relation);
        let join_table = relation.expect_join_table();
        let (fields, references) = relation::keys(self.env.schema, relation);
        let cx = Cx::root(self.env, target);

        let mut clauses = Clauses::select_from(cx.table());
        for &field in &fields {
            clauses.columns.push(parent.value(self, field)?);
        }
        for &reference in &references {
            clauses.columns.push(cx.column(reference));
        }
        clauses.filters.extend(filter::translate(&cx, filter)?);

        let columns = join_table
            .local_columns
            .iter()
            .chain(&join_table.target_columns)
            .cloned()
            .collect();

        let sql = adapter.insert(
            &join_table.name,
            columns,
            InsertSource::Select(clauses.assemble(adapter)?),
            OnConflict::Ignore,
        );
        self.push(sql, true);
        Ok(())
    }

    /// Deletes join rows of `parent`, restricted to targets matching
    /// `filter` when one is given.
    fn unlink(
        &mut self,
        parent: &RowRef<'a>,
        relation: &'a Relation,
        filter: Option<&Where>,
    ) -> Result<()> {
        let adapter = self.env.adapter;
        let target = self.env.schema.target(relation);
        let join_table = relation.expect_join_table();
        let (fields, references) = relation::keys(self.env.schema, relation);
        let alias = self.env.aliases.next().name();

        let mut pairs = vec![];
        for (column, &field) in join_table.local_columns.iter().zip(&fields) {
            pairs.push((adapter.column(Some(&alias), column), parent.value(self, field)?));
        }
        let mut conjuncts = vec![adapter.correlation(pairs)];

        if let Some(filter) = filter.filter(|filter| !filter.is_empty()) {
            let cx = Cx::root(self.env, target);
            let mut clauses = Clauses::select_from(cx.table());
            clauses.columns.push(Sql::raw("1"));
            clauses.filters.push(
                adapter.correlation(
                    references
                        .iter()
                        .zip(&join_table.target_columns)
                        .map(|(reference, column)| {
                            (cx.column(reference), adapter.column(Some(&alias), column))
                        })
                        .collect(),
                ),
            );
            clauses.filters.extend(filter::translate(&cx, filter)?);
            conjuncts.push(adapter.exists(clauses.assemble(adapter)?));
        }

        let sql = adapter.delete(&join_table.name, &alias, Some(adapter.and(conjuncts)));
        self.push(sql, false);
        Ok(())
    }

    /// Rows of `cx.model` linked to `parent` through `relation` and matching
    /// `filter`.
    fn linked_to(
        &mut self,
        cx: &Cx<'a>,
        relation: &'a Relation,
        parent: &RowRef<'a>,
        filter: &Where,
    ) -> Result<Sql> {
        let adapter = self.env.adapter;
        let (fields, references) = relation::keys(self.env.schema, relation);

        let link = match relation.foreign_key {
            ForeignKeySide::Local | ForeignKeySide::Target => {
                let mut pairs = vec![];
                for (&reference, &field) in references.iter().zip(&fields) {
                    pairs.push((cx.column(reference), parent.value(self, field)?));
                }
                adapter.correlation(pairs)
            }
            ForeignKeySide::JoinTable => {
                let join_table = relation.expect_join_table();
                let alias = cx.alias.derived("j").name();

                let mut clauses = Clauses::select_from(adapter.table_as(&join_table.name, &alias));
                clauses.columns.push(Sql::raw("1"));
                clauses.filters.push(
                    adapter.correlation(
                        join_table
                            .target_columns
                            .iter()
                            .zip(&references)
                            .map(|(column, reference)| {
                                (adapter.column(Some(&alias), column), cx.column(reference))
                            })
                            .collect(),
                    ),
                );

                let mut pairs = vec![];
                for (column, &field) in join_table.local_columns.iter().zip(&fields) {
                    pairs.push((adapter.column(Some(&alias), column), parent.value(self, field)?));
                }
                clauses.filters.push(adapter.correlation(pairs));

                adapter.exists(clauses.assemble(adapter)?)
            }
        };

        let mut conjuncts = vec![link];
        conjuncts.extend(filter::translate(cx, filter)?);
        Ok(adapter.and(conjuncts))
    }
}

impl<'a> RowRef<'a> {
    /// An existing row selected by `filter`. Fields the filter compares for
    /// equality are known without a lookup.
    pub(crate) fn filtered(model: &'a Model, filter: Where) -> RowRef<'a> {
        let mut literals = IndexMap::new();

        for (name, condition) in &filter.conditions {
            let value = match condition {
                Condition::Equals(value) => value,
                Condition::Filter(filter) => match filter.ops.as_slice() {
                    [FilterOp::Equals(value)] if filter.mode == QueryMode::Default => value,
                    _ => continue,
                },
                Condition::Relation(_) => continue,
            };

            if !value.is_null() && model.field_by_name(name).is_some() {
                literals.insert(name.clone(), value.clone());
            }
        }

        RowRef {
            model,
            literals,
            source: RowSource::Filter(filter),
            statement: None,
        }
    }

    /// A filter on the primary key, when the row's key values are literals.
    pub(crate) fn key_filter(&self) -> Option<Where> {
        key_filter(self.model, &self.literals)
    }

    /// The CTE the row was written by.
    pub(crate) fn cte(&self) -> Option<&str> {
        match &self.source {
            RowSource::Cte(name) => Some(name),
            _ => None,
        }
    }

    /// An expression for the value of `field` in this row.
    pub(crate) fn value(&self, writer: &mut Writer<'a>, field: &'a Field) -> Result<Sql> {
        let env = writer.env;
        let adapter = env.adapter;

        if let Some(value) = self.literals.get(field.app_name()) {
            return Ok(mutation::encode(adapter, field, value));
        }

        match &self.source {
            RowSource::Filter(filter) => lookup(env, self.model, filter, field),
            RowSource::Cte(name) => {
                let mut clauses = Clauses::select_from(Sql::raw(name.clone()));
                clauses.columns.push(adapter.column(None, field.column_name()));
                Ok(adapter.scalar(clauses.assemble(adapter)?))
            }
            RowSource::Generated(epoch) => {
                if *epoch != writer.inserts {
                    return Err(Error::unsupported_feature(format!(
                        "{} cannot read the generated key of `{}` after another insert",
                        adapter.name(),
                        self.model.name
                    )));
                }

                let Some(key) = self.model.primary_key_fields().next() else {
                    return Err(unknown_key(self.model));
                };
                let id = adapter.last_insert_id(self.model.table_name(), key.column_name());

                if field.id == key.id {
                    return Ok(id);
                }

                let cx = Cx::root(env, self.model);
                let mut clauses = Clauses::select_from(cx.table());
                clauses.columns.push(cx.column(field));
                clauses.filters.push(adapter.eq(cx.column(key), id));
                Ok(adapter.scalar(clauses.assemble(adapter)?))
            }
            RowSource::Unknown => Err(unknown_key(self.model)),
        }
    }
}

/// `(SELECT field FROM model WHERE <filter>)`
pub(crate) fn lookup(env: Env<'_>, model: &Model, filter: &Where, field: &Field) -> Result<Sql> {
    let adapter = env.adapter;
    let cx = Cx::root(env, model);

    let mut clauses = Clauses::select_from(cx.table());
    clauses.columns.push(cx.column(field));
    clauses.filters.extend(filter::translate(&cx, filter)?);
    Ok(adapter.scalar(clauses.assemble(adapter)?))
}

/// Nested writes are only accepted one level below a create or update.
pub(crate) fn reject_nested(model: &Model, data: &Data) -> Result<()> {
    match data.relations().next() {
        Some((name, _)) => Err(Error::unsupported_feature(format!(
            "nested writes below `{}.{name}`",
            model.name
        ))),
        None => Ok(()),
    }
}

fn nested_update(cx: &Cx<'_>, data: &Data, predicate: Sql) -> Result<Sql> {
    reject_nested(cx.model, data)?;

    let assignments = mutation::scalar_assignments(cx, data)?;
    if assignments.is_empty() {
        return Err(Error::invalid_statement(format!(
            "nested update of `{}` sets no fields",
            cx.model.name
        )));
    }

    Ok(cx.adapter().update(
        cx.model.table_name(),
        &cx.alias.name(),
        assignments,
        Some(predicate),
    ))
}

fn key_source(model: &Model, literals: &IndexMap<String, Value>, inserts: usize) -> RowSource {
    if let Some(filter) = key_filter(model, literals) {
        return RowSource::Filter(filter);
    }

    let key: Vec<&Field> = model.primary_key_fields().collect();
    match key.as_slice() {
        [field] if field.auto_increment => RowSource::Generated(inserts),
        _ => RowSource::Unknown,
    }
}

fn key_filter(model: &Model, literals: &IndexMap<String, Value>) -> Option<Where> {
    let mut filter = Where::new();

    for field in model.primary_key_fields() {
        let value = literals.get(field.app_name()).filter(|value| !value.is_null())?;
        filter = filter.equals(field.app_name(), value.clone());
    }

    if filter.is_empty() {
        None
    } else {
        Some(filter)
    }
}

fn relation_owner<'a>(writer: &Writer<'a>, relation: &Relation) -> &'a Model {
    writer.env.schema.model(relation.id.model)
}

fn unknown_key(model: &Model) -> Error {
    Error::unsupported_feature(format!(
        "the written `{}` row has no known key to reference",
        model.name
    ))
}
