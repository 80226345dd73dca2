use super::{Aliases, Alias, Config};
use crate::{Adapter, Sql};

use quarry_core::{
    schema::{Field, Member, Model, Relation},
    Error, Result, Schema,
};

/// Everything a compilation borrows for its whole duration.
#[derive(Clone, Copy)]
pub(crate) struct Env<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) adapter: &'a dyn Adapter,
    pub(crate) config: &'a Config,
    pub(crate) aliases: &'a Aliases,
}

/// Builder context: the model an expression is built against, and the alias
/// it is reachable through.
///
/// A child context is created for every traversed relation. It keeps a
/// pointer to its parent, which supplies the correlation alias and the
/// dotted path used in error messages.
pub(crate) struct Cx<'a> {
    pub(crate) env: Env<'a>,
    pub(crate) model: &'a Model,
    pub(crate) alias: Alias,

    /// Relation traversed to reach this context
    relation: Option<&'a Relation>,
    parent: Option<&'a Cx<'a>>,
}

impl<'a> Cx<'a> {
    pub(crate) fn root(env: Env<'a>, model: &'a Model) -> Cx<'a> {
        Cx {
            env,
            model,
            alias: env.aliases.next(),
            relation: None,
            parent: None,
        }
    }

    /// Enters `relation`, allocating a fresh alias for its target.
    pub(crate) fn scope<'child>(&'child self, relation: &'child Relation) -> Cx<'child> {
        let model = self.env.schema.target(relation);
        let alias = self.env.aliases.next();

        tracing::trace!(
            relation = %self.path(&relation.name),
            alias = %alias,
            "traversing relation"
        );

        Cx {
            env: self.env,
            model,
            alias,
            relation: Some(relation),
            parent: Some(self),
        }
    }

    /// The same model reached through another alias.
    pub(crate) fn rebind<'child>(&'child self, alias: Alias) -> Cx<'child> {
        Cx {
            env: self.env,
            model: self.model,
            alias,
            relation: self.relation,
            parent: self.parent,
        }
    }

    pub(crate) fn adapter(&self) -> &'a dyn Adapter {
        self.env.adapter
    }

    pub(crate) fn schema(&self) -> &'a Schema {
        self.env.schema
    }

    /// `alias."column"`
    pub(crate) fn column(&self, field: &Field) -> Sql {
        self.adapter()
            .column(Some(&self.alias.name()), field.column_name())
    }

    /// `"table" AS alias`
    pub(crate) fn table(&self) -> Sql {
        self.adapter()
            .table_as(self.model.table_name(), &self.alias.name())
    }

    /// Dotted path from the root model to `name`, e.g. `User.posts.title`.
    pub(crate) fn path(&self, name: &str) -> String {
        let mut segments = vec![name];
        let mut curr = self;

        loop {
            match (curr.relation, curr.parent) {
                (Some(relation), Some(parent)) => {
                    segments.push(&relation.name);
                    curr = parent;
                }
                _ => {
                    segments.push(&curr.model.name);
                    break;
                }
            }
        }

        segments.reverse();
        segments.join(".")
    }

    pub(crate) fn member(&self, name: &str) -> Result<Member<'a>> {
        self.model
            .member(name)
            .ok_or_else(|| Error::unknown_field(self.path(name)))
    }

    pub(crate) fn field(&self, name: &str) -> Result<&'a Field> {
        match self.member(name)? {
            Member::Field(field) => Ok(field),
            Member::Relation(_) => Err(Error::invalid_statement(format!(
                "`{}` is a relation, expected a scalar field",
                self.path(name)
            ))),
        }
    }

    pub(crate) fn relation(&self, name: &str) -> Result<&'a Relation> {
        match self.member(name)? {
            Member::Relation(relation) => Ok(relation),
            Member::Field(_) => Err(Error::invalid_statement(format!(
                "`{}` is a scalar field, expected a relation",
                self.path(name)
            ))),
        }
    }
}
