//! Turns an [`Operation`] against a model into one or more statements.

mod aggregate;

mod alias;
use alias::{Alias, Aliases};

mod clauses;
use clauses::Clauses;

mod config;
pub use config::Config;

mod cx;
use cx::{Cx, Env};

mod filter;
mod mutation;
mod nested;
mod relation;
mod select;

use crate::{Adapter, Sql, Statement};

use quarry_core::{
    schema::Model,
    stmt::{FindArgs, Operation},
    Error, Result, Schema,
};

/// Compiles operations for one schema and one database.
///
/// A compiler holds no per-operation state; every call to
/// [`Compiler::compile`] starts with a fresh alias counter, so the same
/// operation always compiles to the same text.
pub struct Compiler<'a> {
    schema: &'a Schema,
    adapter: &'a dyn Adapter,
    config: Config,
}

/// The statements implementing one operation, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub statements: Vec<Statement>,

    /// Index of the statement whose rows answer the operation.
    pub result: usize,
}

/// Statements before rendering.
pub(crate) struct Plan {
    pub(crate) statements: Vec<Sql>,
    pub(crate) result: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema, adapter: &'a dyn Adapter) -> Compiler<'a> {
        Compiler::with_config(schema, adapter, Config::default())
    }

    pub fn with_config(schema: &'a Schema, adapter: &'a dyn Adapter, config: Config) -> Compiler<'a> {
        Compiler {
            schema,
            adapter,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compile(&self, model: &str, operation: &Operation) -> Result<Compiled> {
        let Some(model) = self.schema.model_by_name(model) else {
            return Err(Error::invalid_statement(format!("unknown model `{model}`")));
        };

        let aliases = Aliases::default();
        let env = Env {
            schema: self.schema,
            adapter: self.adapter,
            config: &self.config,
            aliases: &aliases,
        };

        let plan = match operation {
            Operation::FindMany(args) => one(find(env, model, args, false)?),
            Operation::FindFirst(args) | Operation::FindUnique(args) => {
                one(find(env, model, args, true)?)
            }
            Operation::Count(args) => one(aggregate::count(&Cx::root(env, model), args)?),
            Operation::Aggregate(args) => {
                one(aggregate::aggregate(&Cx::root(env, model), args)?)
            }
            Operation::GroupBy(args) => one(aggregate::group_by(&Cx::root(env, model), args)?),
            Operation::Exists(filter) => one(aggregate::exists(&Cx::root(env, model), filter)?),
            Operation::Create(args) => mutation::create(env, model, args)?,
            Operation::CreateMany(args) => mutation::create_many(env, model, args)?,
            Operation::Update(args) => mutation::update(env, model, args)?,
            Operation::UpdateMany(args) => mutation::update_many(env, model, args)?,
            Operation::Upsert(args) => mutation::upsert(env, model, args)?,
            Operation::Delete(args) => mutation::delete(env, model, args)?,
            Operation::DeleteMany(filter) => mutation::delete_many(env, model, filter)?,
        };

        let statements: Vec<Statement> = plan
            .statements
            .iter()
            .map(|sql| sql.render(self.adapter))
            .collect();

        tracing::debug!(
            adapter = self.adapter.name(),
            model = %model.name,
            operation = operation.name(),
            statements = statements.len(),
            aliases = aliases.allocated(),
            "compiled operation"
        );

        for statement in &statements {
            tracing::trace!(sql = %statement.sql, params = statement.params.len(), "statement");
        }

        Ok(Compiled {
            statements,
            result: plan.result,
        })
    }
}

fn find(
    env: Env<'_>,
    model: &Model,
    args: &FindArgs,
    single: bool,
) -> Result<Sql> {
    let cx = Cx::root(env, model);
    let (sql, _) = select::find(&cx, args, Clauses::select_from(cx.table()), single)?;
    Ok(sql)
}

fn one(statement: Sql) -> Plan {
    Plan {
        statements: vec![statement],
        result: 0,
    }
}
