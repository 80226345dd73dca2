#![allow(dead_code)]

use quarry_core::{
    schema::{Cardinality, JoinTable, ScalarKind},
    stmt::Operation,
    Result, Schema,
};
use quarry_sql::{Adapter, Compiled, Compiler, Config, Statement};

/// Users with posts and a profile; posts tagged through a join table.
pub fn schema() -> Schema {
    Schema::builder()
        .model("User", |m| {
            m.table("users");
            m.field("id", ScalarKind::Int).primary_key().auto_increment();
            m.field("email", ScalarKind::String);
            m.field("name", ScalarKind::String).nullable();
            m.field("age", ScalarKind::Int).nullable();
            m.field("meta", ScalarKind::Json).nullable();
            m.relation("posts", "Post", Cardinality::OneToMany)
                .fields(["id"])
                .references(["authorId"]);
            m.relation("profile", "Profile", Cardinality::OneToOne)
                .fields(["id"])
                .references(["userId"]);
        })
        .model("Post", |m| {
            m.table("posts");
            m.field("id", ScalarKind::Int).primary_key().auto_increment();
            m.field("title", ScalarKind::String);
            m.field("published", ScalarKind::Boolean);
            m.field("authorId", ScalarKind::Int)
                .nullable()
                .column("author_id");
            m.field("views", ScalarKind::Int);
            m.field("labels", ScalarKind::String).list();
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId"])
                .references(["id"]);
            m.relation("tags", "Tag", Cardinality::ManyToMany)
                .through(JoinTable::new("_PostToTag", ["A"], ["B"]));
        })
        .model("Profile", |m| {
            m.table("profiles");
            m.field("id", ScalarKind::Int).primary_key().auto_increment();
            m.field("bio", ScalarKind::String);
            m.field("userId", ScalarKind::Int).nullable().column("user_id");
            m.relation("user", "User", Cardinality::ManyToOne)
                .fields(["userId"])
                .references(["id"]);
        })
        .model("Tag", |m| {
            m.table("tags");
            m.field("name", ScalarKind::String).primary_key();
            m.relation("posts", "Post", Cardinality::ManyToMany)
                .through(JoinTable::new("_PostToTag", ["B"], ["A"]));
        })
        .build()
        .unwrap()
}

pub fn try_compile(adapter: &dyn Adapter, model: &str, operation: Operation) -> Result<Compiled> {
    try_compile_with(adapter, Config::default(), model, operation)
}

pub fn try_compile_with(
    adapter: &dyn Adapter,
    config: Config,
    model: &str,
    operation: Operation,
) -> Result<Compiled> {
    let schema = schema();
    Compiler::with_config(&schema, adapter, config).compile(model, &operation)
}

pub fn compile(adapter: &dyn Adapter, model: &str, operation: Operation) -> Compiled {
    try_compile(adapter, model, operation).unwrap()
}

/// Compiles an operation expected to produce exactly one statement.
pub fn single(adapter: &dyn Adapter, model: &str, operation: Operation) -> Statement {
    let mut compiled = compile(adapter, model, operation);
    assert_eq!(compiled.statements.len(), 1, "{:#?}", compiled.statements);
    assert_eq!(compiled.result, 0);
    compiled.statements.remove(0)
}

pub fn sql(compiled: &Compiled) -> Vec<&str> {
    compiled
        .statements
        .iter()
        .map(|statement| statement.sql.as_str())
        .collect()
}
