mod common;
use common::{compile, single, sql, try_compile, try_compile_with};

use pretty_assertions::assert_eq;
use quarry_core::stmt::{CreateManyArgs, Data, NestedWrites, Operation, Value};
use quarry_sql::{Config, Mysql, Postgresql, Sqlite};

fn users(data: Vec<Data>) -> Operation {
    Operation::CreateMany(CreateManyArgs {
        data,
        skip_duplicates: false,
    })
}

fn mixed_rows() -> Vec<Data> {
    vec![
        Data::new().set("email", "a@example.com"),
        Data::new().set("email", "b@example.com").set("name", "B"),
    ]
}

#[test]
fn missing_columns_take_their_default() {
    let stmt = single(&Postgresql, "User", users(mixed_rows()));

    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "users" ("email", "name") VALUES ($1, DEFAULT), ($2, $3)"#
    );
    assert_eq!(
        stmt.params,
        vec![
            Value::from("a@example.com"),
            Value::from("b@example.com"),
            Value::from("B")
        ]
    );
}

#[test]
fn columns_follow_schema_order() {
    let stmt = single(
        &Mysql,
        "User",
        users(vec![Data::new().set("name", "A").set("email", "a@example.com")]),
    );

    assert_eq!(
        stmt.sql,
        "INSERT INTO `users` (`email`, `name`) VALUES (?, ?)"
    );
    assert_eq!(
        stmt.params,
        vec![Value::from("a@example.com"), Value::from("A")]
    );
}

#[test]
fn sqlite_groups_rows_by_column_set() {
    let compiled = compile(&Sqlite, "User", users(mixed_rows()));

    assert_eq!(
        sql(&compiled),
        vec![
            r#"INSERT INTO "users" ("email") VALUES (?1)"#,
            r#"INSERT INTO "users" ("email", "name") VALUES (?1, ?2)"#,
        ]
    );
    assert_eq!(compiled.result, 1);
}

#[test]
fn rows_are_split_by_the_bind_limit() {
    let rows = (0..5)
        .map(|i| {
            Data::new()
                .set("email", format!("{i}@example.com"))
                .set("name", format!("user {i}"))
        })
        .collect();

    let compiled = try_compile_with(
        &Postgresql,
        Config::new().max_bind_params(4),
        "User",
        users(rows),
    )
    .unwrap();

    assert_eq!(
        sql(&compiled),
        vec![
            r#"INSERT INTO "users" ("email", "name") VALUES ($1, $2), ($3, $4)"#,
            r#"INSERT INTO "users" ("email", "name") VALUES ($1, $2), ($3, $4)"#,
            r#"INSERT INTO "users" ("email", "name") VALUES ($1, $2)"#,
        ]
    );
    assert_eq!(compiled.result, 2);
    assert_eq!(
        compiled.statements[2].params,
        vec![Value::from("4@example.com"), Value::from("user 4")]
    );
}

#[test]
fn skip_duplicates_per_adapter() {
    let op = || {
        Operation::CreateMany(CreateManyArgs {
            data: vec![Data::new().set("email", "a@example.com")],
            skip_duplicates: true,
        })
    };

    assert_eq!(
        single(&Mysql, "User", op()).sql,
        "INSERT IGNORE INTO `users` (`email`) VALUES (?)"
    );
    assert_eq!(
        single(&Postgresql, "User", op()).sql,
        r#"INSERT INTO "users" ("email") VALUES ($1) ON CONFLICT DO NOTHING"#
    );
    assert_eq!(
        single(&Sqlite, "User", op()).sql,
        r#"INSERT OR IGNORE INTO "users" ("email") VALUES (?1)"#
    );
}

#[test]
fn requires_at_least_one_row() {
    let err = try_compile(&Postgresql, "User", users(vec![])).unwrap_err();
    assert!(err.is_invalid_statement());
}

#[test]
fn rejects_nested_writes() {
    let err = try_compile(
        &Postgresql,
        "User",
        users(vec![Data::new().set("email", "a@example.com").nested(
            "posts",
            NestedWrites::new().create(Data::new().set("title", "Hello")),
        )]),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}
