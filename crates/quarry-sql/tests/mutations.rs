mod common;
use common::{compile, single, sql, try_compile, try_compile_with};

use pretty_assertions::assert_eq;
use quarry_core::stmt::{
    CreateArgs, Data, DeleteArgs, NestedWrites, Operation, Selection, UpdateArgs, UpdateManyArgs,
    UpdateOp, UpsertArgs, Value, Where,
};
use quarry_sql::{Config, Mysql, Postgresql, Sqlite};

fn create(data: Data, selection: Option<Selection>) -> Operation {
    Operation::Create(CreateArgs { data, selection })
}

fn update(filter: Where, data: Data, selection: Option<Selection>) -> Operation {
    Operation::Update(UpdateArgs {
        filter,
        data,
        selection,
    })
}

#[test]
fn create_returning_selected_columns() {
    let stmt = single(
        &Postgresql,
        "User",
        create(
            Data::new().set("email", "a@example.com").set("name", "Ann"),
            Some(Selection::only(["id", "email"])),
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "users" ("email", "name") VALUES ($1, $2) RETURNING "id", "email""#
    );
    assert_eq!(
        stmt.params,
        vec![Value::from("a@example.com"), Value::from("Ann")]
    );
}

#[test]
fn create_without_selection() {
    let stmt = single(
        &Sqlite,
        "User",
        create(Data::new().set("email", "a@example.com"), None),
    );

    assert_eq!(stmt.sql, r#"INSERT INTO "users" ("email") VALUES (?1)"#);
}

#[test]
fn create_with_no_columns_uses_defaults() {
    let stmt = single(&Postgresql, "Profile", create(Data::new(), None));
    assert_eq!(stmt.sql, r#"INSERT INTO "profiles" DEFAULT VALUES"#);

    let stmt = single(&Mysql, "Profile", create(Data::new(), None));
    assert_eq!(stmt.sql, "INSERT INTO `profiles` () VALUES ()");
}

#[test]
fn json_values_are_cast() {
    let stmt = single(
        &Postgresql,
        "User",
        create(
            Data::new()
                .set("email", "a@example.com")
                .set("meta", serde_json::json!({ "theme": "dark" })),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "users" ("email", "meta") VALUES ($1, $2::jsonb)"#
    );
    assert_eq!(
        stmt.params[1],
        Value::Json(serde_json::json!({ "theme": "dark" }))
    );
}

#[test]
fn mysql_reads_created_row_back() {
    let compiled = compile(
        &Mysql,
        "User",
        create(
            Data::new().set("email", "a@example.com"),
            Some(Selection::only(["id"])),
        ),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            "INSERT INTO `users` (`email`) VALUES (?)",
            "SELECT t0.`id` FROM `users` AS t0 WHERE t0.`id` = LAST_INSERT_ID() LIMIT 1",
        ]
    );
    assert_eq!(compiled.result, 1);
}

#[test]
fn mysql_with_literal_key_reads_by_key() {
    let compiled = compile(
        &Mysql,
        "Tag",
        create(Data::new().set("name", "rust"), Some(Selection::all())),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            "INSERT INTO `tags` (`name`) VALUES (?)",
            "SELECT t0.`name` FROM `tags` AS t0 WHERE t0.`name` = ? LIMIT 1",
        ]
    );
    assert_eq!(compiled.statements[1].params, vec![Value::from("rust")]);
}

#[test]
fn returning_emulation_can_be_disabled() {
    let err = try_compile_with(
        &Mysql,
        Config::new().emulate_returning(false),
        "User",
        create(
            Data::new().set("email", "a@example.com"),
            Some(Selection::only(["id"])),
        ),
    )
    .unwrap_err();

    assert!(err.is_unsupported_feature());

    // Nothing to read back
    assert!(try_compile_with(
        &Mysql,
        Config::new().emulate_returning(false),
        "User",
        create(Data::new().set("email", "a@example.com"), None),
    )
    .is_ok());
}

#[test]
fn nested_create_chains_ctes_on_postgresql() {
    let stmt = single(
        &Postgresql,
        "User",
        create(
            Data::new().set("email", "a@example.com").nested(
                "posts",
                NestedWrites::new().create(Data::new().set("title", "Hello")),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"WITH w0 AS (INSERT INTO "users" ("email") VALUES ($1) RETURNING *), w1 AS (INSERT INTO "posts" ("title", "author_id") VALUES ($2, (SELECT "id" FROM w0)) RETURNING *) SELECT t0."id" FROM w0 AS t0 LIMIT 1"#
    );
    assert_eq!(
        stmt.params,
        vec![Value::from("a@example.com"), Value::from("Hello")]
    );
}

#[test]
fn nested_create_uses_generated_key_on_sqlite() {
    let compiled = compile(
        &Sqlite,
        "User",
        create(
            Data::new().set("email", "a@example.com").nested(
                "posts",
                NestedWrites::new().create(Data::new().set("title", "Hello")),
            ),
            None,
        ),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            r#"INSERT INTO "users" ("email") VALUES (?1)"#,
            r#"INSERT INTO "posts" ("title", "author_id") VALUES (?1, last_insert_rowid())"#,
        ]
    );
    assert_eq!(compiled.result, 0);
}

#[test]
fn generated_key_is_lost_after_another_insert() {
    let err = try_compile(
        &Sqlite,
        "User",
        create(
            Data::new().set("email", "a@example.com").nested(
                "posts",
                NestedWrites::new()
                    .create(Data::new().set("title", "One"))
                    .create(Data::new().set("title", "Two")),
            ),
            None,
        ),
    )
    .unwrap_err();

    assert!(err.is_unsupported_feature());
}

#[test]
fn create_connecting_an_owner() {
    let stmt = single(
        &Sqlite,
        "Post",
        create(
            Data::new().set("title", "Hello").nested(
                "author",
                NestedWrites::new().connect(Where::new().equals("email", "a@example.com")),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "posts" ("title", "author_id") VALUES (?1, (SELECT t0."id" FROM "users" AS t0 WHERE t0."email" = ?2))"#
    );
}

#[test]
fn create_rejects_update_directives() {
    let err = try_compile(
        &Sqlite,
        "User",
        create(
            Data::new().set("email", "a@example.com").nested(
                "posts",
                NestedWrites::new().delete(Where::new()),
            ),
            None,
        ),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn update_with_increment() {
    let stmt = single(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("id", 7),
            Data::new().op("views", UpdateOp::Increment(1.into())),
            Some(Selection::only(["id", "views"])),
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "views" = t0."views" + $1 WHERE t0."id" = $2 RETURNING "id", "views""#
    );
    assert_eq!(stmt.params, vec![Value::I64(1), Value::I64(7)]);
}

#[test]
fn mysql_reads_updated_row_back() {
    let compiled = compile(
        &Mysql,
        "Post",
        update(
            Where::new().equals("id", 7),
            Data::new().set("title", "New"),
            Some(Selection::only(["id", "title"])),
        ),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            "UPDATE `posts` AS t0 SET `title` = ? WHERE t0.`id` = ?",
            "SELECT t1.`id`, t1.`title` FROM `posts` AS t1 WHERE t1.`id` = ? LIMIT 1",
        ]
    );
    assert_eq!(compiled.result, 1);
}

#[test]
fn mysql_reads_updated_row_by_its_new_values() {
    let compiled = compile(
        &Mysql,
        "User",
        update(
            Where::new().equals("email", "old@example.com"),
            Data::new().set("email", "new@example.com"),
            Some(Selection::only(["id"])),
        ),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            "UPDATE `users` AS t0 SET `email` = ? WHERE t0.`email` = ?",
            "SELECT t1.`id` FROM `users` AS t1 WHERE t1.`email` = ? LIMIT 1",
        ]
    );
    assert_eq!(
        compiled.statements[1].params,
        vec![Value::from("new@example.com")]
    );
}

#[test]
fn mysql_cannot_read_back_a_computed_filter_field() {
    let err = try_compile(
        &Mysql,
        "Post",
        update(
            Where::new().equals("views", 3),
            Data::new().op("views", UpdateOp::Increment(1.into())),
            Some(Selection::only(["id"])),
        ),
    )
    .unwrap_err();

    assert!(err.is_unsupported_feature());
    assert_eq!(
        err.to_string(),
        "unsupported feature: reading back `Post` after `increment.views` rewrites a filtered field"
    );
}

#[test]
fn update_returning_needs_no_rewritten_filter() {
    let stmt = single(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("views", 3),
            Data::new().op("views", UpdateOp::Increment(1.into())),
            Some(Selection::only(["id"])),
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "views" = t0."views" + $1 WHERE t0."views" = $2 RETURNING "id""#
    );
}

#[test]
fn update_requires_data() {
    let err = try_compile(
        &Postgresql,
        "Post",
        update(Where::new().equals("id", 7), Data::new(), None),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn update_operator_must_fit_the_kind() {
    let err = try_compile(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("id", 7),
            Data::new().op("title", UpdateOp::Increment(1.into())),
            None,
        ),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid operator: `increment` is not valid for String field `Post.title`"
    );
}

#[test]
fn push_onto_a_list() {
    let stmt = single(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("id", 7),
            Data::new().op("labels", UpdateOp::Push("rust".into())),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "labels" = array_append(t0."labels", $1) WHERE t0."id" = $2"#
    );
}

#[test]
fn update_connects_children() {
    let stmt = single(
        &Sqlite,
        "User",
        update(
            Where::new().equals("id", 1),
            Data::new().nested(
                "posts",
                NestedWrites::new().connect(Where::new().equals("id", 3)),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "author_id" = ?1 WHERE t0."id" = ?2"#
    );
    assert_eq!(stmt.params, vec![Value::I64(1), Value::I64(3)]);
}

#[test]
fn update_disconnects_children() {
    let stmt = single(
        &Sqlite,
        "User",
        update(
            Where::new().equals("id", 1),
            Data::new().nested(
                "posts",
                NestedWrites::new().disconnect(Where::new().equals("id", 3)),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "author_id" = ?1 WHERE t0."author_id" = ?2 AND t0."id" = ?3"#
    );
    assert_eq!(
        stmt.params,
        vec![Value::Null, Value::I64(1), Value::I64(3)]
    );
}

#[test]
fn update_disconnects_owner() {
    let stmt = single(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("id", 5),
            Data::new().nested("author", NestedWrites::new().disconnect(Where::new())),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "author_id" = $1 WHERE t0."id" = $2"#
    );
    assert_eq!(stmt.params, vec![Value::Null, Value::I64(5)]);
}

#[test]
fn update_links_through_join_table() {
    let stmt = single(
        &Sqlite,
        "Post",
        update(
            Where::new().equals("id", 1),
            Data::new().nested(
                "tags",
                NestedWrites::new().connect(Where::new().equals("name", "rust")),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"INSERT OR IGNORE INTO "_PostToTag" ("A", "B") SELECT ?1, t0."name" FROM "tags" AS t0 WHERE t0."name" = ?2"#
    );
    assert_eq!(stmt.params, vec![Value::I64(1), Value::from("rust")]);
}

#[test]
fn update_unlinks_through_join_table() {
    let stmt = single(
        &Postgresql,
        "Post",
        update(
            Where::new().equals("id", 1),
            Data::new().nested(
                "tags",
                NestedWrites::new().disconnect(Where::new().equals("name", "rust")),
            ),
            None,
        ),
    );

    assert_eq!(
        stmt.sql,
        r#"DELETE FROM "_PostToTag" AS t0 WHERE t0."A" = $1 AND EXISTS (SELECT 1 FROM "tags" AS t1 WHERE t1."name" = t0."B" AND t1."name" = $2)"#
    );
}

#[test]
fn update_many() {
    let stmt = single(
        &Postgresql,
        "Post",
        Operation::UpdateMany(UpdateManyArgs {
            filter: Where::new().equals("published", false),
            data: Data::new().set("published", true),
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"UPDATE "posts" AS t0 SET "published" = $1 WHERE t0."published" = $2"#
    );
    assert_eq!(stmt.params, vec![Value::Bool(true), Value::Bool(false)]);
}

#[test]
fn update_many_rejects_nested_writes() {
    let err = try_compile(
        &Postgresql,
        "User",
        Operation::UpdateMany(UpdateManyArgs {
            filter: Where::new(),
            data: Data::new().nested("posts", NestedWrites::new().delete(Where::new())),
        }),
    )
    .unwrap_err();

    assert!(err.is_unsupported_feature());
}

fn upsert(update: Data) -> Operation {
    Operation::Upsert(UpsertArgs {
        filter: Where::new().equals("email", "a@example.com"),
        create: Data::new().set("email", "a@example.com").set("name", "Ann"),
        update,
        selection: None,
    })
}

#[test]
fn upsert_per_adapter() {
    let stmt = single(&Postgresql, "User", upsert(Data::new().set("name", "Bob")));
    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "users" ("email", "name") VALUES ($1, $2) ON CONFLICT ("email") DO UPDATE SET "name" = $3"#
    );

    let stmt = single(&Mysql, "User", upsert(Data::new().set("name", "Bob")));
    assert_eq!(
        stmt.sql,
        "INSERT INTO `users` (`email`, `name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `name` = ?"
    );
}

#[test]
fn upsert_with_empty_update_rewrites_the_key() {
    let stmt = single(&Sqlite, "User", upsert(Data::new()));
    assert_eq!(
        stmt.sql,
        r#"INSERT INTO "users" ("email", "name") VALUES (?1, ?2) ON CONFLICT ("email") DO UPDATE SET "email" = "users"."email""#
    );
}

#[test]
fn upsert_requires_equality_filter() {
    let err = try_compile(
        &Postgresql,
        "User",
        Operation::Upsert(UpsertArgs {
            filter: Where::new(),
            create: Data::new().set("email", "a@example.com"),
            ..UpsertArgs::default()
        }),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn mysql_upsert_that_moves_its_key_is_unreadable() {
    let err = try_compile(
        &Mysql,
        "User",
        Operation::Upsert(UpsertArgs {
            filter: Where::new().equals("email", "a@example.com"),
            create: Data::new().set("email", "a@example.com"),
            update: Data::new().set("email", "b@example.com"),
            selection: Some(Selection::only(["id"])),
        }),
    )
    .unwrap_err();

    assert!(err.is_unsupported_feature());
}

#[test]
fn delete_returning() {
    let stmt = single(
        &Postgresql,
        "User",
        Operation::Delete(DeleteArgs {
            filter: Where::new().equals("id", 1),
            selection: Some(Selection::only(["id"])),
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"DELETE FROM "users" AS t0 WHERE t0."id" = $1 RETURNING "id""#
    );
}

#[test]
fn mysql_reads_deleted_row_first() {
    let compiled = compile(
        &Mysql,
        "User",
        Operation::Delete(DeleteArgs {
            filter: Where::new().equals("id", 1),
            selection: Some(Selection::only(["id"])),
        }),
    );

    assert_eq!(
        sql(&compiled),
        vec![
            "SELECT t0.`id` FROM `users` AS t0 WHERE t0.`id` = ? LIMIT 1",
            "DELETE FROM `users` AS t1 WHERE t1.`id` = ?",
        ]
    );
    assert_eq!(compiled.result, 0);
}

#[test]
fn delete_many_without_filter() {
    let stmt = single(&Postgresql, "Post", Operation::DeleteMany(Where::new()));
    assert_eq!(stmt.sql, r#"DELETE FROM "posts" AS t0"#);
}
