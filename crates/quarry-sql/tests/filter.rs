mod common;
use common::{single, try_compile};

use pretty_assertions::assert_eq;
use quarry_core::stmt::{FilterOp, FindArgs, Operation, ScalarFilter, Selection, Value, Where};
use quarry_sql::{Adapter, Mysql, Postgresql, Sqlite, Statement};

fn find_ids(adapter: &dyn Adapter, model: &str, filter: Where) -> Statement {
    single(
        adapter,
        model,
        Operation::FindMany(
            FindArgs::new()
                .filter(filter)
                .select(Selection::only(["id"])),
        ),
    )
}

#[test]
fn empty_or_matches_nothing() {
    let stmt = find_ids(&Postgresql, "User", Where::new().or([]));
    assert_eq!(stmt.sql, r#"SELECT t0."id" FROM "users" AS t0 WHERE FALSE"#);
}

#[test]
fn empty_and_matches_everything() {
    let stmt = find_ids(&Postgresql, "User", Where::new().and([]));
    assert_eq!(stmt.sql, r#"SELECT t0."id" FROM "users" AS t0"#);
}

#[test]
fn and_list_matches_implicit_conjunction() {
    let implicit = find_ids(
        &Postgresql,
        "User",
        Where::new()
            .equals("email", "a@example.com")
            .filter("age", ScalarFilter::new().gte(18)),
    );
    let explicit = find_ids(
        &Postgresql,
        "User",
        Where::new().and([
            Where::new().equals("email", "a@example.com"),
            Where::new().filter("age", ScalarFilter::new().gte(18)),
        ]),
    );

    assert_eq!(implicit, explicit);
    assert_eq!(
        explicit.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."email" = $1 AND t0."age" >= $2"#
    );
}

#[test]
fn or_with_an_unconstrained_branch_holds() {
    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().or([Where::new().equals("name", "Ann"), Where::new()]),
    );
    assert_eq!(stmt.sql, r#"SELECT t0."id" FROM "users" AS t0"#);
    assert!(stmt.params.is_empty());
}

#[test]
fn or_inside_and_is_parenthesized() {
    let filter = Where::new().equals("email", "a@example.com").or([
        Where::new().equals("name", "Ann"),
        Where::new().equals("name", "Bob"),
    ]);

    let stmt = find_ids(&Postgresql, "User", filter);
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."email" = $1 AND (t0."name" = $2 OR t0."name" = $3)"#
    );
    assert_eq!(
        stmt.params,
        vec![
            Value::from("a@example.com"),
            Value::from("Ann"),
            Value::from("Bob")
        ]
    );
}

#[test]
fn not_wraps_its_operand() {
    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().not([Where::new().equals("name", "Ann")]),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE NOT (t0."name" = $1)"#
    );
}

#[test]
fn null_comparisons() {
    let stmt = find_ids(&Postgresql, "User", Where::new().equals("name", Value::Null));
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" IS NULL"#
    );
    assert!(stmt.params.is_empty());

    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().filter("name", ScalarFilter::new().not_equals(Value::Null)),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" IS NOT NULL"#
    );
}

#[test]
fn operators_on_one_field_are_conjoined() {
    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().filter("age", ScalarFilter::new().gte(18).lt(65)),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."age" >= $1 AND t0."age" < $2"#
    );
    assert_eq!(stmt.params, vec![Value::I64(18), Value::I64(65)]);
}

#[test]
fn in_list_per_adapter() {
    let filter = || Where::new().filter("id", ScalarFilter::new().in_list([1, 2]));

    let stmt = find_ids(&Postgresql, "User", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."id" = ANY($1)"#
    );
    assert_eq!(
        stmt.params,
        vec![Value::List(vec![Value::I64(1), Value::I64(2)])]
    );

    let stmt = find_ids(&Sqlite, "User", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."id" IN (?1, ?2)"#
    );
}

#[test]
fn empty_in_list_is_false() {
    let stmt = find_ids(
        &Mysql,
        "User",
        Where::new().filter("id", ScalarFilter::new().in_list(Vec::<i64>::new())),
    );
    assert_eq!(stmt.sql, "SELECT t0.`id` FROM `users` AS t0 WHERE FALSE");
}

#[test]
fn contains_insensitive() {
    let filter = || Where::new().filter("name", ScalarFilter::new().contains("an").insensitive());

    let stmt = find_ids(&Postgresql, "User", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" ILIKE $1"#
    );
    assert_eq!(stmt.params, vec![Value::from("%an%")]);

    let stmt = find_ids(&Mysql, "User", filter());
    assert_eq!(
        stmt.sql,
        "SELECT t0.`id` FROM `users` AS t0 WHERE LOWER(t0.`name`) LIKE LOWER(?)"
    );
}

#[test]
fn case_sensitive_match_on_sqlite_uses_glob() {
    let stmt = find_ids(
        &Sqlite,
        "User",
        Where::new().filter("name", ScalarFilter::new().starts_with("a*")),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" GLOB ?1"#
    );
    assert_eq!(stmt.params, vec![Value::from("a[*]*")]);
}

#[test]
fn like_wildcards_are_escaped() {
    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().filter("name", ScalarFilter::new().ends_with("50%")),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" LIKE $1"#
    );
    assert_eq!(stmt.params, vec![Value::from("%50\\%")]);
}

#[test]
fn negated_pattern_per_adapter() {
    let filter = || {
        Where::new().filter(
            "name",
            ScalarFilter::new().not(ScalarFilter::new().contains("x").insensitive()),
        )
    };

    let stmt = find_ids(&Postgresql, "User", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE t0."name" NOT ILIKE $1"#
    );
    assert_eq!(stmt.params, vec![Value::from("%x%")]);

    let stmt = find_ids(&Mysql, "User", filter());
    assert_eq!(
        stmt.sql,
        "SELECT t0.`id` FROM `users` AS t0 WHERE NOT (LOWER(t0.`name`) LIKE LOWER(?))"
    );
}

#[test]
fn json_path_compares_text() {
    let stmt = find_ids(
        &Postgresql,
        "User",
        Where::new().filter(
            "meta",
            ScalarFilter::new().path(["theme"], FilterOp::Equals(Value::from("dark"))),
        ),
    );
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "users" AS t0 WHERE jsonb_extract_path_text(t0."meta", $1) = $2"#
    );
    assert_eq!(stmt.params, vec![Value::from("theme"), Value::from("dark")]);
}

#[test]
fn list_has_per_adapter() {
    let filter = || Where::new().filter("labels", ScalarFilter::new().has("rust"));

    let stmt = find_ids(&Postgresql, "Post", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "posts" AS t0 WHERE $1 = ANY(t0."labels")"#
    );

    let stmt = find_ids(&Sqlite, "Post", filter());
    assert_eq!(
        stmt.sql,
        r#"SELECT t0."id" FROM "posts" AS t0 WHERE EXISTS (SELECT 1 FROM json_each(t0."labels") WHERE value = ?1)"#
    );
}

#[test]
fn operator_must_fit_the_kind() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::FindMany(
            FindArgs::new().filter(
                Where::new().filter("published", ScalarFilter::new().contains("x")),
            ),
        ),
    )
    .unwrap_err();

    assert!(err.is_invalid_operator());
    assert_eq!(
        err.to_string(),
        "invalid operator: `contains` is not valid for Boolean field `Post.published`"
    );
}

#[test]
fn ordering_operators_are_rejected_on_lists() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::FindMany(
            FindArgs::new().filter(Where::new().filter("labels", ScalarFilter::new().gt("a"))),
        ),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid operator: `gt` is not valid for String[] field `Post.labels`"
    );
}

#[test]
fn unknown_fields_are_reported_with_their_path() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::FindMany(FindArgs::new().filter(Where::new().equals("titel", "x"))),
    )
    .unwrap_err();

    assert!(err.is_unknown_field());
    assert_eq!(err.to_string(), "unknown field `Post.titel`");
}

#[test]
fn nested_unknown_field_path() {
    let err = try_compile(
        &Postgresql,
        "User",
        Operation::FindMany(
            FindArgs::new().filter(Where::new().some("posts", Where::new().equals("titel", "x"))),
        ),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "unknown field `User.posts.titel`");
}
