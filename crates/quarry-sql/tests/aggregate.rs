mod common;
use common::{single, try_compile};

use pretty_assertions::assert_eq;
use quarry_core::stmt::{
    AggregateArgs, AggregateFn, AggregateSelection, CountArgs, Direction, GroupByArgs, Having,
    Operation, OrderBy, OrderTarget, ScalarFilter, Value, Where,
};
use quarry_sql::{Mysql, Postgresql};

#[test]
fn count_with_filter() {
    let stmt = single(
        &Postgresql,
        "Post",
        Operation::Count(CountArgs {
            filter: Where::new().equals("published", true),
            ..CountArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT COUNT(*) AS "_count" FROM "posts" AS t0 WHERE t0."published" = $1"#
    );
    assert_eq!(stmt.params, vec![Value::Bool(true)]);
}

#[test]
fn count_non_null_fields() {
    let stmt = single(
        &Postgresql,
        "User",
        Operation::Count(CountArgs {
            fields: vec!["name".into()],
            ..CountArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT COUNT(*) AS "_count", COUNT(t0."name") AS "_count.name" FROM "users" AS t0"#
    );
}

#[test]
fn paginated_count_counts_a_derived_table() {
    let stmt = single(
        &Mysql,
        "Post",
        Operation::Count(CountArgs {
            take: Some(5),
            ..CountArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        "SELECT COUNT(*) AS `_count` FROM (SELECT 1 FROM `posts` AS t0 LIMIT ?) AS t0_d"
    );
    assert_eq!(stmt.params, vec![Value::I64(5)]);
}

#[test]
fn aggregate_functions() {
    let stmt = single(
        &Postgresql,
        "Post",
        Operation::Aggregate(AggregateArgs {
            select: AggregateSelection {
                count_all: true,
                sum: vec!["views".into()],
                avg: vec!["views".into()],
                ..AggregateSelection::default()
            },
            ..AggregateArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT COUNT(*) AS "_count._all", SUM(t0."views") AS "_sum.views", AVG(t0."views") AS "_avg.views" FROM "posts" AS t0"#
    );
}

#[test]
fn paginated_aggregate() {
    let stmt = single(
        &Postgresql,
        "Post",
        Operation::Aggregate(AggregateArgs {
            select: AggregateSelection {
                max: vec!["views".into()],
                ..AggregateSelection::default()
            },
            order_by: vec![OrderBy::desc("views")],
            take: Some(10),
            ..AggregateArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT MAX(t0_d."views") AS "_max.views" FROM (SELECT t0."views" FROM "posts" AS t0 ORDER BY t0."views" DESC LIMIT $1) AS t0_d"#
    );
}

#[test]
fn sum_needs_a_number() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::Aggregate(AggregateArgs {
            select: AggregateSelection {
                sum: vec!["title".into()],
                ..AggregateSelection::default()
            },
            ..AggregateArgs::default()
        }),
    )
    .unwrap_err();

    assert!(err.is_invalid_operator());
    assert_eq!(
        err.to_string(),
        "invalid operator: `_sum` is not valid for String field `Post.title`"
    );
}

#[test]
fn aggregate_requires_a_selection() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::Aggregate(AggregateArgs::default()),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn group_by_with_having_and_ordering() {
    let stmt = single(
        &Postgresql,
        "Post",
        Operation::GroupBy(GroupByArgs {
            by: vec!["authorId".into()],
            select: AggregateSelection {
                count_all: true,
                ..AggregateSelection::default()
            },
            having: Having::new().aggregate(AggregateFn::Count, "id", ScalarFilter::new().gt(1)),
            order_by: vec![OrderBy::new(
                OrderTarget::Aggregate {
                    function: AggregateFn::Sum,
                    field: "views".into(),
                },
                Direction::Desc,
            )],
            ..GroupByArgs::default()
        }),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT t0."author_id" AS "authorId", COUNT(*) AS "_count._all" FROM "posts" AS t0 GROUP BY t0."author_id" HAVING COUNT(t0."id") > $1 ORDER BY SUM(t0."views") DESC"#
    );
    assert_eq!(stmt.params, vec![Value::I64(1)]);
}

#[test]
fn having_on_an_ungrouped_field_is_rejected() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::GroupBy(GroupByArgs {
            by: vec!["authorId".into()],
            having: Having::new().field("views", ScalarFilter::new().gt(10)),
            ..GroupByArgs::default()
        }),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn aggregate_ordering_outside_group_by_is_rejected() {
    let err = try_compile(
        &Postgresql,
        "Post",
        Operation::FindMany(quarry_core::stmt::FindArgs {
            order_by: vec![OrderBy::new(
                OrderTarget::Aggregate {
                    function: AggregateFn::Sum,
                    field: "views".into(),
                },
                Direction::Asc,
            )],
            ..Default::default()
        }),
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
}

#[test]
fn exists() {
    let stmt = single(
        &Postgresql,
        "User",
        Operation::Exists(Where::new().equals("email", "a@example.com")),
    );

    assert_eq!(
        stmt.sql,
        r#"SELECT EXISTS (SELECT 1 FROM "users" AS t0 WHERE t0."email" = $1) AS "exists""#
    );
}
