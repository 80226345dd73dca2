use pretty_assertions::assert_eq;
use quarry_core::schema::{Cardinality, ForeignKeySide, JoinTable, ScalarKind};
use quarry_core::Schema;

fn user_and_profile(f: impl FnOnce(&mut quarry_core::schema::RelationBuilder)) -> Schema {
    Schema::builder()
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("profileId", ScalarKind::Int).nullable();
            f(m.relation("profile", "Profile", Cardinality::OneToOne));
        })
        .model("Profile", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("userId", ScalarKind::Int);
        })
        .build()
        .unwrap()
}

#[test]
fn lookup_by_name() {
    let schema = Schema::builder()
        .model("User", |m| {
            m.table("users");
            m.field("id", ScalarKind::Int).primary_key();
            m.field("email", ScalarKind::String).column("email_address");
        })
        .build()
        .unwrap();

    let user = schema.model_by_name("User").unwrap();
    assert_eq!(user.table_name(), "users");

    let email = user.field_by_name("email").unwrap();
    assert_eq!(email.app_name(), "email");
    assert_eq!(email.column_name(), "email_address");
    assert!(schema.model_by_name("Nope").is_none());
}

#[test]
fn table_name_defaults_to_model_name() {
    let schema = Schema::builder()
        .model("Tag", |m| {
            m.field("name", ScalarKind::String).primary_key();
        })
        .build()
        .unwrap();

    let tag = schema.model_by_name("Tag").unwrap();
    assert_eq!(tag.table_name(), "Tag");
    assert_eq!(tag.field_by_name("name").unwrap().column_name(), "name");
}

#[test]
fn duplicate_model() {
    let err = Schema::builder()
        .model("User", |_| {})
        .model("User", |_| {})
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
    assert_eq!(err.to_string(), "invalid schema: duplicate model `User`");
}

#[test]
fn duplicate_field() {
    let err = Schema::builder()
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("id", ScalarKind::String);
        })
        .build()
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid schema: duplicate field `User.id`");
}

#[test]
fn relation_name_clashes_with_field() {
    let err = Schema::builder()
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("posts", ScalarKind::Int);
            m.relation("posts", "User", Cardinality::OneToMany)
                .fields(["id"])
                .references(["id"]);
        })
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn unknown_target_model() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["id"])
                .references(["id"]);
        })
        .build()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid schema: relation `Post.author` targets unknown model `User`"
    );
}

#[test]
fn unknown_key_field() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId"])
                .references(["id"]);
        })
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
        })
        .build()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid schema: relation `Post.author` names unknown key field `Post.authorId`"
    );
}

#[test]
fn key_arity_mismatch() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("authorId", ScalarKind::Int);
            m.field("authorTenant", ScalarKind::Int);
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId", "authorTenant"])
                .references(["id"]);
        })
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
        })
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn relation_targets_may_be_declared_later() {
    let schema = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("authorId", ScalarKind::Int);
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId"])
                .references(["id"]);
        })
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("posts", "Post", Cardinality::OneToMany)
                .fields(["id"])
                .references(["authorId"]);
        })
        .build()
        .unwrap();

    let post = schema.model_by_name("Post").unwrap();
    let author = post.relation_by_name("author").unwrap();
    assert_eq!(schema.target(author).name, "User");
    assert_eq!(author.foreign_key, ForeignKeySide::Local);
    assert!(!author.is_to_many());

    let user = schema.model_by_name("User").unwrap();
    let posts = user.relation_by_name("posts").unwrap();
    assert_eq!(posts.foreign_key, ForeignKeySide::Target);
    assert!(posts.is_to_many());
}

#[test]
fn self_relation() {
    let schema = Schema::builder()
        .model("Employee", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("managerId", ScalarKind::Int).nullable();
            m.relation("manager", "Employee", Cardinality::ManyToOne)
                .fields(["managerId"])
                .references(["id"]);
            m.relation("reports", "Employee", Cardinality::OneToMany)
                .fields(["id"])
                .references(["managerId"]);
        })
        .build()
        .unwrap();

    let employee = schema.model_by_name("Employee").unwrap();
    let manager = employee.relation_by_name("manager").unwrap();
    assert_eq!(manager.target, employee.id);
}

#[test]
fn one_to_one_keyed_by_primary_key_is_held_by_target() {
    let schema = user_and_profile(|r| {
        r.fields(["id"]).references(["userId"]);
    });

    let user = schema.model_by_name("User").unwrap();
    let profile = user.relation_by_name("profile").unwrap();
    assert_eq!(profile.foreign_key, ForeignKeySide::Target);
}

#[test]
fn one_to_one_keyed_by_other_field_is_held_locally() {
    let schema = user_and_profile(|r| {
        r.fields(["profileId"]).references(["id"]);
    });

    let user = schema.model_by_name("User").unwrap();
    let profile = user.relation_by_name("profile").unwrap();
    assert_eq!(profile.foreign_key, ForeignKeySide::Local);
}

#[test]
fn one_to_one_side_can_be_overridden() {
    let schema = user_and_profile(|r| {
        r.fields(["id"])
            .references(["userId"])
            .foreign_key(ForeignKeySide::Local);
    });

    let user = schema.model_by_name("User").unwrap();
    let profile = user.relation_by_name("profile").unwrap();
    assert_eq!(profile.foreign_key, ForeignKeySide::Local);
}

#[test]
fn many_to_many_keys_default_to_primary_keys() {
    let schema = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("tags", "Tag", Cardinality::ManyToMany)
                .through(JoinTable::new("_PostToTag", ["A"], ["B"]));
        })
        .model("Tag", |m| {
            m.field("name", ScalarKind::String).primary_key();
        })
        .build()
        .unwrap();

    let post = schema.model_by_name("Post").unwrap();
    let tag = schema.model_by_name("Tag").unwrap();
    let tags = post.relation_by_name("tags").unwrap();

    assert_eq!(tags.foreign_key, ForeignKeySide::JoinTable);
    assert_eq!(tags.fields, post.primary_key);
    assert_eq!(tags.references, tag.primary_key);
    assert_eq!(tags.expect_join_table().name, "_PostToTag");
}

#[test]
fn many_to_many_requires_join_table() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("tags", "Tag", Cardinality::ManyToMany);
        })
        .model("Tag", |m| {
            m.field("name", ScalarKind::String).primary_key();
        })
        .build()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid schema: many-to-many relation `Post.tags` has no join table"
    );
}

#[test]
fn join_table_only_for_many_to_many() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("authorId", ScalarKind::Int);
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId"])
                .references(["id"])
                .through(JoinTable::new("_Authors", ["A"], ["B"]));
        })
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
        })
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn join_table_arity_must_match_keys() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("tags", "Tag", Cardinality::ManyToMany)
                .through(JoinTable::new("_PostToTag", ["A", "A2"], ["B"]));
        })
        .model("Tag", |m| {
            m.field("name", ScalarKind::String).primary_key();
        })
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn one_to_one_cannot_use_a_join_table_side() {
    let err = Schema::builder()
        .model("A", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.relation("b", "B", Cardinality::OneToOne)
                .fields(["id"])
                .references(["aId"])
                .foreign_key(ForeignKeySide::JoinTable);
        })
        .model("B", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("aId", ScalarKind::Int);
        })
        .build()
        .unwrap_err();

    assert!(err.is_invalid_schema());
    assert_eq!(
        err.to_string(),
        "invalid schema: one-to-one relation `A.b` cannot store its key in a join table"
    );
}

#[test]
fn foreign_key_side_is_only_chosen_for_one_to_one() {
    let err = Schema::builder()
        .model("Post", |m| {
            m.field("id", ScalarKind::Int).primary_key();
            m.field("authorId", ScalarKind::Int);
            m.relation("author", "User", Cardinality::ManyToOne)
                .fields(["authorId"])
                .references(["id"])
                .foreign_key(ForeignKeySide::Target);
        })
        .model("User", |m| {
            m.field("id", ScalarKind::Int).primary_key();
        })
        .build()
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid schema: only one-to-one relations choose their foreign key side (`Post.author` is many-to-one)"
    );
}
