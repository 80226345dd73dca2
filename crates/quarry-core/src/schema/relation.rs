use super::{FieldId, ModelId};

#[derive(Debug, Clone)]
pub struct Relation {
    /// Uniquely identifies the relation within the containing model.
    pub id: RelationId,

    /// Relation name as used in operation payloads
    pub name: String,

    /// The model on the other side of the relation
    pub target: ModelId,

    pub cardinality: Cardinality,

    /// Key fields on the declaring model.
    pub fields: Vec<FieldId>,

    /// Key fields on the target model, paired by position with `fields`.
    pub references: Vec<FieldId>,

    /// Which side stores the foreign key.
    pub foreign_key: ForeignKeySide,

    /// Link table for many-to-many relations.
    pub join_table: Option<JoinTable>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct RelationId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// How many rows a relation yields for one parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    ToOne,
    ToMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeySide {
    /// The declaring model's `fields` hold the foreign key.
    Local,

    /// The target model's `references` hold the foreign key.
    Target,

    /// A join table holds both keys.
    JoinTable,
}

/// A link table backing a many-to-many relation.
///
/// `local_columns` reference the declaring model's key fields and
/// `target_columns` the target model's key fields.
#[derive(Debug, Clone)]
pub struct JoinTable {
    pub name: String,
    pub local_columns: Vec<String>,
    pub target_columns: Vec<String>,
}

impl Relation {
    pub fn arity(&self) -> Arity {
        self.cardinality.arity()
    }

    pub fn is_to_many(&self) -> bool {
        self.arity() == Arity::ToMany
    }

    #[track_caller]
    pub fn expect_join_table(&self) -> &JoinTable {
        match &self.join_table {
            Some(join_table) => join_table,
            None => panic!("relation `{}` has no join table", self.name),
        }
    }
}

impl Cardinality {
    pub fn arity(self) -> Arity {
        match self {
            Cardinality::OneToOne | Cardinality::ManyToOne => Arity::ToOne,
            Cardinality::OneToMany | Cardinality::ManyToMany => Arity::ToMany,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::ManyToMany => "many-to-many",
        }
    }
}

impl Arity {
    pub fn name(self) -> &'static str {
        match self {
            Arity::ToOne => "to-one",
            Arity::ToMany => "to-many",
        }
    }
}

impl JoinTable {
    pub fn new<L, T>(name: impl Into<String>, local_columns: L, target_columns: T) -> JoinTable
    where
        L: IntoIterator,
        L::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        JoinTable {
            name: name.into(),
            local_columns: local_columns.into_iter().map(Into::into).collect(),
            target_columns: target_columns.into_iter().map(Into::into).collect(),
        }
    }
}
