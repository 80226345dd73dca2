mod builder;
pub use builder::{Builder, FieldBuilder, ModelBuilder, RelationBuilder};

mod field;
pub use field::{Field, FieldId, FieldName};

mod kind;
pub use kind::ScalarKind;

mod model;
pub use model::{Member, Model, ModelId};

mod relation;
pub use relation::{Arity, Cardinality, ForeignKeySide, JoinTable, Relation, RelationId};

/// The immutable model graph consumed by the compiler.
///
/// Models live in an arena and refer to each other by [`ModelId`], so
/// circular and self-referencing relations need no shared ownership. A schema
/// is built once with [`Schema::builder`] and can then be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct Schema {
    models: Vec<Model>,
    by_name: indexmap::IndexMap<String, ModelId>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Get a model by ID
    ///
    /// Panics if the ID does not belong to this schema.
    #[track_caller]
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        &self.models[id.into().0]
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.by_name.get(name).map(|id| self.model(*id))
    }

    pub fn models(&self) -> impl ExactSizeIterator<Item = &Model> {
        self.models.iter()
    }

    #[track_caller]
    pub fn field(&self, id: FieldId) -> &Field {
        &self.model(id.model).fields[id.index]
    }

    #[track_caller]
    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.model(id.model).relations[id.index]
    }

    /// The model a relation points at.
    pub fn target(&self, relation: &Relation) -> &Model {
        self.model(relation.target)
    }
}
