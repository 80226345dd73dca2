use super::{Field, FieldId, Relation};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    /// Name of the model
    pub name: String,

    /// Storage table name, defaults to the model name
    pub table_name: Option<String>,

    /// Scalar fields, in declaration order
    pub fields: Vec<Field>,

    /// Relations to other models, in declaration order
    pub relations: Vec<Relation>,

    /// Fields making up the primary key
    pub primary_key: Vec<FieldId>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

/// A name on a model resolves to either a scalar field or a relation.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Field(&'a Field),
    Relation(&'a Relation),
}

impl Model {
    pub fn table_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(&self.name)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name.app_name == name)
    }

    pub fn relation_by_name(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        self.field_by_name(name)
            .map(Member::Field)
            .or_else(|| self.relation_by_name(name).map(Member::Relation))
    }

    #[track_caller]
    pub fn field(&self, id: FieldId) -> &Field {
        assert_eq!(id.model, self.id, "field belongs to another model");
        &self.fields[id.index]
    }

    pub fn primary_key_fields(&self) -> impl ExactSizeIterator<Item = &Field> + '_ {
        self.primary_key.iter().map(|id| &self.fields[id.index])
    }
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }
}

impl From<&ModelId> for ModelId {
    fn from(src: &ModelId) -> ModelId {
        *src
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ModelId({})", self.0)
    }
}
