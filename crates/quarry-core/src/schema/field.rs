use super::{ModelId, ScalarKind};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The field name
    pub name: FieldName,

    /// The scalar kind stored in the column
    pub kind: ScalarKind,

    /// True if the column accepts NULL.
    pub nullable: bool,

    /// True if the field holds a list of `kind` values.
    pub list: bool,

    /// True if the field is part of the primary key
    pub primary_key: bool,

    /// True if the database generates the value on insert.
    pub auto_increment: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct FieldName {
    pub app_name: String,
    pub storage_name: Option<String>,
}

impl Field {
    /// Gets the id.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// The name used in operation payloads.
    pub fn app_name(&self) -> &str {
        &self.name.app_name
    }

    /// The column name.
    pub fn column_name(&self) -> &str {
        self.name.storage_name()
    }
}

impl FieldName {
    pub fn storage_name(&self) -> &str {
        self.storage_name.as_ref().unwrap_or(&self.app_name)
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
