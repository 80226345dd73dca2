use super::{Value, Where};

use indexmap::IndexMap;

/// Values written by a create or update, keyed by field or relation name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    pub entries: IndexMap<String, DataEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataEntry {
    Scalar(UpdateOp),
    Relation(NestedWrites),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(Value),
    Unset,
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),

    /// Appends to a list field
    Push(Value),

    /// Shallow-merges a JSON object into a JSON field
    Merge(Value),

    /// Replaces the value at `path` inside a JSON field
    SetPath {
        path: Vec<String>,
        value: Value,
    },
}

/// Writes applied to related records while creating or updating a parent.
///
/// An empty [`Where`] in `disconnect`, `delete` or `update` selects every
/// record currently linked through the relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedWrites {
    pub create: Vec<Data>,
    pub connect: Vec<Where>,
    pub connect_or_create: Vec<ConnectOrCreate>,
    pub update: Vec<NestedUpdate>,
    pub upsert: Vec<NestedUpsert>,
    pub disconnect: Vec<Where>,
    pub delete: Vec<Where>,

    /// Replaces the linked set with the matching records.
    pub set: Option<Vec<Where>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOrCreate {
    pub filter: Where,
    pub create: Data,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedUpdate {
    pub filter: Where,
    pub data: Data,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedUpsert {
    pub filter: Where,
    pub create: Data,
    pub update: Data,
}

impl Data {
    pub fn new() -> Data {
        Data::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Data {
        self.op(field, UpdateOp::Set(value.into()))
    }

    pub fn op(mut self, field: impl Into<String>, op: UpdateOp) -> Data {
        self.entries.insert(field.into(), DataEntry::Scalar(op));
        self
    }

    pub fn nested(mut self, relation: impl Into<String>, writes: NestedWrites) -> Data {
        self.entries
            .insert(relation.into(), DataEntry::Relation(writes));
        self
    }

    /// The scalar entries, in payload order.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &UpdateOp)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            DataEntry::Scalar(op) => Some((name.as_str(), op)),
            DataEntry::Relation(_) => None,
        })
    }

    /// The nested relation writes, in payload order.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &NestedWrites)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            DataEntry::Relation(writes) => Some((name.as_str(), writes)),
            DataEntry::Scalar(_) => None,
        })
    }

    /// The value a field is set to, if the data sets it to a literal.
    pub fn literal(&self, field: &str) -> Option<&Value> {
        match self.entries.get(field) {
            Some(DataEntry::Scalar(UpdateOp::Set(value))) => Some(value),
            _ => None,
        }
    }
}

impl NestedWrites {
    pub fn new() -> NestedWrites {
        NestedWrites::default()
    }

    pub fn create(mut self, data: Data) -> NestedWrites {
        self.create.push(data);
        self
    }

    pub fn connect(mut self, filter: Where) -> NestedWrites {
        self.connect.push(filter);
        self
    }

    pub fn connect_or_create(mut self, filter: Where, create: Data) -> NestedWrites {
        self.connect_or_create
            .push(ConnectOrCreate { filter, create });
        self
    }

    pub fn update(mut self, filter: Where, data: Data) -> NestedWrites {
        self.update.push(NestedUpdate { filter, data });
        self
    }

    pub fn upsert(mut self, filter: Where, create: Data, update: Data) -> NestedWrites {
        self.upsert.push(NestedUpsert {
            filter,
            create,
            update,
        });
        self
    }

    pub fn disconnect(mut self, filter: Where) -> NestedWrites {
        self.disconnect.push(filter);
        self
    }

    pub fn delete(mut self, filter: Where) -> NestedWrites {
        self.delete.push(filter);
        self
    }

    pub fn set(mut self, filters: impl IntoIterator<Item = Where>) -> NestedWrites {
        self.set = Some(filters.into_iter().collect());
        self
    }

    /// True when every directive may appear under a create.
    pub fn is_create_only(&self) -> bool {
        self.update.is_empty()
            && self.upsert.is_empty()
            && self.disconnect.is_empty()
            && self.delete.is_empty()
            && self.set.is_none()
    }
}

impl UpdateOp {
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOp::Set(_) => "set",
            UpdateOp::Unset => "unset",
            UpdateOp::Increment(_) => "increment",
            UpdateOp::Decrement(_) => "decrement",
            UpdateOp::Multiply(_) => "multiply",
            UpdateOp::Divide(_) => "divide",
            UpdateOp::Push(_) => "push",
            UpdateOp::Merge(_) => "merge",
            UpdateOp::SetPath { .. } => "path",
        }
    }
}
