use super::FindArgs;

use indexmap::IndexMap;

/// Which columns and related records a read returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub scalars: Scalars,

    /// Related records to load, keyed by relation name. Each entry carries
    /// its own filter, ordering and pagination.
    pub relations: IndexMap<String, FindArgs>,

    /// Relations whose row count is returned under `_count`.
    pub counts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scalars {
    /// Every scalar field of the model
    #[default]
    All,

    Only(Vec<String>),
    Omit(Vec<String>),
}

impl Selection {
    pub fn all() -> Selection {
        Selection::default()
    }

    pub fn only<I>(fields: I) -> Selection
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Selection {
            scalars: Scalars::Only(fields.into_iter().map(Into::into).collect()),
            ..Selection::default()
        }
    }

    pub fn omit<I>(fields: I) -> Selection
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Selection {
            scalars: Scalars::Omit(fields.into_iter().map(Into::into).collect()),
            ..Selection::default()
        }
    }

    pub fn include(mut self, relation: impl Into<String>, args: FindArgs) -> Selection {
        self.relations.insert(relation.into(), args);
        self
    }

    pub fn count(mut self, relation: impl Into<String>) -> Selection {
        self.counts.push(relation.into());
        self
    }

    /// True when the selection only names scalar columns.
    pub fn is_scalar_only(&self) -> bool {
        self.relations.is_empty() && self.counts.is_empty()
    }
}
