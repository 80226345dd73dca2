use super::Value;

use indexmap::IndexMap;

/// A where description: named conditions combined with `AND`, plus explicit
/// `AND`, `OR` and `NOT` groups.
///
/// All entries of `conditions` and `and` are conjoined. `or` holds the
/// disjuncts when present; `or: Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    pub conditions: IndexMap<String, Condition>,
    pub and: Vec<Where>,
    pub or: Option<Vec<Where>>,
    pub not: Vec<Where>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Shorthand for `{ equals: value }`
    Equals(Value),
    Filter(ScalarFilter),
    Relation(RelationFilter),
}

/// One or more operators applied to the same scalar field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarFilter {
    pub ops: Vec<FilterOp>,
    pub mode: QueryMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Between(Value, Value),
    NotBetween(Value, Value),
    Contains(Value),
    StartsWith(Value),
    EndsWith(Value),
    Not(Box<ScalarFilter>),

    /// List field contains the value
    Has(Value),
    HasEvery(Vec<Value>),
    HasSome(Vec<Value>),
    IsEmpty(bool),

    /// Applies `op` to the value at `path` inside a JSON document.
    Path {
        path: Vec<String>,
        op: Box<FilterOp>,
    },

    /// JSON array contains the given JSON value
    JsonContains(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationFilter {
    ToOne(ToOneFilter),
    ToMany(ToManyFilter),
}

/// `None` stands for a `null` literal: `is: null` matches rows without a
/// related record.
#[derive(Debug, Clone, PartialEq)]
pub enum ToOneFilter {
    Is(Option<Where>),
    IsNot(Option<Where>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToManyFilter {
    Some(Where),
    Every(Where),
    None(Where),
}

impl Where {
    pub fn new() -> Where {
        Where::default()
    }

    /// True when the description constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.and.iter().all(Where::is_empty)
            && self.or.is_none()
            && self.not.is_empty()
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Where {
        self.conditions
            .insert(field.into(), Condition::Equals(value.into()));
        self
    }

    pub fn filter(mut self, field: impl Into<String>, filter: ScalarFilter) -> Where {
        self.conditions
            .insert(field.into(), Condition::Filter(filter));
        self
    }

    pub fn relation(mut self, name: impl Into<String>, filter: RelationFilter) -> Where {
        self.conditions
            .insert(name.into(), Condition::Relation(filter));
        self
    }

    pub fn some(self, name: impl Into<String>, filter: Where) -> Where {
        self.relation(name, RelationFilter::ToMany(ToManyFilter::Some(filter)))
    }

    pub fn every(self, name: impl Into<String>, filter: Where) -> Where {
        self.relation(name, RelationFilter::ToMany(ToManyFilter::Every(filter)))
    }

    pub fn none(self, name: impl Into<String>, filter: Where) -> Where {
        self.relation(name, RelationFilter::ToMany(ToManyFilter::None(filter)))
    }

    pub fn is(self, name: impl Into<String>, filter: Option<Where>) -> Where {
        self.relation(name, RelationFilter::ToOne(ToOneFilter::Is(filter)))
    }

    pub fn is_not(self, name: impl Into<String>, filter: Option<Where>) -> Where {
        self.relation(name, RelationFilter::ToOne(ToOneFilter::IsNot(filter)))
    }

    pub fn and(mut self, items: impl IntoIterator<Item = Where>) -> Where {
        self.and.extend(items);
        self
    }

    pub fn or(mut self, items: impl IntoIterator<Item = Where>) -> Where {
        self.or.get_or_insert_with(Vec::new).extend(items);
        self
    }

    pub fn not(mut self, items: impl IntoIterator<Item = Where>) -> Where {
        self.not.extend(items);
        self
    }
}

impl ScalarFilter {
    pub fn new() -> ScalarFilter {
        ScalarFilter::default()
    }

    pub fn op(mut self, op: FilterOp) -> ScalarFilter {
        self.ops.push(op);
        self
    }

    pub fn insensitive(mut self) -> ScalarFilter {
        self.mode = QueryMode::Insensitive;
        self
    }

    pub fn equals(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Equals(value.into()))
    }

    pub fn not_equals(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::NotEquals(value.into()))
    }

    pub fn in_list<T: Into<Value>>(self, values: impl IntoIterator<Item = T>) -> ScalarFilter {
        self.op(FilterOp::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn not_in<T: Into<Value>>(self, values: impl IntoIterator<Item = T>) -> ScalarFilter {
        self.op(FilterOp::NotIn(values.into_iter().map(Into::into).collect()))
    }

    pub fn lt(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Lt(value.into()))
    }

    pub fn lte(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Lte(value.into()))
    }

    pub fn gt(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Gt(value.into()))
    }

    pub fn gte(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Gte(value.into()))
    }

    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Between(low.into(), high.into()))
    }

    pub fn contains(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Contains(value.into()))
    }

    pub fn starts_with(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::StartsWith(value.into()))
    }

    pub fn ends_with(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::EndsWith(value.into()))
    }

    pub fn not(self, filter: ScalarFilter) -> ScalarFilter {
        self.op(FilterOp::Not(Box::new(filter)))
    }

    pub fn has(self, value: impl Into<Value>) -> ScalarFilter {
        self.op(FilterOp::Has(value.into()))
    }

    pub fn path<I>(self, path: I, op: FilterOp) -> ScalarFilter
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.op(FilterOp::Path {
            path: path.into_iter().map(Into::into).collect(),
            op: Box::new(op),
        })
    }
}

impl FilterOp {
    /// The operator name as written in operation payloads.
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Equals(_) => "equals",
            FilterOp::NotEquals(_) => "not",
            FilterOp::In(_) => "in",
            FilterOp::NotIn(_) => "notIn",
            FilterOp::Lt(_) => "lt",
            FilterOp::Lte(_) => "lte",
            FilterOp::Gt(_) => "gt",
            FilterOp::Gte(_) => "gte",
            FilterOp::Between(..) => "between",
            FilterOp::NotBetween(..) => "notBetween",
            FilterOp::Contains(_) => "contains",
            FilterOp::StartsWith(_) => "startsWith",
            FilterOp::EndsWith(_) => "endsWith",
            FilterOp::Not(_) => "not",
            FilterOp::Has(_) => "has",
            FilterOp::HasEvery(_) => "hasEvery",
            FilterOp::HasSome(_) => "hasSome",
            FilterOp::IsEmpty(_) => "isEmpty",
            FilterOp::Path { .. } => "path",
            FilterOp::JsonContains(_) => "array_contains",
        }
    }
}

impl ToManyFilter {
    pub fn quantifier(&self) -> &'static str {
        match self {
            ToManyFilter::Some(_) => "some",
            ToManyFilter::Every(_) => "every",
            ToManyFilter::None(_) => "none",
        }
    }
}

impl ToOneFilter {
    pub fn quantifier(&self) -> &'static str {
        match self {
            ToOneFilter::Is(_) => "is",
            ToOneFilter::IsNot(_) => "isNot",
        }
    }
}
