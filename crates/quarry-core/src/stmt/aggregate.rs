use super::ScalarFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// The aggregates requested by `aggregate` and `groupBy`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSelection {
    /// `_count._all`, the number of rows
    pub count_all: bool,

    /// Number of non-null values per field
    pub count: Vec<String>,
    pub sum: Vec<String>,
    pub avg: Vec<String>,
    pub min: Vec<String>,
    pub max: Vec<String>,
}

/// Filter applied to groups. Same shape as [`Where`](super::Where).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Having {
    pub conditions: Vec<HavingCondition>,
    pub and: Vec<Having>,
    pub or: Option<Vec<Having>>,
    pub not: Vec<Having>,
}

/// Compares a grouped field, or an aggregate of any field, against a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct HavingCondition {
    pub field: String,
    pub aggregate: Option<AggregateFn>,
    pub filter: ScalarFilter,
}

impl AggregateFn {
    /// Prefix of the output column, e.g. `_sum`.
    pub fn prefix(self) -> &'static str {
        match self {
            AggregateFn::Count => "_count",
            AggregateFn::Sum => "_sum",
            AggregateFn::Avg => "_avg",
            AggregateFn::Min => "_min",
            AggregateFn::Max => "_max",
        }
    }
}

impl AggregateSelection {
    pub fn is_empty(&self) -> bool {
        !self.count_all
            && self.count.is_empty()
            && self.sum.is_empty()
            && self.avg.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
    }

    /// Requested `(function, field)` pairs in output order.
    pub fn fields(&self) -> impl Iterator<Item = (AggregateFn, &str)> {
        each(AggregateFn::Count, &self.count)
            .chain(each(AggregateFn::Sum, &self.sum))
            .chain(each(AggregateFn::Avg, &self.avg))
            .chain(each(AggregateFn::Min, &self.min))
            .chain(each(AggregateFn::Max, &self.max))
    }
}

fn each(function: AggregateFn, fields: &[String]) -> impl Iterator<Item = (AggregateFn, &str)> {
    fields.iter().map(move |field| (function, field.as_str()))
}

impl Having {
    pub fn new() -> Having {
        Having::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.and.iter().all(Having::is_empty)
            && self.or.is_none()
            && self.not.is_empty()
    }

    pub fn field(mut self, field: impl Into<String>, filter: ScalarFilter) -> Having {
        self.conditions.push(HavingCondition {
            field: field.into(),
            aggregate: None,
            filter,
        });
        self
    }

    pub fn aggregate(
        mut self,
        aggregate: AggregateFn,
        field: impl Into<String>,
        filter: ScalarFilter,
    ) -> Having {
        self.conditions.push(HavingCondition {
            field: field.into(),
            aggregate: Some(aggregate),
            filter,
        });
        self
    }

    pub fn or(mut self, items: impl IntoIterator<Item = Having>) -> Having {
        self.or.get_or_insert_with(Vec::new).extend(items);
        self
    }
}
