use super::AggregateFn;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub target: OrderTarget,
    pub direction: Direction,
    pub nulls: Option<Nulls>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderTarget {
    Field(String),

    /// Order by a target inside a to-one relation.
    Relation {
        relation: String,
        target: Box<OrderTarget>,
    },

    /// Order by the number of records in a relation.
    RelationCount(String),

    /// Order groups by an aggregate. Only valid in `groupBy`.
    Aggregate { function: AggregateFn, field: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

impl OrderBy {
    pub fn new(target: OrderTarget, direction: Direction) -> OrderBy {
        OrderBy {
            target,
            direction,
            nulls: None,
        }
    }

    pub fn asc(field: impl Into<String>) -> OrderBy {
        OrderBy::new(OrderTarget::Field(field.into()), Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> OrderBy {
        OrderBy::new(OrderTarget::Field(field.into()), Direction::Desc)
    }

    /// Wraps this ordering so it applies to the record behind `relation`.
    pub fn through(self, relation: impl Into<String>) -> OrderBy {
        OrderBy {
            target: OrderTarget::Relation {
                relation: relation.into(),
                target: Box::new(self.target),
            },
            ..self
        }
    }

    pub fn nulls(mut self, nulls: Nulls) -> OrderBy {
        self.nulls = Some(nulls);
        self
    }
}

impl Direction {
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}
