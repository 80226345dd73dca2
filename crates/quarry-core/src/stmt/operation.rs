use super::{AggregateSelection, Data, Having, OrderBy, Selection, Where};

/// A data-access operation against one model.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    FindMany(FindArgs),
    FindFirst(FindArgs),
    FindUnique(FindArgs),
    Count(CountArgs),
    Aggregate(AggregateArgs),
    GroupBy(GroupByArgs),
    Exists(Where),
    Create(CreateArgs),
    CreateMany(CreateManyArgs),
    Update(UpdateArgs),
    UpdateMany(UpdateManyArgs),
    Upsert(UpsertArgs),
    Delete(DeleteArgs),
    DeleteMany(Where),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindArgs {
    pub filter: Where,
    pub selection: Selection,
    pub order_by: Vec<OrderBy>,
    pub take: Option<u64>,
    pub skip: Option<u64>,

    /// Unique filter locating the row pagination starts from.
    pub cursor: Option<Where>,

    /// Fields whose combination must be unique across returned rows.
    pub distinct: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountArgs {
    pub filter: Where,
    pub take: Option<u64>,
    pub skip: Option<u64>,

    /// Also count non-null values of these fields.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateArgs {
    pub filter: Where,
    pub order_by: Vec<OrderBy>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
    pub select: AggregateSelection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupByArgs {
    pub by: Vec<String>,
    pub filter: Where,
    pub having: Having,
    pub select: AggregateSelection,
    pub order_by: Vec<OrderBy>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateArgs {
    pub data: Data,

    /// Columns and relations returned for the created record. `None`
    /// returns nothing.
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateManyArgs {
    pub data: Vec<Data>,
    pub skip_duplicates: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateArgs {
    pub filter: Where,
    pub data: Data,
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateManyArgs {
    pub filter: Where,
    pub data: Data,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertArgs {
    /// Unique filter; its fields form the conflict target.
    pub filter: Where,
    pub create: Data,
    pub update: Data,
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteArgs {
    pub filter: Where,
    pub selection: Option<Selection>,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::FindMany(_) => "findMany",
            Operation::FindFirst(_) => "findFirst",
            Operation::FindUnique(_) => "findUnique",
            Operation::Count(_) => "count",
            Operation::Aggregate(_) => "aggregate",
            Operation::GroupBy(_) => "groupBy",
            Operation::Exists(_) => "exists",
            Operation::Create(_) => "create",
            Operation::CreateMany(_) => "createMany",
            Operation::Update(_) => "update",
            Operation::UpdateMany(_) => "updateMany",
            Operation::Upsert(_) => "upsert",
            Operation::Delete(_) => "delete",
            Operation::DeleteMany(_) => "deleteMany",
        }
    }
}

impl FindArgs {
    pub fn new() -> FindArgs {
        FindArgs::default()
    }

    pub fn filter(mut self, filter: Where) -> FindArgs {
        self.filter = filter;
        self
    }

    pub fn select(mut self, selection: Selection) -> FindArgs {
        self.selection = selection;
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> FindArgs {
        self.order_by.push(order_by);
        self
    }

    pub fn take(mut self, take: u64) -> FindArgs {
        self.take = Some(take);
        self
    }

    pub fn skip(mut self, skip: u64) -> FindArgs {
        self.skip = Some(skip);
        self
    }

    pub fn cursor(mut self, cursor: Where) -> FindArgs {
        self.cursor = Some(cursor);
        self
    }

    pub fn distinct<I>(mut self, fields: I) -> FindArgs
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.distinct = fields.into_iter().map(Into::into).collect();
        self
    }
}
