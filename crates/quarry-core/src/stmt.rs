//! The validated operation payload handed to the compiler.
//!
//! These types describe *what* to read or write in terms of model, field and
//! relation names. They carry no SQL; the compiler resolves every name
//! against the [`Schema`](crate::Schema) and reports unknown names.

mod aggregate;
pub use aggregate::{AggregateFn, AggregateSelection, Having, HavingCondition};

mod data;
pub use data::{ConnectOrCreate, Data, DataEntry, NestedUpdate, NestedUpsert, NestedWrites, UpdateOp};

mod filter;
pub use filter::{
    Condition, FilterOp, QueryMode, RelationFilter, ScalarFilter, ToManyFilter, ToOneFilter, Where,
};

mod operation;
pub use operation::{
    AggregateArgs, CountArgs, CreateArgs, CreateManyArgs, DeleteArgs, FindArgs, GroupByArgs,
    Operation, UpdateArgs, UpdateManyArgs, UpsertArgs,
};

mod order_by;
pub use order_by::{Direction, Nulls, OrderBy, OrderTarget};

mod selection;
pub use selection::{Scalars, Selection};

mod value;
pub use value::Value;
