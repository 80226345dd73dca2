//! The per-database contract every SQL fragment is built through.
//!
//! The compiler never writes dialect-specific SQL itself. It asks the
//! [`Adapter`] for identifiers, operators, functions and clauses, and the
//! adapter answers with [`Sql`](crate::Sql) fragments. Adapters are pure:
//! they never fail for well-typed input and never consult capability flags;
//! the compiler does that before asking.

mod clauses;
pub use clauses::{Clauses, InsertSource, JoinKind, OnConflict, SetOperation};

pub mod filters;

mod functions;
pub use functions::Functions;

mod identifiers;
pub use identifiers::Identifiers;

mod operators;
pub use operators::{Operators, PatternPosition};

mod subqueries;
pub use subqueries::Subqueries;

mod updates;
pub use updates::Updates;

mod mysql;
pub use mysql::Mysql;

mod postgresql;
pub use postgresql::Postgresql;

mod sqlite;
pub use sqlite::Sqlite;

use quarry_core::Capability;

pub trait Adapter:
    Identifiers + Operators + Functions + Updates + Subqueries + Clauses + Send + Sync
{
    /// Short database name used in error messages and logs.
    fn name(&self) -> &'static str;

    fn capability(&self) -> &'static Capability;

    /// Writes the placeholder for the 1-based parameter `position`.
    fn placeholder(&self, position: usize, dst: &mut String);
}
