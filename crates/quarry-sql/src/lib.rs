#[macro_use]
mod fragment;
pub use fragment::{Comma, Delimited, Sql, Statement, ToSql};

pub mod adapter;
pub use adapter::{Adapter, Mysql, Postgresql, Sqlite};

pub mod compiler;
pub use compiler::{Compiled, Compiler, Config};
