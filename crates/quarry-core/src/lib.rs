mod error;
pub use error::{Error, IntoError};

pub mod capability;
pub use capability::Capability;

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Quarry's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
