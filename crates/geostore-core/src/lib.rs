pub mod driver;
pub use driver::{Connection, Driver};

mod error;
pub use error::{Error, IntoError};

pub mod feature;
pub use feature::Feature;

pub mod fid;

pub mod filter;
pub use filter::Filter;

pub mod geometry;
pub use geometry::Geometry;

pub mod schema;
pub use schema::MappedSchema;

pub mod stmt;

/// A Result type alias that uses geostore's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
