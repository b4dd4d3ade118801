pub mod config;
pub use config::{Paging, StoreConfig};

pub mod engine;
pub use engine::{FeatureUpdate, QueryPlan, Translator};

mod query;
pub use query::{Query, ResolveMode};

pub mod resolver;
pub use resolver::{ExternalFetcher, FeatureCache, Resolver};

pub mod services;
pub use services::{CrsTransformer, MetreConverter, UnitConverter};

pub mod store;
pub use store::{Builder, Session, Store};

mod stream;
pub use stream::FeatureStream;

pub use geostore_core::{
    driver, feature, fid, filter, geometry, schema, stmt, Error, Feature, Filter, Geometry,
    MappedSchema, Result,
};
pub use geostore_sql::{FunctionProvider, FunctionRegistry};
