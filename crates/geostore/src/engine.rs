//! Query translation, execution and materialization.

mod convert;

mod lower;

mod materialize;
pub use materialize::Materializer;

pub mod mutation;
pub use mutation::{FeatureUpdate, MutationPlanner};

pub mod plan;
pub use plan::{PlannedJoin, QueryPlan};

mod planner;
pub use planner::Translator;
