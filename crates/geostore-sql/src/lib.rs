pub mod function;
pub use function::{FunctionProvider, FunctionRegistry};

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer, Sql};
