//! Function providers.
//!
//! Every non-passthrough function call and every spatial operator is
//! rendered by a provider looked up by name. A provider declares which
//! dialects it supports and returns a [`Template`] that the serializer fills
//! with the rendered arguments.

mod builtin;
pub use builtin::Builtin;

mod registry;
pub use registry::FunctionRegistry;

mod template;
pub use template::{Fragment, Template};

use geostore_core::driver::Dialect;

use std::{fmt::Debug, ops::RangeInclusive};

/// Rendering context handed to providers.
#[derive(Debug, Clone, Copy)]
pub struct FunctionCx {
    pub dialect: Dialect,

    /// PostGIS: unprefixed spatial function names
    pub legacy_spatial: bool,
}

pub trait FunctionProvider: Debug + Send + Sync + 'static {
    /// Name the provider is registered under. Lookup is case-insensitive.
    fn name(&self) -> &str;

    /// Accepted argument counts.
    fn arity(&self) -> RangeInclusive<usize>;

    fn supports(&self, dialect: Dialect) -> bool;

    /// Template for a call with `args` arguments. Only called for supported
    /// dialects and accepted argument counts.
    fn template(&self, cx: &FunctionCx, args: usize) -> Template;
}
