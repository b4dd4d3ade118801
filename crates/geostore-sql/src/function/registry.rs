use super::{Builtin, FunctionCx, FunctionProvider, Template};

use geostore_core::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Function providers by lower-cased name.
///
/// Built once when the store starts and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    providers: IndexMap<String, Arc<dyn FunctionProvider>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in providers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for provider in Builtin::all() {
            registry.register(provider);
        }
        registry
    }

    /// Registers a provider, replacing one of the same name.
    pub fn register(&mut self, provider: impl FunctionProvider) -> &mut Self {
        self.providers
            .insert(provider.name().to_ascii_lowercase(), Arc::new(provider));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FunctionProvider>> {
        self.providers.get(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolves the template for a call. Fails when the function is unknown
    /// to this registry or to the dialect, and when the argument count does
    /// not match.
    pub fn template(&self, name: &str, args: usize, cx: &FunctionCx) -> Result<Template> {
        let provider = self
            .get(name)
            .ok_or_else(|| Error::unsupported_function(name, None))?;

        if !provider.supports(cx.dialect) {
            return Err(Error::unsupported_function(name, Some(cx.dialect.name())));
        }

        let arity = provider.arity();
        if !arity.contains(&args) {
            return Err(Error::invalid_filter(format!(
                "function `{name}` takes {} to {} arguments, {args} given",
                arity.start(),
                arity.end()
            )));
        }

        Ok(provider.template(cx, args))
    }
}
