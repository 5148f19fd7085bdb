//! resolution engine
//!
//! [Hydrator] binds a [Registry] to its backing stores. [Hydrator::hydrate]
//! materializes the type's private default instance and wraps it in a
//! [HydratedView]; every [HydratedView::get] walks the precedence order from
//! scratch:
//!
//! - outer loop: sources, in the caller-supplied precedence order
//! - inner loop: the field's descriptors for that source, in declaration
//!   order
//! - first present raw value wins outright; its transform chain runs and the
//!   result is returned - later sources are never consulted
//! - nothing matched: the declared default is returned
//!
//! There is deliberately no caching: a store mutation between two reads is
//! visible on the second read.

use crate::normalize;
use crate::registry::{FetchDescriptor, Registry, TypeConfig};
use crate::source::{ArgMap, EnvStore, ProcessEnv, Source};
use crate::transform::{self, TransformError};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("no hydrator installed; call soak::install during startup, before the first field read")]
    RegistryMissing,
    #[error("type {type_name:?} was never declared")]
    UnknownType { type_name: String },
    #[error("no field {field:?} declared on {type_name:?}")]
    UnknownField { type_name: String, field: String },
    #[error("transform failed for field {field:?}")]
    Transform {
        field: String,
        #[source]
        source: TransformError,
    },
}

/// External key for `descriptor` against `source`'s store
///
/// Exactly `prefix ++ (explicit key, else normalizer(field name))`, with an
/// empty prefix and the source's default normalizer when unconfigured.
pub fn compute_key(descriptor: &FetchDescriptor, config: &TypeConfig, source: Source) -> String {
    let base = match &descriptor.key {
        Some(key) => key.clone(),
        None => match config.normalizer(source) {
            Some(normalizer) => normalizer(&descriptor.field_name),
            None => normalize::default_for(source)(&descriptor.field_name),
        },
    };

    format!("{}{}", config.prefix(source), base)
}

/// A [Registry] bound to its backing stores
#[derive(derive_new::new)]
pub struct Hydrator {
    registry: Registry,
    #[new(default)]
    args: ArgMap,
    #[new(value = "Arc::new(ProcessEnv)")]
    env: Arc<dyn EnvStore>,
}

impl Hydrator {
    /// Replace the parsed-argument map (empty by default)
    pub fn with_args(mut self, args: ArgMap) -> Self {
        self.args = args;
        self
    }

    /// Replace the environment store ([ProcessEnv] by default)
    pub fn with_env(mut self, env: Arc<dyn EnvStore>) -> Self {
        self.env = env;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Raw lookup against one source's store
    ///
    /// Absence is a normal outcome, not an error.
    pub fn fetch_raw(&self, source: Source, key: &str) -> Option<String> {
        match source {
            Source::Cli => self.args.get(key),
            Source::Env => self.env.get(key),
        }
    }

    /// Hydrated view of `type_name` under the default CLI-before-ENV order
    pub fn hydrate(&self, type_name: &str) -> Result<HydratedView<'_>, ResolveError> {
        self.hydrate_ordered(type_name, Source::default_order())
    }

    /// Hydrated view of `type_name` under a caller-chosen precedence order
    ///
    /// Sources missing from `order` are never consulted, even when the type
    /// registered descriptors for them. An empty order resolves every field
    /// to its default.
    pub fn hydrate_ordered(
        &self,
        type_name: &str,
        order: Vec<Source>,
    ) -> Result<HydratedView<'_>, ResolveError> {
        let entry = self
            .registry
            .entry(type_name)
            .ok_or_else(|| ResolveError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        // the view's private default instance; computed defaults (nested
        // records) are evaluated here, once per view
        let mut instance = IndexMap::new();
        for (name, field) in &entry.fields {
            instance.insert(name.clone(), field.default.materialize()?);
        }

        tracing::debug!(type_name, fields = instance.len(), ?order, "view constructed");

        Ok(HydratedView {
            hydrator: self,
            type_name: type_name.to_string(),
            instance,
            order,
        })
    }
}

/// A record whose field reads resolve through the registry
///
/// Callers read fields through [HydratedView::get] rather than direct field
/// access; the view exposes exactly the declared field names, in declaration
/// order.
pub struct HydratedView<'h> {
    hydrator: &'h Hydrator,
    type_name: String,
    instance: IndexMap<String, Value>,
    order: Vec<Source>,
}

impl<'h> HydratedView<'h> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared field names, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.instance.keys().map(String::as_str)
    }

    /// Resolve `field`, walking the precedence order fresh on this call
    #[tracing::instrument(level = "trace", skip(self), fields(type_name = %self.type_name))]
    pub fn get(&self, field: &str) -> Result<Value, ResolveError> {
        let Some(default) = self.instance.get(field) else {
            return Err(ResolveError::UnknownField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            });
        };

        let registry = self.hydrator.registry();
        let config = registry.type_config(&self.type_name);
        let descriptors = registry.lookup(&self.type_name, field);

        for &source in &self.order {
            for descriptor in descriptors.iter().filter(|d| d.source == source) {
                let key = compute_key(descriptor, &config, source);
                let Some(raw) = self.hydrator.fetch_raw(source, &key) else {
                    tracing::trace!(%source, %key, "key absent");
                    continue;
                };

                tracing::trace!(%source, %key, "resolved from store");
                return transform::apply(&descriptor.transforms, Value::String(raw)).map_err(
                    |error| ResolveError::Transform {
                        field: field.to_string(),
                        source: error,
                    },
                );
            }
        }

        Ok(default.clone())
    }

    /// Resolve every declared field into a [Value::Object]
    pub fn snapshot(&self) -> Result<Value, ResolveError> {
        let mut object = IndexMap::new();
        for field in self.instance.keys() {
            object.insert(field.clone(), self.get(field)?);
        }
        Ok(Value::Object(object))
    }
}
