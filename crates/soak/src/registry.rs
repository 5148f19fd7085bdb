//! hydration registry
//!
//! The declaration-time side table: per (type name, field name) an ordered
//! list of [FetchDescriptor]s, per type name a [TypeConfig] and the declared
//! field defaults. Populated through [Registry::declare] during startup,
//! read-only for the rest of the process - entries are never removed.
//!
//! Declaration order matters twice: fields keep their declaration order in
//! the hydrated view, and descriptors keep theirs for the within-source
//! tie-break during resolution. Both maps are [indexmap::IndexMap] for that
//! reason.

use crate::normalize::Normalizer;
use crate::resolve::ResolveError;
use crate::source::Source;
use crate::transform::{Transform, TransformError};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// One hydration instruction attached to a field
///
/// A field may carry several, even for the same source (say, a deprecated
/// key next to its replacement); within one source the earliest descriptor
/// with a present key wins.
#[derive(Clone, derive_new::new)]
pub struct FetchDescriptor {
    pub source: Source,
    pub field_name: String,
    /// Used verbatim (after prefixing) instead of the normalized field name
    #[new(default)]
    pub key: Option<String>,
    /// Applied left-to-right to the raw value
    #[new(default)]
    pub transforms: Vec<Transform>,
}

impl std::fmt::Debug for FetchDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchDescriptor")
            .field("source", &self.source)
            .field("field_name", &self.field_name)
            .field("key", &self.key)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// Builder for one [FetchDescriptor], attached via [FieldDecl::fetch]
#[derive(Clone)]
pub struct Fetch {
    source: Source,
    key: Option<String>,
    transforms: Vec<Transform>,
}

impl Fetch {
    /// Fetch from the parsed-argument map
    pub fn cli() -> Self {
        Fetch {
            source: Source::Cli,
            key: None,
            transforms: Vec::new(),
        }
    }

    /// Fetch from the environment store
    pub fn env() -> Self {
        Fetch {
            source: Source::Env,
            key: None,
            transforms: Vec::new(),
        }
    }

    /// Use `key` verbatim instead of the normalized field name
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append a transform; attachment order is application order
    pub fn transform<F>(self, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.transform_shared(Arc::new(transform))
    }

    pub(crate) fn transform_shared(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }
}

/// Per-type key computation settings
///
/// Everything is optional: an absent prefix is empty, an absent normalizer
/// falls back to the source default ([crate::normalize::default_for]). A
/// type that never attached a config resolves fine.
#[derive(Clone, Default)]
pub struct TypeConfig {
    pub prefix_cli: Option<String>,
    pub prefix_env: Option<String>,
    pub normalizer_cli: Option<Normalizer>,
    pub normalizer_env: Option<Normalizer>,
}

impl TypeConfig {
    pub fn prefix_cli(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_cli = Some(prefix.into());
        self
    }

    pub fn prefix_env(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_env = Some(prefix.into());
        self
    }

    pub fn normalizer_cli<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.normalizer_cli = Some(Arc::new(normalizer));
        self
    }

    pub fn normalizer_env<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.normalizer_env = Some(Arc::new(normalizer));
        self
    }

    /// Shallow merge: set fields of `other` win, unset fields keep theirs
    ///
    /// Repeated configuration calls on one type extend rather than replace,
    /// so a CLI prefix set in one declaration survives an ENV prefix set in
    /// a later one.
    pub fn merge(&mut self, other: TypeConfig) {
        if let Some(prefix) = other.prefix_cli {
            self.prefix_cli = Some(prefix);
        }
        if let Some(prefix) = other.prefix_env {
            self.prefix_env = Some(prefix);
        }
        if let Some(normalizer) = other.normalizer_cli {
            self.normalizer_cli = Some(normalizer);
        }
        if let Some(normalizer) = other.normalizer_env {
            self.normalizer_env = Some(normalizer);
        }
    }

    pub(crate) fn prefix(&self, source: Source) -> &str {
        match source {
            Source::Cli => self.prefix_cli.as_deref().unwrap_or(""),
            Source::Env => self.prefix_env.as_deref().unwrap_or(""),
        }
    }

    pub(crate) fn normalizer(&self, source: Source) -> Option<&Normalizer> {
        match source {
            Source::Cli => self.normalizer_cli.as_ref(),
            Source::Env => self.normalizer_env.as_ref(),
        }
    }
}

impl std::fmt::Debug for TypeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeConfig")
            .field("prefix_cli", &self.prefix_cli)
            .field("prefix_env", &self.prefix_env)
            .field("normalizer_cli", &self.normalizer_cli.is_some())
            .field("normalizer_env", &self.normalizer_env.is_some())
            .finish()
    }
}

/// Declared default for a field
///
/// `Computed` is evaluated once per hydrated view, when the view's private
/// default instance is constructed. A closure that hydrates another type
/// composes nested records without any engine special-casing.
#[derive(Clone)]
pub enum DefaultValue {
    Static(Value),
    Computed(Arc<dyn Fn() -> Result<Value, ResolveError> + Send + Sync>),
}

impl DefaultValue {
    pub(crate) fn materialize(&self) -> Result<Value, ResolveError> {
        match self {
            DefaultValue::Static(value) => Ok(value.clone()),
            DefaultValue::Computed(thunk) => thunk(),
        }
    }
}

#[derive(Default)]
pub(crate) struct TypeEntry {
    pub(crate) config: TypeConfig,
    pub(crate) fields: IndexMap<String, FieldEntry>,
}

pub(crate) struct FieldEntry {
    pub(crate) default: DefaultValue,
    pub(crate) descriptors: Vec<FetchDescriptor>,
}

/// The process-wide metadata side table
#[derive(Default)]
pub struct Registry {
    types: IndexMap<String, TypeEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or continue) declaring `type_name`
    ///
    /// Repeated calls extend the existing declaration.
    pub fn declare(&mut self, type_name: impl Into<String>) -> TypeDecl<'_> {
        let type_name = type_name.into();
        let entry = self.types.entry(type_name.clone()).or_default();
        tracing::trace!(%type_name, "declaring type");
        TypeDecl { entry }
    }

    /// Descriptor list for (type, field), empty when never registered
    pub fn lookup(&self, type_name: &str, field: &str) -> &[FetchDescriptor] {
        self.types
            .get(type_name)
            .and_then(|entry| entry.fields.get(field))
            .map(|field| field.descriptors.as_slice())
            .unwrap_or(&[])
    }

    /// Effective config for `type_name`, empty-defaulted when never set
    pub fn type_config(&self, type_name: &str) -> TypeConfig {
        self.types
            .get(type_name)
            .map(|entry| entry.config.clone())
            .unwrap_or_default()
    }

    /// Merge `config` into the stored config for `type_name`
    ///
    /// A merge, not a replace - see [TypeConfig::merge].
    pub fn set_type_config(&mut self, type_name: impl Into<String>, config: TypeConfig) {
        self.types
            .entry(type_name.into())
            .or_default()
            .config
            .merge(config);
    }

    pub(crate) fn entry(&self, type_name: &str) -> Option<&TypeEntry> {
        self.types.get(type_name)
    }
}

/// In-progress declaration of one record type
pub struct TypeDecl<'r> {
    entry: &'r mut TypeEntry,
}

impl<'r> TypeDecl<'r> {
    /// Merge `config` into the type's configuration
    pub fn config(&mut self, config: TypeConfig) -> &mut Self {
        self.entry.config.merge(config);
        self
    }

    pub fn prefix_cli(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.entry.config.prefix_cli = Some(prefix.into());
        self
    }

    pub fn prefix_env(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.entry.config.prefix_env = Some(prefix.into());
        self
    }

    pub fn normalizer_cli<F>(&mut self, normalizer: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.entry.config.normalizer_cli = Some(Arc::new(normalizer));
        self
    }

    pub fn normalizer_env<F>(&mut self, normalizer: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.entry.config.normalizer_env = Some(Arc::new(normalizer));
        self
    }

    /// Declare `field` with its author-declared default value
    ///
    /// Redeclaring a field replaces the default and keeps any descriptors
    /// registered so far.
    pub fn field(&mut self, name: impl Into<String>, default: impl Into<Value>) -> FieldDecl<'_> {
        self.field_entry(name.into(), DefaultValue::Static(default.into()))
    }

    /// Declare `field` with a default computed at view construction
    ///
    /// The closure runs once per hydrated view; hydrating another type
    /// inside it yields a nested record.
    pub fn field_with<F>(&mut self, name: impl Into<String>, default: F) -> FieldDecl<'_>
    where
        F: Fn() -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        self.field_entry(name.into(), DefaultValue::Computed(Arc::new(default)))
    }

    fn field_entry(&mut self, name: String, default: DefaultValue) -> FieldDecl<'_> {
        use indexmap::map::Entry;

        let field = match self.entry.fields.entry(name.clone()) {
            Entry::Occupied(occupied) => {
                let field = occupied.into_mut();
                field.default = default;
                field
            }
            Entry::Vacant(vacant) => vacant.insert(FieldEntry {
                default,
                descriptors: Vec::new(),
            }),
        };

        FieldDecl { name, field }
    }
}

/// In-progress declaration of one field
pub struct FieldDecl<'t> {
    name: String,
    field: &'t mut FieldEntry,
}

impl<'t> FieldDecl<'t> {
    /// Register one fetch instruction
    ///
    /// Repeat to register alternatives; within one source, earlier
    /// registrations win.
    pub fn fetch(&mut self, fetch: Fetch) -> &mut Self {
        let Fetch {
            source,
            key,
            transforms,
        } = fetch;

        let mut descriptor = FetchDescriptor::new(source, self.name.clone());
        descriptor.key = key;
        descriptor.transforms = transforms;

        tracing::trace!(field = %self.name, ?descriptor, "registering descriptor");
        self.field.descriptors.push(descriptor);
        self
    }

    /// Fetch from both CLI and ENV under default keys, no transforms
    pub fn hydrate(&mut self) -> &mut Self {
        self.fetch(Fetch::cli()).fetch(Fetch::env())
    }

    /// [FieldDecl::hydrate] with one transform shared by both descriptors
    pub fn hydrate_with<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        let transform: Transform = Arc::new(transform);
        self.fetch(Fetch::cli().transform_shared(transform.clone()))
            .fetch(Fetch::env().transform_shared(transform))
    }
}
