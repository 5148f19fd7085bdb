//! # soak - lazy field hydration
//!
//! For a user guide and CLI usage see the repository README.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `soak` works internally.
//!
//! ### Terms
//!
//! - a `source` is an external origin of raw configuration strings; there
//!   are two: CLI arguments and environment variables
//! - a `fetch descriptor` is one instruction attached to a field, naming a
//!   source, an optional explicit key and a transform chain
//! - a `normalizer` turns a field name into a source-idiomatic key spelling
//! - a `hydrated view` is a record whose field reads resolve through the
//!   registry, backed by a private default instance
//!
//! ### Declaration
//!
//! Callers describe their record types against a [Registry] during startup:
//!
//! ```
//! use soak::{transform, Fetch, Registry};
//!
//! let mut registry = Registry::new();
//! let mut server = registry.declare("ServerConfig");
//! server.prefix_env("APP_");
//! server.field("host", "localhost").hydrate();
//! server.field("port", 1667).fetch(Fetch::env().transform(transform::to_integer));
//! ```
//!
//! [Registry::declare] records, per (type name, field name), an ordered list
//! of [FetchDescriptor]s plus the declared default, and per type name a
//! [TypeConfig] (prefixes and normalizer overrides). Nothing resolves yet;
//! the registry is a side table that only grows, and declaration order
//! relative to other declarations never matters as long as everything is
//! declared before the first resolution.
//!
//! ### Resolution
//!
//! A [Hydrator] binds the registry to its backing stores: an [ArgMap]
//! populated once from process arguments and an [EnvStore] (the process
//! environment, or an in-memory [MapStore] in tests).
//!
//! [Hydrator::hydrate] constructs the type's default instance and returns a
//! [HydratedView]. Each [HydratedView::get] re-runs the resolution walk: for
//! every source in the precedence order (CLI before ENV unless the caller
//! chose otherwise), each of the field's descriptors for that source is
//! tried in declaration order. The external key is computed as
//! `prefix ++ (explicit key, else normalizer(field name))`, the store is
//! read by that exact key, and the first present value is fed through the
//! descriptor's transform chain and returned. When no source yields a value
//! the declared default is returned. Results are never cached.
//!
//! ### Process-wide use
//!
//! Most programs declare one registry, [install] it once during startup and
//! read through the free functions:
//!
//! ```
//! # let registry = soak::Registry::new();
//! # let _ = registry;
//! // soak::install(Hydrator::new(registry))?;
//! // let config = soak::hydrate("ServerConfig")?;
//! ```
//!
//! Hydrating before [install] fails fast with
//! [ResolveError::RegistryMissing] - the side table is a hard prerequisite
//! of resolution and its absence is a startup bug, not a per-field
//! condition.

pub mod normalize;
pub mod registry;
pub mod resolve;
pub mod source;
pub mod transform;
pub mod value;

pub use registry::{DefaultValue, Fetch, FetchDescriptor, FieldDecl, Registry, TypeConfig, TypeDecl};
pub use resolve::{compute_key, HydratedView, Hydrator, ResolveError};
pub use source::{ArgMap, EnvStore, MapStore, ProcessEnv, Source};
pub use transform::{Transform, TransformError};
pub use value::Value;

use std::sync::OnceLock;

static INSTALLED: OnceLock<Hydrator> = OnceLock::new();

/// Returned by a second call to [install]
#[derive(thiserror::Error, Debug)]
#[error("a hydrator is already installed for this process")]
pub struct AlreadyInstalled;

/// Install the process-wide hydrator
///
/// Call once during startup, after all declarations and before the first
/// field read. The registry never changes afterwards.
pub fn install(hydrator: Hydrator) -> Result<(), AlreadyInstalled> {
    INSTALLED.set(hydrator).map_err(|_| AlreadyInstalled)?;
    tracing::debug!("process-wide hydrator installed");
    Ok(())
}

/// The installed hydrator, failing fast when [install] was never called
pub fn installed() -> Result<&'static Hydrator, ResolveError> {
    INSTALLED.get().ok_or(ResolveError::RegistryMissing)
}

/// Hydrated view of `type_name` from the process-wide hydrator
pub fn hydrate(type_name: &str) -> Result<HydratedView<'static>, ResolveError> {
    installed()?.hydrate(type_name)
}

/// [hydrate] with a caller-chosen source precedence order
pub fn hydrate_ordered(
    type_name: &str,
    order: Vec<Source>,
) -> Result<HydratedView<'static>, ResolveError> {
    installed()?.hydrate_ordered(type_name, order)
}
