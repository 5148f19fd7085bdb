//! Snapshot tests
//!
//! Hydrates the README record set against fixed in-memory stores and
//! compares the serialized snapshot.

use soak::{transform, ArgMap, Hydrator, MapStore, Registry, Source};
use std::sync::Arc;

fn demo_registry() -> Registry {
    let mut registry = Registry::new();
    let mut server = registry.declare("ServerConfig");
    server.field("host", "localhost").hydrate();
    server.field("port", 1667).hydrate_with(transform::to_integer);
    server.field("debug", false).hydrate_with(transform::to_boolean);
    registry
}

#[test]
fn hydrated_snapshot() {
    let env = Arc::new(MapStore::default());
    env.set("PORT", "8080");
    env.set("DEBUG", "true");

    let hydrator = Hydrator::new(demo_registry())
        .with_args(ArgMap::parse(["--host", "example.com"]))
        .with_env(env);

    let view = hydrator.hydrate("ServerConfig").unwrap();
    insta::assert_yaml_snapshot!(view.snapshot().unwrap(), @r###"
    ---
    host: example.com
    port: 8080
    debug: true
    "###);
}

#[test]
fn defaults_only_snapshot() {
    let hydrator = Hydrator::new(demo_registry())
        .with_args(ArgMap::default())
        .with_env(Arc::new(MapStore::default()));

    let view = hydrator
        .hydrate_ordered("ServerConfig", Source::default_order())
        .unwrap();
    insta::assert_yaml_snapshot!(view.snapshot().unwrap(), @r###"
    ---
    host: localhost
    port: 1667
    debug: false
    "###);
}
