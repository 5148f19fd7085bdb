mod cli;

use soak::{transform, ArgMap, Hydrator, Registry, Source, Value};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("SOAK_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn run(cli: cli::Cli) -> anyhow::Result<()> {
    soak::install(Hydrator::new(demo_registry()).with_args(ArgMap::parse(&cli.flags)))?;

    let order: Vec<Source> = if cli.order.is_empty() {
        Source::default_order()
    } else {
        cli.order.iter().copied().map(Into::into).collect()
    };

    let view = soak::hydrate_ordered("ServerConfig", order)?;
    output(&cli.format, &view.snapshot()?)?;
    Ok(())
}

/// The record set from the README: a server config plus a nested record
/// with its own key prefixes
fn demo_registry() -> Registry {
    let mut registry = Registry::new();

    {
        let mut nested = registry.declare("NestedConfig");
        nested.prefix_cli("nested-").prefix_env("NESTED_");
        nested.field("name", "nested name").hydrate();
    }

    let mut server = registry.declare("ServerConfig");
    server.field("host", "localhost").hydrate();
    server.field("port", 1667).hydrate_with(transform::to_integer);
    server.field("debug", false).hydrate_with(transform::to_boolean);
    server.field_with("nested", || soak::hydrate("NestedConfig")?.snapshot());

    registry
}

fn output(format: &cli::OutputFormat, value: &Value) -> anyhow::Result<()> {
    match format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}
