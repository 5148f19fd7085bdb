//! soak cli interface

use clap::{Parser, ValueEnum};
use std::fmt::Formatter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source precedence order, outermost first
    ///
    /// Comma separated, e.g. `--order env,cli`. Defaults to cli,env.
    #[arg(short = 'o', long = "order", value_enum, value_delimiter = ',')]
    pub order: Vec<SourceArg>,

    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Raw flags forwarded to the hydration argument map
    ///
    /// Everything after `--`, e.g. `soak -- --host example.com --port 9000`.
    #[arg(last = true)]
    pub flags: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SourceArg {
    Cli,
    Env,
}

impl From<SourceArg> for soak::Source {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Cli => soak::Source::Cli,
            SourceArg::Env => soak::Source::Env,
        }
    }
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
