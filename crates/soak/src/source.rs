//! configuration value sources
//!
//! A [Source] is an external origin of raw configuration strings. The
//! resolver only ever reads a source by exact key; how the backing data got
//! there (argument tokenizing, dotenv loading, ...) is the caller's concern.
//!
//! The environment is abstracted behind [EnvStore] so tests can resolve
//! against an in-memory [MapStore] without mutating process-global state.

use indexmap::IndexMap;
use std::sync::RwLock;

/// External origin of configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Parsed command-line arguments ([ArgMap])
    Cli,
    /// Environment variables ([EnvStore])
    Env,
}

impl Source {
    /// Default precedence: CLI flags win over environment variables
    pub fn default_order() -> Vec<Source> {
        vec![Source::Cli, Source::Env]
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Cli => f.write_str("cli"),
            Source::Env => f.write_str("env"),
        }
    }
}

/// Read access to an environment-like key/value store
pub trait EnvStore: Send + Sync {
    /// Value for `key`, `None` when unset
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment for tests and embedding
///
/// Mutable through a shared reference, so a test holding an
/// `Arc<MapStore>` can change values between two reads of the same view.
#[derive(Debug, Default)]
pub struct MapStore {
    values: RwLock<IndexMap<String, String>>,
}

impl MapStore {
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .expect("store lock poisoned")
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.values
            .write()
            .expect("store lock poisoned")
            .shift_remove(key);
    }
}

impl EnvStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }
}

/// Parsed command-line arguments, keyed by flag name without leading dashes
///
/// Populated once at process start. [ArgMap::parse] covers the common
/// `--flag`, `--flag=value` and `--flag value` shapes; a bare `--flag`
/// stores `"true"`. Anything not starting with `--` is skipped.
#[derive(Debug, Clone, Default)]
pub struct ArgMap {
    values: IndexMap<String, String>,
}

impl ArgMap {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = ArgMap::default();
        let mut args = args.into_iter().peekable();

        while let Some(arg) = args.next() {
            let Some(flag) = arg.as_ref().strip_prefix("--") else {
                continue;
            };

            if let Some((key, value)) = flag.split_once('=') {
                map.set(key, value);
                continue;
            }

            match args.peek() {
                Some(next) if !next.as_ref().starts_with("--") => {
                    let value = args.next().expect("peeked element must exist");
                    map.set(flag, value.as_ref());
                }
                _ => map.set(flag, "true"),
            }
        }

        map
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
