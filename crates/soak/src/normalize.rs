//! field-name normalizers
//!
//! A normalizer turns a declared field name into the spelling a source uses
//! for its keys: dash-case for CLI flags (`connectionTimeout` becomes
//! `connection-timeout`), upper-snake for environment variables
//! (`CONNECTION_TIMEOUT`). Both defaults can be overridden per type via
//! [crate::TypeConfig].

use crate::source::Source;
use std::sync::Arc;

/// Pluggable `field name -> external key` function
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Default normalizer for `source`
pub fn default_for(source: Source) -> fn(&str) -> String {
    match source {
        Source::Cli => dash_case,
        Source::Env => upper_snake,
    }
}

/// `myFieldName` / `my_field_name` -> `my-field-name`
pub fn dash_case(input: &str) -> String {
    words(input).join("-").to_lowercase()
}

/// `myFieldName` / `my-field-name` -> `MY_FIELD_NAME`
pub fn upper_snake(input: &str) -> String {
    words(input).join("_").to_uppercase()
}

/// Split on separators and camel-case boundaries
///
/// An uppercase run stays one word until a lowercase letter follows
/// (`HTTPServer` splits as `HTTP`, `Server`).
fn words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
        let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
        if c.is_uppercase() && !current.is_empty() && (prev_is_lower || next_is_lower) {
            words.push(std::mem::take(&mut current));
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dash_case_spellings() {
        assert_eq!(dash_case("myFlag"), "my-flag");
        assert_eq!(dash_case("my_flag"), "my-flag");
        assert_eq!(dash_case("my-flag"), "my-flag");
        assert_eq!(dash_case("HTTPServer"), "http-server");
        assert_eq!(dash_case("host"), "host");
    }

    #[test]
    fn upper_snake_spellings() {
        assert_eq!(upper_snake("myFlag"), "MY_FLAG");
        assert_eq!(upper_snake("connection_timeout"), "CONNECTION_TIMEOUT");
        assert_eq!(upper_snake("my-flag"), "MY_FLAG");
        assert_eq!(upper_snake("port"), "PORT");
    }

    #[test]
    fn defaults_per_source() {
        assert_eq!(default_for(Source::Cli)("myFlag"), "my-flag");
        assert_eq!(default_for(Source::Env)("myFlag"), "MY_FLAG");
    }
}
