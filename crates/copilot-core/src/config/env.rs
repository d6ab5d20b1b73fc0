//! Environment variable loading utilities.
//!
//! Small `FromStr`-generic helpers so [`super::Config::from_env`] reads
//! as a flat list of field assignments instead of a thicket of
//! `env::var(..).ok().and_then(..)` chains.

use std::env;
use std::str::FromStr;

/// Load an optional environment variable, falling back to `default` when unset.
pub fn with_default<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Load a boolean environment variable, accepting common truthy/falsy spellings.
pub fn bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key).as_deref() {
        Ok("true" | "True" | "TRUE" | "1" | "yes" | "on") => true,
        Ok("false" | "False" | "FALSE" | "0" | "no" | "off") => false,
        _ => default,
    }
}

/// Load a required environment variable, returning `None` (not an error) if unset.
///
/// Required-ness is enforced by the caller (`Config::from_env`), which
/// turns a `None` Engine base URL / API key into a `ConfigError`.
pub fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Load a comma-separated set of strings, trimming whitespace and dropping empties.
pub fn set_with_default(key: &str, default: &[&str]) -> std::collections::HashSet<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}
