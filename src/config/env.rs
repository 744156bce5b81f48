//! Environment variable overrides.
//!
//! A config file named `myapp.yaml` is overridden by variables prefixed with
//! `MYAPP_`. The rest of the name is split on `_` into lower-cased key
//! segments, so `MYAPP_SERVER_HTTP_PORT=8080` sets `server.http.port` to the
//! integer `8080`.
//!
//! Overrides are applied in the order the environment yields them and the
//! last one applied wins. When one variable addresses a prefix of another
//! (`APP_ITEM_ONE` and `APP_ITEM_ONE_SUB`), whichever comes last decides
//! whether `item.one` ends up a scalar or a map. Process environment order is
//! platform-defined, so that outcome is not deterministic.

use super::nested::NestedMap;
use super::value::{Value, sniff};
use std::path::Path;
use tracing::debug;

/// A single parsed override.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvOverride {
    /// Full variable name, e.g. `MYAPP_SERVER_PORT`.
    pub var: String,
    /// Lower-cased key path, e.g. `["server", "port"]`.
    pub tokens: Vec<String>,
    /// Sniffed value.
    pub value: Value,
}

impl EnvOverride {
    /// Dotted form of the key path.
    pub fn key_path(&self) -> String {
        self.tokens.join(".")
    }

    /// Build the single-branch tree this override contributes.
    pub fn to_branch(&self) -> NestedMap {
        branch_from_tokens(&self.tokens, self.value.clone())
    }
}

/// Upper-cased file stem of a config file name: `my_app.yaml` -> `MY_APP`.
pub fn env_prefix(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

/// Key segments for `var` under `prefix`, or `None` if it does not match.
///
/// Empty segments (from doubled underscores) are dropped.
pub fn token_path(var: &str, prefix: &str) -> Option<Vec<String>> {
    if prefix.is_empty() {
        return None;
    }
    let rest = var.strip_prefix(prefix)?.strip_prefix('_')?;
    let tokens: Vec<String> = rest
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect();
    if tokens.is_empty() { None } else { Some(tokens) }
}

/// Build a nested single-branch map with `value` as its leaf.
///
/// `tokens` must not be empty.
pub fn branch_from_tokens(tokens: &[String], value: Value) -> NestedMap {
    let mut branch = NestedMap::new();
    match tokens {
        [] => {}
        [leaf] => branch.set(leaf.clone(), value),
        [head, rest @ ..] => branch.set(head.clone(), branch_from_tokens(rest, value)),
    }
    branch
}

/// Parse the matching variables from `vars`, keeping their order.
pub fn parse_overrides<I>(prefix: &str, vars: I) -> Vec<EnvOverride>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(var, raw)| {
            let tokens = token_path(&var, prefix)?;
            Some(EnvOverride {
                value: sniff(&raw),
                var,
                tokens,
            })
        })
        .collect()
}

/// Merge each override into `target` in order. Returns the overrides applied.
pub fn apply_overrides<I>(target: &mut NestedMap, prefix: &str, vars: I) -> Vec<EnvOverride>
where
    I: IntoIterator<Item = (String, String)>,
{
    let overrides = parse_overrides(prefix, vars);
    for ov in &overrides {
        debug!(
            "Applying environment override {} -> {} = {}",
            ov.var,
            ov.key_path(),
            ov.value
        );
        target.update(&ov.to_branch());
    }
    overrides
}

/// The process environment, skipping entries that are not valid unicode.
pub fn process_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}
