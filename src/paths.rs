//! Path expansion and normalization for path-like configuration values.
//!
//! - Expands `$VAR` and `${VAR}` from the process environment (unknown
//!   variables are left untouched)
//! - Expands a leading `~` to the user's home directory
//! - Makes paths absolute against the current working directory
//! - Resolves `.` and `..` lexically (no filesystem I/O)

use regex_lite::{Captures, Regex};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("environment reference pattern is valid")
});

/// Replace `$VAR` / `${VAR}` references with their environment values.
pub fn expand_vars(input: &str) -> String {
    ENV_REF
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Expand a leading `~` or `~/` to the home directory.
///
/// `~user` forms are not supported and are returned unchanged.
pub fn expand_user(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Make `path` absolute against the current directory and normalize it.
pub fn absolutize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    normalize_path_components(&absolute)
}

/// Full treatment for a folder value: variables, then `~`, then absolute.
pub fn resolve_folder(value: &str) -> PathBuf {
    absolutize(&expand_user(&expand_vars(value)))
}

/// Normalize path components lexically (resolve `.` and `..`).
pub fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => components.push(Component::RootDir),
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(Component::ParentDir),
            },
            Component::Normal(name) => components.push(Component::Normal(name)),
        }
    }

    components.iter().collect()
}
