//! Layered YAML configuration.
//!
//! Builds one [`NestedMap`] from several layers, lowest precedence first:
//! 1. **Package** - `<base_dir>/config/<name>`
//! 2. **User** - `~/.config/<package>/<name>`
//! 3. **Working dir** - `$CWD/<name>`
//! 4. **Environment** - `<PREFIX>_<KEY>_<SUBKEY>=value`
//! 5. **Seeds** - values passed explicitly to the builder
//!
//! Explicit search paths replace layers 1-3; the first path listed wins.
//!
//! ## Merge Strategy
//! - Maps merge key-by-key, recursively
//! - Scalars and sequences are replaced
//! - A map arriving where a scalar was replaces the scalar (and vice versa)

pub mod env;
mod folders;
mod loader;
mod merge;
mod nested;
mod value;

pub use env::{EnvOverride, env_prefix};
pub use folders::DEFAULT_FOLDER_KEYWORD;
pub use loader::{ConfigResolver, ConfigTier, DEFAULT_CONFIG_NAME, ResolverBuilder, SearchPaths};
pub use merge::{merge_all, merge_into};
pub use nested::NestedMap;
pub use value::{Value, sniff};
