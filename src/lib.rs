//! Layered YAML configuration library.
//!
//! Locates, loads and merges YAML configuration files into a
//! [`NestedMap`] tree, with environment variable overrides and explicit
//! seed values on top.
//!
//! ```no_run
//! use yaconfig::ConfigResolver;
//!
//! let config = ConfigResolver::builder()
//!     .with_base_dir(yaconfig::package_dir!())
//!     .with_name("myapp.yaml")
//!     .build()?;
//! let port = config.lookup("server.port")?.as_i64();
//! # Ok::<(), yaconfig::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod paths;

pub use config::{ConfigResolver, NestedMap, ResolverBuilder, Value};
pub use error::{ConfigError, ErrorKind, Result};
