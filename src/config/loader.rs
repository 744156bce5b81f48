//! Configuration resolver with layered precedence.
//!
//! Loads configuration from multiple layers and merges them key-by-key,
//! lowest precedence first:
//! 1. Config files found in the search paths (last listed path first)
//! 2. Environment variables prefixed with the upper-cased file stem
//! 3. Explicit seed values

use super::env::{EnvOverride, apply_overrides, env_prefix, process_env};
use super::nested::NestedMap;
use super::value::Value;
use crate::error::Result;
use std::ops::{Add, AddAssign, Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// File name looked up in each search path when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "config.yaml";

/// Directory of the crate that expands this macro.
///
/// Pass it to [`ResolverBuilder::with_base_dir`] so default search paths are
/// derived from the calling package rather than from this library.
#[macro_export]
macro_rules! package_dir {
    () => {
        ::std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
    };
}

/// Where a search directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTier {
    /// `<base_dir>/config/` next to the calling package (lowest default priority)
    Package,
    /// `~/.config/<package>/`
    User,
    /// The current working directory (highest default priority)
    WorkingDir,
    /// A directory passed explicitly by the caller
    Explicit,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Package => write!(f, "package"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::WorkingDir => write!(f, "working directory"),
            ConfigTier::Explicit => write!(f, "explicit"),
        }
    }
}

/// Directories searched for the config file, highest precedence first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPaths {
    dirs: Vec<(ConfigTier, PathBuf)>,
}

impl SearchPaths {
    /// Use the given directories. The first one listed wins.
    pub fn explicit<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs
                .into_iter()
                .map(|dir| (ConfigTier::Explicit, dir.into()))
                .collect(),
        }
    }

    /// Derive the default candidates for a package living in `base_dir`.
    ///
    /// Candidates that do not exist are kept; they are skipped at load time.
    pub fn discover(base_dir: &Path, package: Option<&str>) -> Self {
        let mut dirs = vec![(
            ConfigTier::WorkingDir,
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        )];

        match (dirs::home_dir(), package) {
            (Some(home), Some(package)) if !package.is_empty() => {
                dirs.push((ConfigTier::User, home.join(".config").join(package)));
            }
            _ => debug!("No user config directory candidate"),
        }

        dirs.push((ConfigTier::Package, base_dir.join("config")));
        Self { dirs }
    }

    /// Tagged directories in the order given, highest precedence first.
    pub fn entries(&self) -> &[(ConfigTier, PathBuf)] {
        &self.dirs
    }

    /// Directories in the order given, highest precedence first.
    pub fn highest_first(&self) -> impl DoubleEndedIterator<Item = &PathBuf> {
        self.dirs.iter().map(|(_, dir)| dir)
    }

    /// Tagged directories in load order, lowest precedence first.
    pub fn load_order(&self) -> impl Iterator<Item = &(ConfigTier, PathBuf)> {
        self.dirs.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Builder for [`ConfigResolver`].
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    paths: Option<Vec<PathBuf>>,
    name: String,
    base_dir: Option<PathBuf>,
    package: Option<String>,
    seeds: NestedMap,
    env: Option<Vec<(String, String)>>,
    use_env: bool,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            paths: None,
            name: DEFAULT_CONFIG_NAME.to_string(),
            base_dir: None,
            package: None,
            seeds: NestedMap::new(),
            env: None,
            use_env: true,
        }
    }
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search these directories instead of the defaults, first one winning.
    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Append one directory with lower precedence than those already given.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.get_or_insert_with(Vec::new).push(path.into());
        self
    }

    /// Config file name looked up in each directory.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Directory of the calling package, used to derive default search paths.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Package name for `~/.config/<package>/`; defaults to the base dir name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Top-level value applied after files and environment.
    pub fn with_seed(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.seeds.set(key, value);
        self
    }

    pub fn with_seeds(mut self, seeds: NestedMap) -> Self {
        self.seeds.extend(seeds);
        self
    }

    /// Read overrides from these variables instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Do not apply environment overrides at all.
    pub fn without_environment(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Resolve the configuration.
    ///
    /// Fails on the first file that exists but cannot be read or parsed.
    /// Finding no file at all is logged but not an error.
    pub fn build(self) -> Result<ConfigResolver> {
        let (search_paths, base_dir, package) = match self.paths {
            Some(paths) => (SearchPaths::explicit(paths), self.base_dir, self.package),
            None => {
                let base_dir = self.base_dir.unwrap_or_else(|| {
                    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
                });
                let package = self.package.or_else(|| {
                    base_dir
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                });
                debug!(
                    "No config paths specified, deriving defaults from {}",
                    base_dir.display()
                );
                let search_paths = SearchPaths::discover(&base_dir, package.as_deref());
                (search_paths, Some(base_dir), package)
            }
        };

        let mut config = NestedMap::new();
        let mut loaded_files = Vec::new();

        for (tier, dir) in search_paths.load_order() {
            let file = dir.join(&self.name);
            debug!("Trying to load {} ({})", file.display(), tier);
            if file.exists() {
                info!(tier = %tier, "Loading {}", file.display());
                config.load(&file)?;
                loaded_files.push(file);
            }
        }

        if loaded_files.is_empty() {
            error!(
                critical = true,
                "No configuration file loaded (looked for {} in {} locations)",
                self.name,
                search_paths.len()
            );
        } else {
            info!("Loaded {} configuration file(s)", loaded_files.len());
        }

        let env_overrides = if self.use_env {
            let prefix = env_prefix(&self.name);
            match self.env {
                Some(vars) => apply_overrides(&mut config, &prefix, vars),
                None => apply_overrides(&mut config, &prefix, process_env()),
            }
        } else {
            Vec::new()
        };

        for (key, value) in self.seeds {
            config.set(key, value);
        }

        Ok(ConfigResolver {
            config,
            name: self.name,
            base_dir,
            package,
            search_paths,
            loaded_files,
            env_overrides,
        })
    }
}

/// The fully resolved configuration for one application.
///
/// Dereferences to [`NestedMap`], so after construction it is used like any
/// other configuration tree and can still be updated or combined.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config: NestedMap,
    name: String,
    base_dir: Option<PathBuf>,
    package: Option<String>,
    search_paths: SearchPaths,
    loaded_files: Vec<PathBuf>,
    env_overrides: Vec<EnvOverride>,
}

impl ConfigResolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Resolve with every default: `config.yaml` in the default search paths
    /// derived from the current directory, plus process environment overrides.
    pub fn new() -> Result<Self> {
        ResolverBuilder::new().build()
    }

    /// Resolve `name` from explicit directories, first one winning.
    pub fn with_paths<I, P>(paths: I, name: &str) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ResolverBuilder::new()
            .with_paths(paths)
            .with_name(name)
            .build()
    }

    /// The config file name searched for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base directory the default search paths were derived from, if they were.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Files merged, in load order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    pub fn files_loaded(&self) -> usize {
        self.loaded_files.len()
    }

    /// Environment overrides applied, in application order.
    pub fn env_overrides(&self) -> &[EnvOverride] {
        &self.env_overrides
    }

    /// Prefix environment variables need to override this configuration.
    pub fn env_prefix(&self) -> String {
        env_prefix(&self.name)
    }

    pub fn config(&self) -> &NestedMap {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NestedMap {
        &mut self.config
    }

    /// Consume the resolver and return the configuration tree.
    pub fn into_inner(self) -> NestedMap {
        self.config
    }
}

impl Deref for ConfigResolver {
    type Target = NestedMap;

    fn deref(&self) -> &NestedMap {
        &self.config
    }
}

impl DerefMut for ConfigResolver {
    fn deref_mut(&mut self) -> &mut NestedMap {
        &mut self.config
    }
}

impl Add<&NestedMap> for ConfigResolver {
    type Output = ConfigResolver;

    fn add(mut self, other: &NestedMap) -> ConfigResolver {
        self.config.update(other);
        self
    }
}

impl Add<ConfigResolver> for ConfigResolver {
    type Output = ConfigResolver;

    fn add(mut self, other: ConfigResolver) -> ConfigResolver {
        self.config.update(&other.config);
        self
    }
}

impl AddAssign<&NestedMap> for ConfigResolver {
    fn add_assign(&mut self, other: &NestedMap) {
        self.config.update(other);
    }
}

impl From<ConfigResolver> for NestedMap {
    fn from(resolver: ConfigResolver) -> Self {
        resolver.config
    }
}
