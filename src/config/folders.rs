//! Folder validation for path-like configuration values.

use super::nested::NestedMap;
use super::value::Value;
use crate::error::{ConfigError, Result};
use crate::paths::resolve_folder;
use std::path::PathBuf;
use tracing::{debug, info};

/// Default substring identifying folder-valued keys.
pub const DEFAULT_FOLDER_KEYWORD: &str = "folder";

impl NestedMap {
    /// Check that every folder named in the tree exists.
    ///
    /// Folder values are string leaves whose key contains `keyword`. Each one
    /// has `$VAR` and `~` expanded, is made absolute, and is written back in
    /// place. Nested maps are always descended into, whatever their key.
    ///
    /// Missing folders are created (with parents) when `create` is set;
    /// otherwise the first missing one fails with [`ConfigError::MissingFolder`].
    /// Returns the folders created, in tree order.
    pub fn check_folders(&mut self, keyword: &str, create: bool) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        self.check_folders_into(keyword, create, &mut created)?;
        Ok(created)
    }

    fn check_folders_into(
        &mut self,
        keyword: &str,
        create: bool,
        created: &mut Vec<PathBuf>,
    ) -> Result<()> {
        for (key, value) in self.iter_mut() {
            match value {
                Value::Map(child) => child.check_folders_into(keyword, create, created)?,
                Value::String(raw) if key.contains(keyword) => {
                    let folder = resolve_folder(raw);
                    *raw = folder.to_string_lossy().into_owned();
                    debug!("Checking presence of {}", folder.display());

                    if folder.is_dir() {
                        continue;
                    }
                    if !create {
                        return Err(ConfigError::MissingFolder { path: folder });
                    }

                    info!("Creating folder {}", folder.display());
                    std::fs::create_dir_all(&folder).map_err(|source| {
                        ConfigError::CreateFolder {
                            path: folder.clone(),
                            source,
                        }
                    })?;
                    created.push(folder);
                }
                _ => {}
            }
        }
        Ok(())
    }
}
