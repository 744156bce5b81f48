//! The nested configuration tree.

use super::merge::merge_into;
use super::value::{Value, map_from_yaml};
use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use std::fmt;
use std::ops::{Add, AddAssign, Index};
use std::path::Path;
use tracing::info;

/// A tree of configuration values keyed by string.
///
/// Keys keep the order in which they were first inserted. Every nested
/// mapping is itself a `NestedMap`, so the whole tree can be walked with
/// [`NestedMap::attr`] / [`Value::attr`] or indexed with `map["a"]["b"]`.
///
/// A `NestedMap` has no internal synchronization. Sharing one between
/// threads requires external locking by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedMap {
    entries: IndexMap<String, Value>,
}

impl NestedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document whose root is a mapping.
    ///
    /// An empty document yields an empty map. Merge keys (`<<: *anchor`)
    /// are resolved before conversion.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        let mut parsed: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        parsed.apply_merge().map_err(|e| e.to_string())?;
        match parsed {
            serde_yaml::Value::Mapping(mapping) => map_from_yaml(mapping),
            serde_yaml::Value::Null => Ok(Self::new()),
            _ => Err("document root is not a mapping".to_string()),
        }
    }

    /// Load a YAML file and merge it into this map.
    ///
    /// Multiple files can be loaded; the last file loaded takes precedence
    /// over previously loaded ones.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Loading configuration file: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::InvalidData {
                ConfigError::invalid_content(path, "file is not valid UTF-8")
            } else {
                ConfigError::File {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut parsed: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        parsed.apply_merge().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let loaded = match parsed {
            serde_yaml::Value::Mapping(mapping) => {
                map_from_yaml(mapping).map_err(|reason| ConfigError::invalid_content(path, reason))?
            }
            serde_yaml::Value::Null => NestedMap::new(),
            _ => {
                return Err(ConfigError::invalid_content(
                    path,
                    "document root is not a mapping",
                ));
            }
        };

        self.update(&loaded);
        Ok(())
    }

    /// Merge `other` into this map. See [`merge_into`] for the rules.
    pub fn update(&mut self, other: &NestedMap) {
        merge_into(self, other);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Set a key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }

    /// Attribute-style read: fails on a missing key rather than defaulting.
    pub fn attr(&self, key: &str) -> Result<&Value> {
        self.entries
            .get(key)
            .ok_or_else(|| ConfigError::unknown_key(key))
    }

    /// Attribute-style write, equivalent to [`NestedMap::set`].
    pub fn set_attr(&mut self, key: &str, value: impl Into<Value>) {
        self.set(key, value);
    }

    /// Resolve a dotted key path such as `"server.http.port"`.
    ///
    /// The error names the path up to and including the first missing segment.
    pub fn lookup(&self, dotted: &str) -> Result<&Value> {
        let mut segments = dotted.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.attr(first)?;
        let mut walked = first.len();
        for segment in segments {
            walked += segment.len() + 1;
            current = current
                .attr(segment)
                .map_err(|_| ConfigError::unknown_key(&dotted[..walked]))?;
        }
        Ok(current)
    }

    /// Map at `key`, replacing whatever non-map value was there.
    pub(crate) fn child_map_mut(&mut self, key: &str) -> &mut NestedMap {
        let slot = self.entries.entry(key.to_string()).or_default();
        if !slot.is_map() {
            *slot = Value::Map(NestedMap::new());
        }
        match slot {
            Value::Map(map) => map,
            _ => unreachable!("slot holds a map after replacement"),
        }
    }
}

impl Index<&str> for NestedMap {
    type Output = Value;

    /// Panics on a missing key; use [`NestedMap::attr`] to get an error instead.
    fn index(&self, key: &str) -> &Value {
        match self.entries.get(key) {
            Some(value) => value,
            None => panic!("unknown configuration key: {}", key),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self {
            Value::Map(map) => &map[key],
            other => panic!(
                "unknown configuration key: {} ({} has no keys)",
                key,
                other.type_name()
            ),
        }
    }
}

/// `a + b` merges `b` into `a` and returns `a`.
///
/// The left operand is consumed and mutated; clone it first to keep the
/// original around.
impl Add<NestedMap> for NestedMap {
    type Output = NestedMap;

    fn add(mut self, other: NestedMap) -> NestedMap {
        self.update(&other);
        self
    }
}

impl Add<&NestedMap> for NestedMap {
    type Output = NestedMap;

    fn add(mut self, other: &NestedMap) -> NestedMap {
        self.update(other);
        self
    }
}

impl AddAssign<NestedMap> for NestedMap {
    fn add_assign(&mut self, other: NestedMap) {
        self.update(&other);
    }
}

impl AddAssign<&NestedMap> for NestedMap {
    fn add_assign(&mut self, other: &NestedMap) {
        self.update(other);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NestedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = NestedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for NestedMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a> IntoIterator for &'a NestedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for NestedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for NestedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl From<&NestedMap> for serde_json::Value {
    fn from(map: &NestedMap) -> Self {
        serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEST_CONFIG1: &str = "
configitem:
    subitem1: 1
    subitem2: 2
    subitem3: 3
";

    const TEST_CONFIG2: &str = "
configitem:
    subitem2: 4

another:
    item: string
";

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_then_update_overrides_by_key() {
        let temp = TempDir::new().unwrap();
        let mut config = NestedMap::new();
        config.load(write(&temp, "one.yaml", TEST_CONFIG1)).unwrap();
        config.load(write(&temp, "two.yaml", TEST_CONFIG2)).unwrap();

        let item = config.attr("configitem").unwrap().as_map().unwrap();
        assert_eq!(item.len(), 3);
        assert_eq!(item["subitem1"], 1i64);
        assert_eq!(item["subitem2"], 4i64);
        assert_eq!(item["subitem3"], 3i64);
        assert_eq!(config["another"]["item"], "string");
    }

    #[test]
    fn test_load_missing_file_is_file_error() {
        let temp = TempDir::new().unwrap();
        let mut config = NestedMap::new();
        let err = config.load(temp.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn test_load_malformed_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let mut config = NestedMap::new();
        let err = config
            .load(write(&temp, "bad.yaml", "key: [unclosed"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_non_mapping_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = NestedMap::new();
        let err = config
            .load(write(&temp, "list.yaml", "- a\n- b\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContent { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_load_empty_file_is_empty_map() {
        let temp = TempDir::new().unwrap();
        let mut config = NestedMap::new();
        config.load(write(&temp, "empty.yaml", "")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_load_invalid_utf8_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("binary.yaml");
        std::fs::write(&path, [0xff, 0xfe, b'a']).unwrap();

        let mut config = NestedMap::new();
        let err = config.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContent { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn test_merge_keys_are_resolved() {
        let content = "base: &b {host: h, port: 1}\nprod:\n  <<: *b\n  port: 2\n";
        let config = NestedMap::from_yaml_str(content).unwrap();
        let prod = config["prod"].as_map().unwrap();
        assert_eq!(prod["host"], "h");
        assert_eq!(prod["port"], 2i64);
        assert!(!prod.contains_key("<<"));
        assert_eq!(config["base"]["port"], 1i64);

        let temp = TempDir::new().unwrap();
        let mut loaded = NestedMap::new();
        loaded.load(write(&temp, "anchors.yaml", content)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_attr_missing_key_fails() {
        let config = NestedMap::from_yaml_str(TEST_CONFIG1).unwrap();
        let err = config.attr("nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { ref key } if key == "nope"));
    }

    #[test]
    fn test_set_attr_then_read_back() {
        let mut config = NestedMap::new();
        config.set_attr("testitem", "a test string");
        assert_eq!(*config.attr("testitem").unwrap(), "a test string");
    }

    #[test]
    fn test_lookup_dotted_path() {
        let config = NestedMap::from_yaml_str(TEST_CONFIG1).unwrap();
        assert_eq!(*config.lookup("configitem.subitem2").unwrap(), 2i64);

        let err = config.lookup("configitem.subitem9.deeper").unwrap_err();
        assert!(
            matches!(err, ConfigError::UnknownKey { ref key } if key == "configitem.subitem9")
        );
    }

    #[test]
    fn test_add_mutates_and_returns_left() {
        let left = NestedMap::from_yaml_str(TEST_CONFIG1).unwrap();
        let right = NestedMap::from_yaml_str(TEST_CONFIG2).unwrap();
        let combined = left + &right;
        assert_eq!(combined["configitem"]["subitem2"], 4i64);
        assert_eq!(combined["configitem"]["subitem1"], 1i64);
        assert_eq!(combined["configitem"]["subitem3"], 3i64);

        let mut acc = NestedMap::new();
        acc += right;
        assert_eq!(acc["another"]["item"], "string");
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut config: NestedMap = [("a", 1i64), ("b", 2), ("c", 3)].into_iter().collect();
        config.remove("b");
        let keys: Vec<_> = config.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_display_inline() {
        let config = NestedMap::from_yaml_str("a: 1\nb: {c: x}").unwrap();
        assert_eq!(config.to_string(), "{a: 1, b: {c: x}}");
    }

    #[test]
    #[should_panic(expected = "unknown configuration key")]
    fn test_index_missing_key_panics() {
        let config = NestedMap::new();
        let _ = &config["missing"];
    }
}
