//! Deep merge for configuration trees.
//!
//! Implements key-by-key merging where later layers override earlier ones.
//! Sequences and scalars are replaced entirely, not concatenated.

use super::nested::NestedMap;
use super::value::Value;

/// Deep merge `overlay` into `base`, mutating `base` in place.
///
/// - Map values are merged recursively. If `base` holds anything other than a
///   map at that key, it is discarded and replaced by an empty map first.
/// - Every other value (including null) overwrites unconditionally.
/// - Keys are never removed, only overwritten.
///
/// # Example
/// ```
/// use yaconfig::{NestedMap, Value};
/// use yaconfig::config::merge_into;
///
/// let mut base = NestedMap::new();
/// base.set("port", 8080);
/// base.set("host", "localhost");
///
/// let mut overlay = NestedMap::new();
/// overlay.set("port", 9000);
///
/// merge_into(&mut base, &overlay);
/// assert_eq!(base["port"], Value::Integer(9000));
/// assert_eq!(base["host"], Value::from("localhost"));
/// ```
pub fn merge_into(base: &mut NestedMap, overlay: &NestedMap) {
    for (key, overlay_value) in overlay.iter() {
        match overlay_value {
            Value::Map(overlay_map) => merge_into(base.child_map_mut(key), overlay_map),
            other => base.set(key.clone(), other.clone()),
        }
    }
}

/// Merge multiple maps in order, with later maps taking precedence.
///
/// Equivalent to folding `merge_into` over the list.
pub fn merge_all<'a>(maps: impl IntoIterator<Item = &'a NestedMap>) -> NestedMap {
    maps.into_iter().fold(NestedMap::new(), |mut acc, map| {
        merge_into(&mut acc, map);
        acc
    })
}
