//! Specialized collection types

pub use slotmap::{DefaultKey, Key, KeyData, SlotMap};

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<DefaultKey, T>;

/// Pack a slot map key into the raw `u64` carried by public handles
pub fn key_to_raw(key: DefaultKey) -> u64 {
    key.data().as_ffi()
}

/// Recover a slot map key from a raw handle value
///
/// Stale or foreign values produce a key that simply misses on lookup.
pub fn key_from_raw(raw: u64) -> DefaultKey {
    DefaultKey::from(KeyData::from_ffi(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_and_stale_lookup() {
        let mut map: HandleMap<&str> = HandleMap::new();
        let key = map.insert("mesh");
        let raw = key_to_raw(key);

        assert_eq!(map.get(key_from_raw(raw)), Some(&"mesh"));

        map.remove(key);
        map.insert("other");
        assert_eq!(map.get(key_from_raw(raw)), None);
    }
}
