//! Whole-collection JSON codec on top of [`KeyValueStorage`].

use super::kv::{KeyValueStorage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads and decodes the collection stored under `key`.
///
/// An absent key yields an empty collection.
///
/// # Errors
/// - `StorageError::Decode` when the stored text is not a JSON array of `T`.
pub fn read_collection<T, S>(storage: &S, key: &str) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStorage + ?Sized,
{
    let Some(raw) = storage.get_item(key)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|source| StorageError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Encodes `items` and overwrites the value under `key`.
pub fn write_collection<T, S>(storage: &S, key: &str, items: &[T]) -> StorageResult<()>
where
    T: Serialize,
    S: KeyValueStorage + ?Sized,
{
    let encoded = serde_json::to_string(items).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    storage.set_item(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::{read_collection, write_collection};
    use crate::storage::{KeyValueStorage, MemoryKeyValueStorage, StorageError};

    #[test]
    fn absent_key_reads_as_empty() {
        let storage = MemoryKeyValueStorage::new();
        let items: Vec<String> = read_collection(&storage, "contacts").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn written_collection_reads_back_in_order() {
        let storage = MemoryKeyValueStorage::new();
        let items = vec!["b".to_string(), "a".to_string()];
        write_collection(&storage, "groups", &items).unwrap();

        let loaded: Vec<String> = read_collection(&storage, "groups").unwrap();
        assert_eq!(loaded, items);
    }

    #[test]
    fn non_array_text_is_a_decode_error() {
        let storage = MemoryKeyValueStorage::new();
        storage.set_item("contacts", "{not json").unwrap();

        let err = read_collection::<String, _>(&storage, "contacts").unwrap_err();
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == "contacts"));
    }
}
