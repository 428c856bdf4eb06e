//! Anonymous client identity

use uuid::Uuid;

use super::storage::{KeyValueStorage, Result};

pub const ANONYMOUS_ID_KEY: &str = "vocabmaster_anonymous_id";

/// Return the persisted anonymous id, creating one on first use
pub fn anonymous_id(storage: &dyn KeyValueStorage) -> Result<String> {
    if let Some(id) = storage.get(ANONYMOUS_ID_KEY).filter(|id| !id.trim().is_empty()) {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    storage.set(ANONYMOUS_ID_KEY, &id)?;
    log::info!("Created anonymous id {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;

    #[test]
    fn test_anonymous_id_is_stable() {
        let storage = MemoryStorage::new();
        let first = anonymous_id(&storage).unwrap();
        let second = anonymous_id(&storage).unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(storage.get(ANONYMOUS_ID_KEY), Some(first));
    }

    #[test]
    fn test_existing_id_is_reused() {
        let storage = MemoryStorage::new();
        storage.set(ANONYMOUS_ID_KEY, "legacy-id").unwrap();
        assert_eq!(anonymous_id(&storage).unwrap(), "legacy-id");
    }
}
