use crate::models::Record;
use crate::storage::{RecordInterface, StoreError};

/// Creates or updates a record by its natural key, scoped to its asset
/// manager.
///
/// An empty search result means the record is new; any match means the
/// incoming record replaces the stored one wholesale.
pub async fn upsert<R>(interface: &dyn RecordInterface<R>, record: R) -> Result<R, StoreError>
where
    R: Record + Clone + Send + Sync + 'static
{
    let ids = vec![record.natural_key().to_string()];
    let existing = interface.search(record.asset_manager_id(), &ids).await?;

    if existing.is_empty() {
        interface.create(record).await
    } else {
        interface.update(record).await
    }
}
