use async_trait::async_trait;
use redb::{Database, ReadableTable};
use std::path::Path;

use super::models::PageRecord;
use super::tables::PAGES;
use super::{RecordStore, StoreError};

const DB_FILE_NAME: &str = "qr-snap.redb";

/// Record store backed by an embedded redb database.
///
/// Rows are keyed by insertion ordinal so table order is insertion order.
/// redb runs one write transaction at a time, which makes each append a
/// single-writer step. A view increment still reads in one transaction and
/// writes in another.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database inside `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join(DB_FILE_NAME);
        let db = Database::create(db_path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PAGES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn decode(key: u64, bytes: &[u8]) -> Result<PageRecord, StoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| StoreError::corrupt(format!("pages[{key}]"), e))
    }
}

#[async_trait]
impl RecordStore for RedbStore {
    async fn load_all(&self) -> Result<Vec<PageRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAGES)?;

        let mut pages = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            pages.push(Self::decode(key.value(), value.value())?);
        }

        Ok(pages)
    }

    async fn append_and_save(&self, record: &PageRecord) -> Result<(), StoreError> {
        let data = rmp_serde::to_vec_named(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PAGES)?;
            let next = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            table.insert(next, data.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(page_id = %record.id, "Appended page record");
        Ok(())
    }

    async fn replace_all(&self, records: &[PageRecord]) -> Result<(), StoreError> {
        let encoded = records
            .iter()
            .map(rmp_serde::to_vec_named)
            .collect::<Result<Vec<_>, _>>()?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PAGES)?;
            let keys: Vec<u64> = table
                .iter()?
                .map(|r| r.map(|(k, _)| k.value()))
                .collect::<Result<Vec<_>, _>>()?;
            for key in keys {
                table.remove(key)?;
            }
            for (ordinal, data) in encoded.iter().enumerate() {
                table.insert(ordinal as u64, data.as_slice())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(records = records.len(), "Replaced page records");
        Ok(())
    }
}
