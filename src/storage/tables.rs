use redb::TableDefinition;

/// Page records: insertion ordinal -> PageRecord (msgpack)
pub const PAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("pages");
