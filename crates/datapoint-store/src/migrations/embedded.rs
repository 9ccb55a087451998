//! Migrations are embedded at compile time using include_str!

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "001_records",
        sql: include_str!("../../migrations/001_records.sql"),
    },
    Migration {
        id: "002_record_timestamps",
        sql: include_str!("../../migrations/002_record_timestamps.sql"),
    },
];

pub fn get_migrations() -> &'static [Migration] {
    MIGRATIONS
}

/// Ids in application order
pub fn migration_ids() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|m| m.id).collect()
}
