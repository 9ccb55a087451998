#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = Connection::open_in_memory().unwrap();
    datapoint_store::migrations::apply_migrations(&mut conn).unwrap();

    assert_eq!(table_names(&conn), vec!["records", "schema_version"]);

    let recorded: Vec<String> = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(recorded, datapoint_store::migrations::migration_ids());
}

#[test]
fn test_records_primary_key_enforced() {
    let mut conn = Connection::open_in_memory().unwrap();
    datapoint_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO records (pk, sk, payload) VALUES ('u1#d1', 'a', '{}')",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO records (pk, sk, payload) VALUES ('u1#d1', 'a', '{}')",
        [],
    );
    assert!(dup.is_err());
}
