//! SQLite-backed `RecordStore`
//!
//! Records live in `records(pk, sk, payload)`; `payload` is the JSON object
//! of non-key attributes. The sort-key predicate is compiled to SQL over
//! `sk`, whose BINARY collation gives byte-wise ordering.

use std::path::Path;
use std::sync::Mutex;

use datapoint_core::expr::{
    KeyPredicate, LOWER_VALUE_PLACEHOLDER, UPPER_VALUE_PLACEHOLDER, VALUE_PLACEHOLDER,
};
use datapoint_core::model::{RangeOperator, Record, RecordKey};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Value};

use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned, serialization_error, Result};
use crate::migrations::apply_migrations;
use crate::record_store::{QueryPage, RangeQuery, RecordStore};

pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) a database file and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// `Persistence` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Self::from_connection(conn)
    }

    /// # Errors
    ///
    /// `Persistence` if a migration fails.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Wrap an existing connection, applying pending migrations.
    ///
    /// # Errors
    ///
    /// `Persistence` if a migration fails.
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// SQL fragment and bound values for a sort-key predicate
fn predicate_sql(predicate: &KeyPredicate) -> (String, Vec<String>) {
    let single = || predicate.value(VALUE_PLACEHOLDER).unwrap_or_default().to_string();
    match predicate.operator() {
        RangeOperator::GreaterThan => ("sk > ?".into(), vec![single()]),
        RangeOperator::Equal => ("sk = ?".into(), vec![single()]),
        RangeOperator::LessOrEqual => ("sk <= ?".into(), vec![single()]),
        RangeOperator::LessThan => ("sk < ?".into(), vec![single()]),
        RangeOperator::GreaterOrEqual => ("sk >= ?".into(), vec![single()]),
        RangeOperator::Between => {
            let lower = predicate.value(LOWER_VALUE_PLACEHOLDER).unwrap_or_default();
            let upper = predicate.value(UPPER_VALUE_PLACEHOLDER).unwrap_or_default();
            (
                "sk BETWEEN ? AND ?".into(),
                vec![lower.to_string(), upper.to_string()],
            )
        }
        // substr/length count characters, so the comparison is a true prefix test
        RangeOperator::BeginsWith => {
            let prefix = single();
            (
                "substr(sk, 1, length(?)) = ?".into(),
                vec![prefix.clone(), prefix],
            )
        }
    }
}

fn decode_row(pk: &str, sk: String, payload: &str) -> Result<Record> {
    let payload: Map<String, Value> =
        serde_json::from_str(payload).map_err(|e| serialization_error(pk, &sk, e))?;
    Ok(Record::new(RecordKey::new(pk, sk), payload))
}

impl RecordStore for SqliteRecordStore {
    fn query(&self, query: &RangeQuery) -> Result<QueryPage> {
        let mut sql = String::from("SELECT sk, payload FROM records WHERE pk = ?");
        let mut params = vec![query.partition_key.clone()];

        if let Some(predicate) = &query.predicate {
            let (clause, values) = predicate_sql(predicate);
            sql.push_str(" AND ");
            sql.push_str(&clause);
            params.extend(values);
        }

        let forward = query.direction.is_forward();
        if let Some(start) = query
            .exclusive_start_key
            .as_ref()
            .filter(|k| k.partition_key == query.partition_key)
        {
            sql.push_str(if forward { " AND sk > ?" } else { " AND sk < ?" });
            params.push(start.sort_key.clone());
        }

        sql.push_str(if forward {
            " ORDER BY sk ASC"
        } else {
            " ORDER BY sk DESC"
        });
        // SQLite limits are signed 64-bit; anything larger reads as a real
        sql.push_str(&format!(" LIMIT {}", sql_limit(query.limit)));

        let conn = self.conn.lock().map_err(|_| lock_poisoned("query"))?;
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let raw: Vec<(String, String)> = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let rows = raw
            .into_iter()
            .map(|(sk, payload)| decode_row(&query.partition_key, sk, &payload))
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryPage::from_overshot(rows, query.limit))
    }

    fn put(&self, record: &Record) -> Result<Record> {
        let payload = serde_json::to_string(&record.payload)
            .map_err(|e| serialization_error(record.partition_key(), record.sort_key(), e))?;

        let conn = self.conn.lock().map_err(|_| lock_poisoned("put"))?;
        conn.execute(
            "INSERT INTO records (pk, sk, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(pk, sk) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            rusqlite::params![
                record.partition_key(),
                record.sort_key(),
                payload,
                chrono::Utc::now().timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(record.clone())
    }
}

/// One row past the page, clamped to what SQLite accepts as an integer
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX)
}
