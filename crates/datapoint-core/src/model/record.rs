use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{DataPointError, Result};

/// Separator between owner and name in a partition key
pub const PARTITION_KEY_SEPARATOR: char = '#';

/// Attribute name of the partition key on the wire and in the store
pub const PARTITION_KEY_ATTRIBUTE: &str = "PK";
/// Attribute name of the sort key on the wire and in the store
pub const SORT_KEY_ATTRIBUTE: &str = "SK";

/// Build the partition key for an owner's named series: `owner#name`.
///
/// # Errors
///
/// `InvalidInput` if either component is empty.
///
/// ```
/// use datapoint_core::model::partition_key;
///
/// assert_eq!(partition_key("u1", "d1").unwrap(), "u1#d1");
/// assert!(partition_key("", "d1").is_err());
/// ```
pub fn partition_key(owner: &str, name: &str) -> Result<String> {
    if owner.is_empty() {
        return Err(DataPointError::EmptyKeyComponent { field: "owner" }.into());
    }
    if name.is_empty() {
        return Err(DataPointError::EmptyKeyComponent { field: "name" }.into());
    }
    Ok(format!("{owner}{PARTITION_KEY_SEPARATOR}{name}"))
}

/// Composite primary key of a record
///
/// Ordering is partition first, then the sort key's byte-wise string order,
/// which is the order the store scans in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(rename = "PK")]
    pub partition_key: String,
    #[serde(rename = "SK")]
    pub sort_key: String,
}

impl RecordKey {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// A stored record: key plus opaque JSON payload
///
/// Serializes flat, the way the store's items look on the wire:
/// `{"PK": "u1#d1", "SK": "2024-01-01T00:00:00Z", "value": 3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub key: RecordKey,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Record {
    /// Key attributes inside `payload` are dropped; the key is authoritative.
    pub fn new(key: RecordKey, mut payload: Map<String, Value>) -> Self {
        payload.remove(PARTITION_KEY_ATTRIBUTE);
        payload.remove(SORT_KEY_ATTRIBUTE);
        Self { key, payload }
    }

    pub fn partition_key(&self) -> &str {
        &self.key.partition_key
    }

    pub fn sort_key(&self) -> &str {
        &self.key.sort_key
    }
}

/// Scan direction over the sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact string `ASC` scans forward; anything else scans
    /// backward.
    pub fn from_wire(s: &str) -> Self {
        if s == "ASC" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

impl Serialize for SortDirection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // An explicit null means the argument was left unset
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.map_or_else(SortDirection::default, |s| SortDirection::from_wire(&s)))
    }
}
