use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column names of the scraped dataset, in output order.
pub const COLUMNS: [&str; 7] = [
    "title",
    "price",
    "rating",
    "colors",
    "size",
    "gender",
    "timestamp",
];

/// One product card as scraped, before any validation.
///
/// Modelled as a mapping rather than a struct on purpose: a card whose
/// details block is missing yields an EMPTY map (no keys at all), while a
/// card whose details block is present but incomplete yields a map with
/// every key and `None` values for the absent fields. The cleaning pipeline
/// relies on that distinction when it checks for expected columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub fields: HashMap<String, Option<String>>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Option<String>) {
        self.fields.insert(key.to_string(), value);
    }

    /// Value of a field, flattened: absent key and present-but-null both
    /// come back as `None`. Use [`has_column`](Self::has_column) when the
    /// difference matters.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered scrape output, page order then within-page card order.
pub type RawTable = Vec<RawRecord>;

/// One validated, fully typed product row. Exists only if every field
/// survived the cleaning pipeline; there are no nullable fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub title: String,
    pub price: f64,
    pub rating: f64,
    pub colors: i64,
    pub size: String,
    pub gender: String,
    pub timestamp: String,
}

/// Ordered cleaned output; row order is the surviving raw order.
pub type CleanTable = Vec<CleanRecord>;
