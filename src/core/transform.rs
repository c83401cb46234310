use crate::domain::model::{CleanRecord, CleanTable, RawTable, COLUMNS};
use crate::utils::error::{EtlError, Result};
use regex::Regex;

/// Source prices are in USD-style units; the catalogue is published in
/// Rupiah. Kept as configuration, not a literal in the pipeline.
pub const DEFAULT_CURRENCY_RATE: f64 = 16000.0;

const INVALID_TITLES: [&str; 2] = ["unknown product", "none"];
const INVALID_PRICES: [&str; 2] = ["price unavailable", "none"];
const INVALID_RATINGS: [&str; 3] = ["not rated", "⭐ invalid rating / 5", "none"];
const MISSING_SIZES: [&str; 3] = ["NONE", "NONETYPE", "NAN"];

/// Validates and normalizes a raw scrape into a fully typed table.
///
/// The pipeline is a pure filter+map: it never adds rows, never reorders
/// surviving rows and holds no state between runs.
pub struct CleaningPipeline {
    currency_rate: f64,
    decimal_re: Regex,
    integer_re: Regex,
}

// One row mid-flight through the pipeline. Text fields are replaced by
// their typed counterparts as the steps progress.
#[derive(Debug, Default)]
struct WorkingRow {
    title: Option<String>,
    price_text: Option<String>,
    price: Option<f64>,
    rating_text: Option<String>,
    rating: Option<f64>,
    colors_text: Option<String>,
    colors: Option<i64>,
    size: Option<String>,
    gender: Option<String>,
    timestamp: Option<String>,
}

impl CleaningPipeline {
    pub fn new(currency_rate: f64) -> Result<Self> {
        Ok(Self {
            currency_rate,
            decimal_re: Regex::new(r"[\d.]+")?,
            integer_re: Regex::new(r"\d+")?,
        })
    }

    /// Cleans the raw table. Column passes run in a fixed order; later
    /// steps assume earlier ones already normalized their column. Any
    /// structural failure (an expected column absent from a non-empty
    /// table) degrades to an empty result instead of an error.
    pub fn clean(&self, raw: &RawTable) -> CleanTable {
        match self.clean_table(raw) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "Transformation failed, returning empty table");
                Vec::new()
            }
        }
    }

    fn clean_table(&self, raw: &RawTable) -> Result<CleanTable> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        // A column exists if at least one record carries the key, the
        // same way a frame built from mappings derives its columns.
        for column in COLUMNS {
            if !raw.iter().any(|record| record.has_column(column)) {
                return Err(EtlError::transform(format!(
                    "missing expected column '{column}'"
                )));
            }
        }

        let mut rows: Vec<WorkingRow> = raw
            .iter()
            .map(|record| WorkingRow {
                title: record.get("title").map(str::to_string),
                price_text: record.get("price").map(str::to_string),
                rating_text: record.get("rating").map(str::to_string),
                colors_text: record.get("colors").map(str::to_string),
                size: record.get("size").map(str::to_string),
                gender: record.get("gender").map(str::to_string),
                timestamp: record.get("timestamp").map(str::to_string),
                ..WorkingRow::default()
            })
            .collect();

        // 1. Placeholder titles.
        rows.retain(|row| !matches_any(row.title.as_deref(), &INVALID_TITLES));

        // 2. Placeholder prices.
        rows.retain(|row| !matches_any(row.price_text.as_deref(), &INVALID_PRICES));

        // 3. Price: strip everything but digits and dots, parse, convert.
        for row in &mut rows {
            row.price = row
                .price_text
                .as_deref()
                .and_then(parse_price_digits)
                .map(|value| value * self.currency_rate);
        }

        // 4. Rating: drop tombstones, then take the first decimal substring.
        rows.retain(|row| !matches_any(row.rating_text.as_deref(), &INVALID_RATINGS));
        for row in &mut rows {
            row.rating = row
                .rating_text
                .as_deref()
                .and_then(|text| self.decimal_re.find(text))
                .and_then(|m| m.as_str().parse::<f64>().ok());
        }

        // 5. Colors: first integer substring.
        for row in &mut rows {
            row.colors = row
                .colors_text
                .as_deref()
                .and_then(|text| self.integer_re.find(text))
                .and_then(|m| m.as_str().parse::<i64>().ok());
        }

        // 6. Size: trimmed upper-case, with stringified-null sentinels
        //    treated as missing.
        for row in &mut rows {
            row.size = row
                .size
                .take()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !MISSING_SIZES.contains(&s.as_str()));
        }

        // 7. Gender: trimmed lower-case.
        for row in &mut rows {
            row.gender = row.gender.take().map(|s| s.trim().to_lowercase());
        }

        // 8. Row completeness: one missing or unparsable field drops the
        //    whole row. 9. Dense reindexing is implicit in the Vec.
        Ok(rows.into_iter().filter_map(finish_row).collect())
    }
}

fn matches_any(value: Option<&str>, tombstones: &[&str]) -> bool {
    match value {
        Some(text) => tombstones.contains(&text.to_lowercase().as_str()),
        None => false,
    }
}

fn parse_price_digits(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok()
}

fn finish_row(row: WorkingRow) -> Option<CleanRecord> {
    Some(CleanRecord {
        title: row.title?,
        price: row.price?,
        rating: row.rating?,
        colors: row.colors?,
        size: row.size?,
        gender: row.gender?,
        timestamp: row.timestamp?,
    })
}
