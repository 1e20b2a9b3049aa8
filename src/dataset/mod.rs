// Dataset loading
// Reads the creature attribute CSV into typed records, normalizing the
// optional columns before anything downstream sees them.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use tracing::{debug, info};

use crate::{BestiaryError, Result};

/// One row of the source dataset.
///
/// The six base stats, the classification, and the two physical measurements
/// are guaranteed present by the dataset contract; `secondary_type` and
/// `percentage_male` are legitimately absent for many creatures.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureRecord {
    pub name: String,
    pub primary_type: String,
    pub secondary_type: Option<String>,
    pub classification: String,
    pub generation: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
    pub abilities: String,
    pub height_m: f64,
    pub weight_kg: f64,
    pub percentage_male: Option<f64>,
}

/// Load all records from a CSV file at `path`.
///
/// Fails with `StoreUnavailable`-style IO errors if the file is missing and
/// with `DataIntegrity` if a required field is absent or malformed. Callers
/// that want best-effort behavior should use [`parse_record`] per row instead.
#[inline]
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<CreatureRecord>> {
    let path = path.as_ref();
    debug!("Loading dataset from {}", path.display());

    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        BestiaryError::Config(format!(
            "Failed to open dataset '{}': {}",
            path.display(),
            e
        ))
    })?;

    let headers = header_index(reader.headers().map_err(|e| {
        BestiaryError::Config(format!("Failed to read CSV headers: {}", e))
    })?);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| BestiaryError::Config(format!("Failed to read CSV row {}: {}", row, e)))?;
        records.push(parse_record(&record, &headers, row)?);
    }

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read the CSV rows raw, so the indexer can skip individual bad rows while
/// still reporting which ones failed.
#[inline]
pub fn read_raw_rows<P: AsRef<Path>>(
    path: P,
) -> Result<(HashMap<String, usize>, Vec<StringRecord>)> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        BestiaryError::Config(format!(
            "Failed to open dataset '{}': {}",
            path.display(),
            e
        ))
    })?;

    let headers = header_index(reader.headers().map_err(|e| {
        BestiaryError::Config(format!("Failed to read CSV headers: {}", e))
    })?);

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| BestiaryError::Config(format!("Failed to read CSV rows: {}", e)))?;

    Ok((headers, rows))
}

/// Parse a single raw CSV row into a [`CreatureRecord`].
#[inline]
pub fn parse_record(
    record: &StringRecord,
    headers: &HashMap<String, usize>,
    row: usize,
) -> Result<CreatureRecord> {
    let view = RowView {
        record,
        headers,
        row,
    };

    Ok(CreatureRecord {
        name: view.required("name")?.to_string(),
        primary_type: view.required("type1")?.to_string(),
        secondary_type: view.optional("type2").map(str::to_string),
        // The source dataset ships with this column misspelled.
        classification: view
            .first_present(&["classification", "classfication"])?
            .to_string(),
        generation: view.parse("generation")?,
        hp: view.parse("hp")?,
        attack: view.parse("attack")?,
        defense: view.parse("defense")?,
        sp_attack: view.parse("sp_attack")?,
        sp_defense: view.parse("sp_defense")?,
        speed: view.parse("speed")?,
        abilities: view.required("abilities")?.to_string(),
        height_m: view.parse("height_m")?,
        weight_kg: view.parse("weight_kg")?,
        percentage_male: view.parse_optional("percentage_male")?,
    })
}

fn header_index(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect()
}

struct RowView<'a> {
    record: &'a StringRecord,
    headers: &'a HashMap<String, usize>,
    row: usize,
}

impl RowView<'_> {
    fn raw(&self, field: &str) -> Option<&str> {
        self.headers
            .get(field)
            .and_then(|&idx| self.record.get(idx))
            .map(str::trim)
    }

    fn missing(&self, field: &str, problem: &str) -> BestiaryError {
        BestiaryError::DataIntegrity {
            field: field.to_string(),
            row: self.row,
            problem: problem.to_string(),
        }
    }

    fn required(&self, field: &str) -> Result<&str> {
        match self.raw(field) {
            Some(value) if !value.is_empty() => Ok(value),
            Some(_) => Err(self.missing(field, "value is empty")),
            None => Err(self.missing(field, "column not present")),
        }
    }

    /// Absent column or empty value both count as "not there".
    fn optional(&self, field: &str) -> Option<&str> {
        self.raw(field).filter(|value| !value.is_empty())
    }

    fn first_present(&self, fields: &[&str]) -> Result<&str> {
        for field in fields {
            if let Some(value) = self.optional(field) {
                return Ok(value);
            }
        }
        Err(self.missing(fields[0], "column not present"))
    }

    fn parse<T>(&self, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(field)?;
        raw.parse()
            .map_err(|e| self.missing(field, &format!("invalid value '{}': {}", raw, e)))
    }

    fn parse_optional<T>(&self, field: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(field) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| self.missing(field, &format!("invalid value '{}': {}", raw, e))),
            None => Ok(None),
        }
    }
}
