//! Column-to-type mappings for the typed CSV loader.
//!
//! A [`ColumnTypes`] mapping is split into three disjoint buckets before
//! reading: plain dtype coercions, date parsing, and converter functions
//! that turn a text field into a richer value (a time zone, for example).

use crate::error::{ProcessingError, Result};
use crate::utils::constants::TIMESTAMP_FORMAT;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::fmt;

/// Field texts read as a missing value.
pub const NA_VALUES: [&str; 9] = ["", "NaN", "nan", "NA", "N/A", "null", "NULL", "None", "#N/A"];

/// A single parsed CSV field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Float32(f32),
    Text(String),
    Timestamp(NaiveDateTime),
    TimeZone(Tz),
}

/// Narrow storage types applied by direct coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Text,
}

impl DType {
    pub fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
        let invalid = |e: &dyn fmt::Display| format!("cannot coerce '{}' to {:?}: {}", raw, self, e);
        match self {
            DType::UInt8 => raw.parse::<u8>().map(Value::UInt8).map_err(|e| invalid(&e)),
            DType::UInt16 => raw.parse::<u16>().map(Value::UInt16).map_err(|e| invalid(&e)),
            DType::UInt32 => raw.parse::<u32>().map(Value::UInt32).map_err(|e| invalid(&e)),
            DType::Float32 => raw.parse::<f32>().map(Value::Float32).map_err(|e| invalid(&e)),
            DType::Text => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// Turns a non-missing field into a value.
pub type Converter = fn(&str) -> Result<Value>;

#[derive(Clone, Copy)]
pub enum ColumnType {
    Dtype(DType),
    ParseDate,
    Converter(Converter),
}

impl fmt::Debug for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Dtype(dtype) => write!(f, "Dtype({:?})", dtype),
            ColumnType::ParseDate => f.write_str("ParseDate"),
            ColumnType::Converter(_) => f.write_str("Converter"),
        }
    }
}

/// Ordered column name → type mapping. Re-declaring a column replaces it.
#[derive(Debug, Clone, Default)]
pub struct ColumnTypes {
    entries: Vec<(&'static str, ColumnType)>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dtype(self, name: &'static str, dtype: DType) -> Self {
        self.with(name, ColumnType::Dtype(dtype))
    }

    pub fn date(self, name: &'static str) -> Self {
        self.with(name, ColumnType::ParseDate)
    }

    pub fn converter(self, name: &'static str, converter: Converter) -> Self {
        self.with(name, ColumnType::Converter(converter))
    }

    fn with(mut self, name: &'static str, column_type: ColumnType) -> Self {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = column_type,
            None => self.entries.push((name, column_type)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into the dtype, date and converter buckets.
    pub fn split(&self) -> SplitColumnTypes {
        let mut split = SplitColumnTypes::default();
        for (name, column_type) in &self.entries {
            match column_type {
                ColumnType::Dtype(dtype) => split.dtypes.push((*name, *dtype)),
                ColumnType::ParseDate => split.parse_dates.push(*name),
                ColumnType::Converter(converter) => split.converters.push((*name, *converter)),
            }
        }
        split
    }
}

#[derive(Default)]
pub struct SplitColumnTypes {
    pub dtypes: Vec<(&'static str, DType)>,
    pub parse_dates: Vec<&'static str>,
    pub converters: Vec<(&'static str, Converter)>,
}

impl SplitColumnTypes {
    /// How a header column is read. Unmapped columns stay text.
    pub fn plan_for(&self, column: &str) -> ColumnPlan {
        if let Some((_, dtype)) = self.dtypes.iter().find(|(n, _)| *n == column) {
            ColumnPlan::Coerce(*dtype)
        } else if self.parse_dates.iter().any(|n| *n == column) {
            ColumnPlan::ParseDate
        } else if let Some((_, converter)) = self.converters.iter().find(|(n, _)| *n == column) {
            ColumnPlan::Convert(*converter)
        } else {
            ColumnPlan::Inferred
        }
    }
}

#[derive(Clone, Copy)]
pub enum ColumnPlan {
    Coerce(DType),
    ParseDate,
    Convert(Converter),
    Inferred,
}

impl ColumnPlan {
    pub fn apply(&self, raw: &str) -> std::result::Result<Value, String> {
        if NA_VALUES.contains(&raw) {
            return Ok(Value::Missing);
        }
        match self {
            ColumnPlan::Coerce(dtype) => dtype.coerce(raw),
            ColumnPlan::ParseDate => parse_timestamp(raw)
                .map(Value::Timestamp)
                .map_err(|e| e.to_string()),
            ColumnPlan::Convert(converter) => converter(raw).map_err(|e| e.to_string()),
            ColumnPlan::Inferred => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, the `T`-separated form, or a bare date.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid timestamp: '{}'", raw)))
}

/// Converter: IANA time-zone name → [`Tz`].
pub fn parse_timezone(raw: &str) -> Result<Value> {
    raw.trim()
        .parse::<Tz>()
        .map(Value::TimeZone)
        .map_err(|_| ProcessingError::InvalidTimeZone(raw.to_string()))
}
