use crate::error::{ProcessingError, Result};
use crate::readers::column_types::{parse_timestamp, ColumnPlan, ColumnTypes, Value};
use crate::utils::constants::{COMMA, DEFAULT_BUFFER_SIZE};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// A table whose rows are built from typed CSV fields.
pub trait TableRecord: Sized {
    /// Table name used in log lines.
    const TABLE: &'static str;

    fn column_types() -> ColumnTypes;

    fn from_row(row: &TypedRow<'_>) -> Result<Self>;
}

/// Generic typed CSV loader shared by every table.
pub struct TableReader {
    delimiter: u8,
    use_mmap: bool,
}

impl TableReader {
    pub fn new() -> Self {
        Self {
            delimiter: COMMA,
            use_mmap: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read every row of the file at `path`.
    pub fn read<T: TableRecord>(&self, path: &Path) -> Result<Vec<T>> {
        let source = path.display().to_string();
        let file = File::open(path)?;

        let records = if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from::<T, _>(&mmap[..], &source)?
        } else {
            let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            self.read_from::<T, _>(reader, &source)?
        };

        debug!("Loaded {} {} rows from {}", records.len(), T::TABLE, source);
        Ok(records)
    }

    /// Read rows from any reader; `source` names it in error messages.
    pub fn read_from<T: TableRecord, R: Read>(&self, reader: R, source: &str) -> Result<Vec<T>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let split = T::column_types().split();
        let plans: Vec<ColumnPlan> = headers.iter().map(|h| split.plan_for(h)).collect();
        let index = HeaderIndex::new(headers.iter());

        let mut records = Vec::new();
        let mut raw = csv::StringRecord::new();

        while csv_reader.read_record(&mut raw)? {
            let line = raw.position().map(|p| p.line()).unwrap_or(0);
            let mut values = Vec::with_capacity(plans.len());

            for ((plan, field), column) in plans.iter().zip(raw.iter()).zip(headers.iter()) {
                let value = plan.apply(field).map_err(|message| ProcessingError::Coercion {
                    file: source.to_string(),
                    line,
                    column: column.to_string(),
                    message,
                })?;
                values.push(value);
            }

            let row = TypedRow::new(&index, values, source, line);
            records.push(T::from_row(&row)?);
        }

        Ok(records)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Column name → position in a row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new<'h, I>(headers: I) -> Self
    where
        I: Iterator<Item = &'h str>,
    {
        let positions = headers
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

/// One CSV row after its fields went through the column plans.
pub struct TypedRow<'a> {
    index: &'a HeaderIndex,
    values: Vec<Value>,
    source: &'a str,
    line: u64,
}

impl<'a> TypedRow<'a> {
    pub fn new(index: &'a HeaderIndex, values: Vec<Value>, source: &'a str, line: u64) -> Self {
        Self {
            index,
            values,
            source,
            line,
        }
    }

    fn value(&self, column: &str) -> Option<&Value> {
        self.index.position(column).and_then(|i| self.values.get(i))
    }

    fn error(&self, column: &str, message: String) -> ProcessingError {
        ProcessingError::Coercion {
            file: self.source.to_string(),
            line: self.line,
            column: column.to_string(),
            message,
        }
    }

    fn required<T>(&self, column: &str, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| self.error(column, "required value is missing".to_string()))
    }

    /// Parse an unmapped text column on demand.
    fn parse_text<T>(&self, column: &str, text: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        text.parse::<T>()
            .map_err(|e| self.error(column, format!("cannot parse '{}': {}", text, e)))
    }

    fn mismatch(&self, column: &str, expected: &str, found: &Value) -> ProcessingError {
        self.error(column, format!("expected {}, found {:?}", expected, found))
    }

    pub fn opt_u8(&self, column: &str) -> Result<Option<u8>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::UInt8(v)) => Ok(Some(*v)),
            Some(Value::Text(text)) => self.parse_text(column, text).map(Some),
            Some(other) => Err(self.mismatch(column, "u8", other)),
        }
    }

    pub fn opt_u16(&self, column: &str) -> Result<Option<u16>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::UInt8(v)) => Ok(Some(u16::from(*v))),
            Some(Value::UInt16(v)) => Ok(Some(*v)),
            Some(Value::Text(text)) => self.parse_integral(column, text).map(Some),
            Some(other) => Err(self.mismatch(column, "u16", other)),
        }
    }

    pub fn opt_u32(&self, column: &str) -> Result<Option<u32>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::UInt8(v)) => Ok(Some(u32::from(*v))),
            Some(Value::UInt16(v)) => Ok(Some(u32::from(*v))),
            Some(Value::UInt32(v)) => Ok(Some(*v)),
            Some(Value::Text(text)) => self.parse_integral(column, text).map(Some),
            Some(other) => Err(self.mismatch(column, "u32", other)),
        }
    }

    /// Integers in inferred columns may be written as `1975.0`.
    fn parse_integral<T>(&self, column: &str, text: &str) -> Result<T>
    where
        T: FromStr + TryFrom<u64>,
        T::Err: std::fmt::Display,
    {
        if let Ok(v) = text.parse::<T>() {
            return Ok(v);
        }
        let float: f64 = self.parse_text(column, text)?;
        if float.fract() == 0.0 && float >= 0.0 {
            if let Ok(v) = T::try_from(float as u64) {
                return Ok(v);
            }
        }
        Err(self.error(column, format!("'{}' is not a valid integer", text)))
    }

    pub fn opt_f32(&self, column: &str) -> Result<Option<f32>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::Float32(v)) => Ok(Some(*v)),
            Some(Value::UInt8(v)) => Ok(Some(f32::from(*v))),
            Some(Value::UInt16(v)) => Ok(Some(f32::from(*v))),
            Some(Value::Text(text)) => self.parse_text(column, text).map(Some),
            Some(other) => Err(self.mismatch(column, "f32", other)),
        }
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::Text(text)) => Ok(Some(text.clone())),
            Some(other) => Err(self.mismatch(column, "text", other)),
        }
    }

    pub fn opt_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::Timestamp(ts)) => Ok(Some(*ts)),
            Some(Value::Text(text)) => parse_timestamp(text)
                .map(Some)
                .map_err(|e| self.error(column, e.to_string())),
            Some(other) => Err(self.mismatch(column, "timestamp", other)),
        }
    }

    pub fn opt_timezone(&self, column: &str) -> Result<Option<Tz>> {
        match self.value(column) {
            None | Some(Value::Missing) => Ok(None),
            Some(Value::TimeZone(tz)) => Ok(Some(*tz)),
            Some(Value::Text(text)) => text
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| self.error(column, format!("unknown time zone '{}'", text))),
            Some(other) => Err(self.mismatch(column, "time zone", other)),
        }
    }

    pub fn u8(&self, column: &str) -> Result<u8> {
        let value = self.opt_u8(column)?;
        self.required(column, value)
    }

    pub fn u16(&self, column: &str) -> Result<u16> {
        let value = self.opt_u16(column)?;
        self.required(column, value)
    }

    pub fn timestamp(&self, column: &str) -> Result<NaiveDateTime> {
        let value = self.opt_timestamp(column)?;
        self.required(column, value)
    }
}
