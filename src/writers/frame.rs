use crate::models::{JoinedRecord, WeatherField};
use crate::utils::constants::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Typed values of one output column; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    UInt8(Vec<Option<u8>>),
    UInt16(Vec<Option<u16>>),
    UInt32(Vec<Option<u32>>),
    Float32(Vec<Option<f32>>),
    Text(Vec<Option<String>>),
    Timestamp(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::UInt8(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::UInt16(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::UInt32(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Float32(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Timestamp(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }
}

// Timestamps go out as text so pandas can parse them back
impl Serialize for ColumnData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ColumnData::UInt8(v) => v.serialize(serializer),
            ColumnData::UInt16(v) => v.serialize(serializer),
            ColumnData::UInt32(v) => v.serialize(serializer),
            ColumnData::Float32(v) => v.serialize(serializer),
            ColumnData::Text(v) => v.serialize(serializer),
            ColumnData::Timestamp(v) => serializer.collect_seq(
                v.iter()
                    .map(|ts| ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: &str, data: ColumnData) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }
}

/// An ordered set of equally long named columns.
///
/// Serializes as a map from column name to value list, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten joined readings into output columns.
    ///
    /// `row_id` and `meter_reading` appear only when some reading carries
    /// them; the derived weather columns only with `include_feels_like`.
    pub fn from_joined(records: &[JoinedRecord], include_feels_like: bool) -> Self {
        let mut frame = DataFrame::new();

        if records.iter().any(|r| r.reading.row_id.is_some()) {
            frame.push_column("row_id", ColumnData::UInt32(records.iter().map(|r| r.reading.row_id).collect()));
        }
        frame.push_column(
            "building_id",
            ColumnData::UInt16(records.iter().map(|r| Some(r.reading.building_id)).collect()),
        );
        frame.push_column(
            "meter",
            ColumnData::UInt8(records.iter().map(|r| Some(r.reading.meter)).collect()),
        );
        frame.push_column(
            "timestamp",
            ColumnData::Timestamp(records.iter().map(|r| Some(r.reading.timestamp)).collect()),
        );
        if records.iter().any(|r| r.reading.meter_reading.is_some()) {
            frame.push_column(
                "meter_reading",
                ColumnData::Float32(records.iter().map(|r| r.reading.meter_reading).collect()),
            );
        }

        frame.push_column("site_id", ColumnData::UInt8(records.iter().map(|r| r.site_id()).collect()));
        frame.push_column(
            "primary_use",
            ColumnData::Text(
                records
                    .iter()
                    .map(|r| r.building.as_ref().and_then(|b| b.primary_use.clone()))
                    .collect(),
            ),
        );
        frame.push_column(
            "square_feet",
            ColumnData::UInt32(records.iter().map(|r| r.building.as_ref().and_then(|b| b.square_feet)).collect()),
        );
        frame.push_column(
            "year_built",
            ColumnData::UInt16(records.iter().map(|r| r.building.as_ref().and_then(|b| b.year_built)).collect()),
        );
        frame.push_column(
            "floor_count",
            ColumnData::UInt16(records.iter().map(|r| r.building.as_ref().and_then(|b| b.floor_count)).collect()),
        );

        let fields: Vec<WeatherField> = WeatherField::ALL
            .into_iter()
            .filter(|f| include_feels_like || !f.is_derived())
            .collect();
        for field in fields {
            frame.push_column(
                field.column_name(),
                ColumnData::Float32(
                    records
                        .iter()
                        .map(|r| r.weather_record().and_then(|w| w.get(field)))
                        .collect(),
                ),
            );
        }

        frame.push_column(
            "timezone",
            ColumnData::Text(
                records
                    .iter()
                    .map(|r| r.site().and_then(|s| s.timezone_name()).map(str::to_string))
                    .collect(),
            ),
        );
        frame.push_column(
            "country_code",
            ColumnData::Text(records.iter().map(|r| r.site().and_then(|s| s.country_code.clone())).collect()),
        );
        frame.push_column(
            "location",
            ColumnData::Text(records.iter().map(|r| r.site().and_then(|s| s.location.clone())).collect()),
        );

        frame
    }

    /// Append a column; replaces an existing column of the same name.
    pub fn push_column(&mut self, name: &str, data: ColumnData) {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => self.columns.push(Column::new(name, data)),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

impl Serialize for DataFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.name, &column.data)?;
        }
        map.end()
    }
}
