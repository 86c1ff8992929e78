//! Column typings of the four raw tables.

use crate::error::Result;
use crate::models::{BuildingMetadata, MeterReading, SiteInfo, WeatherField, WeatherRecord};
use crate::readers::column_types::{parse_timezone, ColumnTypes, DType};
use crate::readers::table_reader::{TableRecord, TypedRow};

impl TableRecord for MeterReading {
    const TABLE: &'static str = "meter reading";

    fn column_types() -> ColumnTypes {
        ColumnTypes::new()
            .dtype("row_id", DType::UInt32)
            .dtype("building_id", DType::UInt16)
            .dtype("meter", DType::UInt8)
            .date("timestamp")
            .dtype("meter_reading", DType::Float32)
    }

    fn from_row(row: &TypedRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.opt_u32("row_id")?,
            building_id: row.u16("building_id")?,
            meter: row.u8("meter")?,
            timestamp: row.timestamp("timestamp")?,
            meter_reading: row.opt_f32("meter_reading")?,
        })
    }
}

impl TableRecord for WeatherRecord {
    const TABLE: &'static str = "weather";

    fn column_types() -> ColumnTypes {
        WeatherField::MEASURED.iter().fold(
            ColumnTypes::new().dtype("site_id", DType::UInt8).date("timestamp"),
            |types, field| types.dtype(field.column_name(), DType::Float32),
        )
    }

    fn from_row(row: &TypedRow<'_>) -> Result<Self> {
        let mut record = WeatherRecord::empty(row.u8("site_id")?, row.timestamp("timestamp")?);
        for field in WeatherField::MEASURED {
            record.set(field, row.opt_f32(field.column_name())?);
        }
        Ok(record)
    }
}

impl TableRecord for BuildingMetadata {
    const TABLE: &'static str = "building";

    fn column_types() -> ColumnTypes {
        ColumnTypes::new()
            .dtype("site_id", DType::UInt8)
            .dtype("building_id", DType::UInt16)
            .dtype("primary_use", DType::Text)
    }

    fn from_row(row: &TypedRow<'_>) -> Result<Self> {
        Ok(Self {
            site_id: row.u8("site_id")?,
            building_id: row.u16("building_id")?,
            primary_use: row.opt_text("primary_use")?,
            square_feet: row.opt_u32("square_feet")?,
            year_built: row.opt_u16("year_built")?,
            floor_count: row.opt_u16("floor_count")?,
        })
    }
}

impl TableRecord for SiteInfo {
    const TABLE: &'static str = "site";

    fn column_types() -> ColumnTypes {
        ColumnTypes::new()
            .dtype("site_id", DType::UInt8)
            .converter("timezone", parse_timezone)
            .dtype("country_code", DType::Text)
            .dtype("location", DType::Text)
    }

    fn from_row(row: &TypedRow<'_>) -> Result<Self> {
        Ok(Self {
            site_id: row.u8("site_id")?,
            timezone: row.opt_timezone("timezone")?,
            country_code: row.opt_text("country_code")?,
            location: row.opt_text("location")?,
        })
    }
}
