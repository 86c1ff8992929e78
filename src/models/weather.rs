use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric weather columns, measured and derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherField {
    AirTemperature,
    CloudCoverage,
    DewTemperature,
    PrecipDepth1Hr,
    SeaLevelPressure,
    WindDirection,
    WindSpeed,
    RelativeHumidity,
    AirTempF,
    FeelsLikeTemp,
}

impl WeatherField {
    /// Columns present in the raw weather tables.
    pub const MEASURED: [WeatherField; 7] = [
        WeatherField::AirTemperature,
        WeatherField::CloudCoverage,
        WeatherField::DewTemperature,
        WeatherField::PrecipDepth1Hr,
        WeatherField::SeaLevelPressure,
        WeatherField::WindDirection,
        WeatherField::WindSpeed,
    ];

    /// Columns added by the feels-like stage.
    pub const DERIVED: [WeatherField; 3] = [
        WeatherField::RelativeHumidity,
        WeatherField::AirTempF,
        WeatherField::FeelsLikeTemp,
    ];

    /// Every numeric column in output order.
    pub const ALL: [WeatherField; 10] = [
        WeatherField::AirTemperature,
        WeatherField::CloudCoverage,
        WeatherField::DewTemperature,
        WeatherField::PrecipDepth1Hr,
        WeatherField::SeaLevelPressure,
        WeatherField::WindDirection,
        WeatherField::WindSpeed,
        WeatherField::RelativeHumidity,
        WeatherField::AirTempF,
        WeatherField::FeelsLikeTemp,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            WeatherField::AirTemperature => "air_temperature",
            WeatherField::CloudCoverage => "cloud_coverage",
            WeatherField::DewTemperature => "dew_temperature",
            WeatherField::PrecipDepth1Hr => "precip_depth_1_hr",
            WeatherField::SeaLevelPressure => "sea_level_pressure",
            WeatherField::WindDirection => "wind_direction",
            WeatherField::WindSpeed => "wind_speed",
            WeatherField::RelativeHumidity => "relative_humidity",
            WeatherField::AirTempF => "air_temp_f",
            WeatherField::FeelsLikeTemp => "feels_like_temp",
        }
    }

    pub fn is_derived(&self) -> bool {
        Self::DERIVED.contains(self)
    }
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One hourly observation from a site's weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub site_id: u8,
    pub timestamp: NaiveDateTime,

    pub air_temperature: Option<f32>,
    pub cloud_coverage: Option<f32>,
    pub dew_temperature: Option<f32>,
    pub precip_depth_1_hr: Option<f32>,
    pub sea_level_pressure: Option<f32>,
    pub wind_direction: Option<f32>,
    pub wind_speed: Option<f32>,

    // Derived by the feels-like stage
    pub relative_humidity: Option<f32>,
    pub air_temp_f: Option<f32>,
    pub feels_like_temp: Option<f32>,
}

impl WeatherRecord {
    /// A row with every weather field missing.
    pub fn empty(site_id: u8, timestamp: NaiveDateTime) -> Self {
        Self {
            site_id,
            timestamp,
            air_temperature: None,
            cloud_coverage: None,
            dew_temperature: None,
            precip_depth_1_hr: None,
            sea_level_pressure: None,
            wind_direction: None,
            wind_speed: None,
            relative_humidity: None,
            air_temp_f: None,
            feels_like_temp: None,
        }
    }

    pub fn builder(site_id: u8, timestamp: NaiveDateTime) -> WeatherRecordBuilder {
        WeatherRecordBuilder {
            record: Self::empty(site_id, timestamp),
        }
    }

    pub fn key(&self) -> (u8, NaiveDateTime) {
        (self.site_id, self.timestamp)
    }

    pub fn get(&self, field: WeatherField) -> Option<f32> {
        match field {
            WeatherField::AirTemperature => self.air_temperature,
            WeatherField::CloudCoverage => self.cloud_coverage,
            WeatherField::DewTemperature => self.dew_temperature,
            WeatherField::PrecipDepth1Hr => self.precip_depth_1_hr,
            WeatherField::SeaLevelPressure => self.sea_level_pressure,
            WeatherField::WindDirection => self.wind_direction,
            WeatherField::WindSpeed => self.wind_speed,
            WeatherField::RelativeHumidity => self.relative_humidity,
            WeatherField::AirTempF => self.air_temp_f,
            WeatherField::FeelsLikeTemp => self.feels_like_temp,
        }
    }

    pub fn set(&mut self, field: WeatherField, value: Option<f32>) {
        let slot = match field {
            WeatherField::AirTemperature => &mut self.air_temperature,
            WeatherField::CloudCoverage => &mut self.cloud_coverage,
            WeatherField::DewTemperature => &mut self.dew_temperature,
            WeatherField::PrecipDepth1Hr => &mut self.precip_depth_1_hr,
            WeatherField::SeaLevelPressure => &mut self.sea_level_pressure,
            WeatherField::WindDirection => &mut self.wind_direction,
            WeatherField::WindSpeed => &mut self.wind_speed,
            WeatherField::RelativeHumidity => &mut self.relative_humidity,
            WeatherField::AirTempF => &mut self.air_temp_f,
            WeatherField::FeelsLikeTemp => &mut self.feels_like_temp,
        };
        *slot = value;
    }
}

pub struct WeatherRecordBuilder {
    record: WeatherRecord,
}

impl WeatherRecordBuilder {
    pub fn value(mut self, field: WeatherField, value: f32) -> Self {
        self.record.set(field, Some(value));
        self
    }

    pub fn air_temperature(self, value: f32) -> Self {
        self.value(WeatherField::AirTemperature, value)
    }

    pub fn dew_temperature(self, value: f32) -> Self {
        self.value(WeatherField::DewTemperature, value)
    }

    pub fn wind_speed(self, value: f32) -> Self {
        self.value(WeatherField::WindSpeed, value)
    }

    pub fn build(self) -> WeatherRecord {
        self.record
    }
}
