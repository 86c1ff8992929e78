use crate::models::{BuildingMetadata, MeterReading, SiteInfo, WeatherRecord};
use std::sync::Arc;

/// A weather row enriched with its site's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteWeather {
    pub weather: WeatherRecord,
    pub site: Option<Arc<SiteInfo>>,
}

impl SiteWeather {
    pub fn new(weather: WeatherRecord, site: Option<Arc<SiteInfo>>) -> Self {
        Self { weather, site }
    }
}

/// A reading row after the building and weather joins.
///
/// Right-hand rows are shared: every reading of a building points at the
/// same `BuildingMetadata`, every reading of a site-hour at the same
/// `SiteWeather`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub reading: MeterReading,
    pub building: Option<Arc<BuildingMetadata>>,
    pub weather: Option<Arc<SiteWeather>>,
}

impl JoinedRecord {
    pub fn new(reading: MeterReading, building: Option<Arc<BuildingMetadata>>) -> Self {
        Self {
            reading,
            building,
            weather: None,
        }
    }

    pub fn site_id(&self) -> Option<u8> {
        self.building.as_ref().map(|b| b.site_id)
    }

    pub fn weather_record(&self) -> Option<&WeatherRecord> {
        self.weather.as_ref().map(|w| &w.weather)
    }

    pub fn site(&self) -> Option<&SiteInfo> {
        self.weather.as_ref().and_then(|w| w.site.as_deref())
    }
}
