use crate::models::{BuildingMetadata, JoinedRecord, MeterReading, SiteInfo, SiteWeather, WeatherRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Hash-based left joins between the raw tables.
///
/// Every join keeps all left rows in their original order. When the right
/// table repeats a key the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct DataMerger;

impl DataMerger {
    pub fn new() -> Self {
        Self
    }

    /// Readings ⟕ buildings on `building_id`.
    pub fn merge_buildings(
        &self,
        readings: Vec<MeterReading>,
        buildings: &[BuildingMetadata],
    ) -> Vec<JoinedRecord> {
        let lookup: HashMap<u16, Arc<BuildingMetadata>> = buildings
            .iter()
            .map(|b| (b.building_id, Arc::new(b.clone())))
            .collect();

        let joined: Vec<JoinedRecord> = readings
            .into_iter()
            .map(|reading| {
                let building = lookup.get(&reading.building_id).cloned();
                JoinedRecord::new(reading, building)
            })
            .collect();

        debug!(
            "Building join: {} rows, {} matched",
            joined.len(),
            joined.iter().filter(|r| r.building.is_some()).count()
        );
        joined
    }

    /// Weather ⟕ sites on `site_id`.
    pub fn merge_sites(&self, weather: Vec<WeatherRecord>, sites: &[SiteInfo]) -> Vec<SiteWeather> {
        let lookup: HashMap<u8, Arc<SiteInfo>> = sites
            .iter()
            .map(|s| (s.site_id, Arc::new(s.clone())))
            .collect();

        weather
            .into_iter()
            .map(|w| {
                let site = lookup.get(&w.site_id).cloned();
                SiteWeather::new(w, site)
            })
            .collect()
    }

    /// Joined readings ⟕ site weather on `(site_id, timestamp)`. Returns
    /// the number of readings that found a weather row.
    pub fn merge_weather(&self, records: &mut [JoinedRecord], weather: Vec<SiteWeather>) -> usize {
        let lookup: HashMap<(u8, NaiveDateTime), Arc<SiteWeather>> = weather
            .into_iter()
            .map(|w| (w.weather.key(), Arc::new(w)))
            .collect();

        let mut matched = 0;
        for record in records.iter_mut() {
            record.weather = record
                .site_id()
                .and_then(|site| lookup.get(&(site, record.reading.timestamp)))
                .cloned();
            if record.weather.is_some() {
                matched += 1;
            }
        }

        debug!("Weather join: {} rows, {} matched", records.len(), matched);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn readings() -> Vec<MeterReading> {
        vec![
            MeterReading::new(0, 0, hour(0), 1.0),
            MeterReading::new(1, 0, hour(0), 2.0),
            MeterReading::new(7, 1, hour(1), 3.0),
            MeterReading::new(0, 1, hour(2), 4.0),
        ]
    }

    #[test]
    fn test_building_join_keeps_every_reading() {
        let buildings = vec![
            BuildingMetadata::new(0, 0).with_primary_use("Education"),
            BuildingMetadata::new(1, 1),
            // Duplicate key: the later row wins
            BuildingMetadata::new(0, 0).with_primary_use("Office"),
        ];

        let joined = DataMerger::new().merge_buildings(readings(), &buildings);

        assert_eq!(joined.len(), 4);
        assert_eq!(joined[0].building.as_ref().unwrap().primary_use.as_deref(), Some("Office"));
        assert_eq!(joined[1].site_id(), Some(1));
        assert_eq!(joined[2].building, None);
        assert_eq!(joined[3].reading.meter_reading, Some(4.0));
    }

    #[test]
    fn test_site_join_keeps_every_weather_row() {
        let weather = vec![WeatherRecord::empty(0, hour(0)), WeatherRecord::empty(5, hour(0))];
        let sites = vec![SiteInfo::new(0, chrono_tz::US::Eastern)];

        let merged = DataMerger::new().merge_sites(weather, &sites);

        assert_eq!(merged.len(), 2);
        assert!(merged[0].site.is_some());
        assert!(merged[1].site.is_none());
    }

    #[test]
    fn test_weather_join_by_site_and_hour() {
        let merger = DataMerger::new();
        let buildings = vec![BuildingMetadata::new(0, 0), BuildingMetadata::new(1, 1)];
        let mut joined = merger.merge_buildings(readings(), &buildings);

        let weather = vec![
            WeatherRecord::builder(0, hour(0)).air_temperature(10.0).build(),
            WeatherRecord::builder(1, hour(0)).air_temperature(20.0).build(),
            WeatherRecord::builder(0, hour(0)).air_temperature(11.0).build(),
        ];
        let site_weather = merger.merge_sites(weather, &[]);
        let matched = merger.merge_weather(&mut joined, site_weather);

        assert_eq!(joined.len(), 4);
        assert_eq!(matched, 2);
        assert_eq!(joined[0].weather_record().unwrap().air_temperature, Some(11.0));
        assert_eq!(joined[1].weather_record().unwrap().air_temperature, Some(20.0));
        // Unknown building, and known building at an hour without weather
        assert!(joined[2].weather.is_none());
        assert!(joined[3].weather.is_none());
    }

    #[test]
    fn test_shared_rows_are_not_copied() {
        let readings = vec![
            MeterReading::new(0, 0, hour(0), 1.0),
            MeterReading::new(0, 1, hour(0), 2.0),
        ];
        let joined = DataMerger::new().merge_buildings(readings, &[BuildingMetadata::new(0, 0)]);

        let a = joined[0].building.as_ref().unwrap();
        let b = joined[1].building.as_ref().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }
}
