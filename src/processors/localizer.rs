use crate::error::{ProcessingError, Result};
use crate::models::SiteWeather;
use chrono::TimeZone;
use std::collections::HashSet;
use tracing::debug;

/// Rewrites UTC weather timestamps as naive local site time.
#[derive(Debug, Clone, Default)]
pub struct TimestampLocalizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalizationStats {
    pub input_rows: usize,
    pub output_rows: usize,
    /// Rows dropped because two UTC hours mapped to the same local hour.
    pub collapsed_rows: usize,
}

impl TimestampLocalizer {
    pub fn new() -> Self {
        Self
    }

    /// Sort by (site, UTC timestamp), convert, then keep the last row of
    /// every duplicated (site, local timestamp).
    pub fn localize(&self, mut rows: Vec<SiteWeather>) -> Result<(Vec<SiteWeather>, LocalizationStats)> {
        let input_rows = rows.len();
        rows.sort_by_key(|r| r.weather.key());

        for row in rows.iter_mut() {
            let tz = row
                .site
                .as_ref()
                .and_then(|site| site.timezone)
                .ok_or_else(|| {
                    ProcessingError::MissingData(format!(
                        "no time zone for site {}",
                        row.weather.site_id
                    ))
                })?;
            row.weather.timestamp = tz.from_utc_datetime(&row.weather.timestamp).naive_local();
        }

        let mut seen = HashSet::with_capacity(rows.len());
        let mut kept: Vec<SiteWeather> = rows
            .into_iter()
            .rev()
            .filter(|r| seen.insert(r.weather.key()))
            .collect();
        kept.reverse();

        let stats = LocalizationStats {
            input_rows,
            output_rows: kept.len(),
            collapsed_rows: input_rows - kept.len(),
        };
        debug!(
            "Localized {} weather rows, collapsed {} duplicates",
            stats.output_rows, stats.collapsed_rows
        );
        Ok((kept, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SiteInfo, WeatherRecord};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    fn utc(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn row(site: &Arc<SiteInfo>, ts: NaiveDateTime, temp: f32) -> SiteWeather {
        let weather = WeatherRecord::builder(site.site_id, ts).air_temperature(temp).build();
        SiteWeather::new(weather, Some(Arc::clone(site)))
    }

    #[test]
    fn test_converts_to_local_time() -> Result<()> {
        let site = Arc::new(SiteInfo::new(0, chrono_tz::US::Eastern));
        let (rows, stats) = TimestampLocalizer::new().localize(vec![row(&site, utc(1, 1, 12), 1.0)])?;

        assert_eq!(rows[0].weather.timestamp, utc(1, 1, 7));
        assert_eq!(stats.collapsed_rows, 0);
        Ok(())
    }

    #[test]
    fn test_dst_fall_back_keeps_later_row() -> Result<()> {
        // 05:00 and 06:00 UTC on 2016-11-06 are both 01:00 in New York
        let site = Arc::new(SiteInfo::new(0, chrono_tz::US::Eastern));
        let rows = vec![
            row(&site, utc(11, 6, 6), 2.0),
            row(&site, utc(11, 6, 5), 1.0),
            row(&site, utc(11, 6, 7), 3.0),
        ];

        let (rows, stats) = TimestampLocalizer::new().localize(rows)?;

        assert_eq!(stats.input_rows, 3);
        assert_eq!(stats.collapsed_rows, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].weather.timestamp, utc(11, 6, 1));
        assert_eq!(rows[0].weather.air_temperature, Some(2.0));
        assert_eq!(rows[1].weather.timestamp, utc(11, 6, 2));
        Ok(())
    }

    #[test]
    fn test_sites_sorted_and_independent() -> Result<()> {
        let london = Arc::new(SiteInfo::new(1, chrono_tz::Europe::London));
        let eastern = Arc::new(SiteInfo::new(0, chrono_tz::US::Eastern));
        let rows = vec![row(&london, utc(7, 1, 12), 1.0), row(&eastern, utc(7, 1, 12), 2.0)];

        let (rows, _) = TimestampLocalizer::new().localize(rows)?;

        assert_eq!(rows[0].weather.key(), (0, utc(7, 1, 8)));
        assert_eq!(rows[1].weather.key(), (1, utc(7, 1, 13)));
        Ok(())
    }

    #[test]
    fn test_missing_time_zone_is_an_error() {
        let weather = WeatherRecord::empty(9, utc(1, 1, 0));
        let err = TimestampLocalizer::new()
            .localize(vec![SiteWeather::new(weather, None)])
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MissingData(_)));
    }
}
