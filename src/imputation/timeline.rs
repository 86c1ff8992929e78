use crate::models::WeatherRecord;
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, HashSet};

/// Every hour from `start` to `end`, both ends included.
pub fn hourly_timeline(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut hours = Vec::new();
    let mut current = start;
    while current <= end {
        hours.push(current);
        current += Duration::hours(1);
    }
    hours
}

/// Site ids in order of first appearance.
pub fn distinct_sites(records: &[WeatherRecord]) -> Vec<u8> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.site_id)
        .filter(|site| seen.insert(*site))
        .collect()
}

/// The complete (site, hour) grid with observed rows joined in.
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Site-major, hour-minor.
    pub rows: Vec<WeatherRecord>,
    pub sites: Vec<u8>,
    pub hours: usize,
    /// Grid rows that found an observed weather row.
    pub matched_rows: usize,
}

impl Skeleton {
    pub fn added_rows(&self) -> usize {
        self.rows.len() - self.matched_rows
    }
}

/// Cross the global hourly range with every site and left-join the
/// observations by (site, timestamp). Off-grid observations are dropped;
/// for duplicate keys the last observation wins.
pub fn build_skeleton(records: &[WeatherRecord]) -> Skeleton {
    let sites = distinct_sites(records);
    let bounds = records
        .iter()
        .map(|r| r.timestamp)
        .fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, ts| match acc {
            None => Some((ts, ts)),
            Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
        });

    let timeline = match bounds {
        Some((start, end)) => hourly_timeline(start, end),
        None => Vec::new(),
    };

    let observed: HashMap<(u8, NaiveDateTime), &WeatherRecord> =
        records.iter().map(|r| (r.key(), r)).collect();

    let mut rows = Vec::with_capacity(sites.len() * timeline.len());
    let mut matched_rows = 0;
    for site in &sites {
        for ts in &timeline {
            match observed.get(&(*site, *ts)) {
                Some(record) => {
                    matched_rows += 1;
                    rows.push((*record).clone());
                }
                None => rows.push(WeatherRecord::empty(*site, *ts)),
            }
        }
    }

    Skeleton {
        rows,
        sites,
        hours: timeline.len(),
        matched_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_hourly_timeline_is_inclusive() {
        let hours = hourly_timeline(at(1, 22), at(2, 1));
        assert_eq!(hours, vec![at(1, 22), at(1, 23), at(2, 0), at(2, 1)]);
        assert!(hourly_timeline(at(2, 0), at(1, 0)).is_empty());
    }

    #[test]
    fn test_distinct_sites_keep_first_appearance() {
        let records = vec![
            WeatherRecord::empty(4, at(1, 0)),
            WeatherRecord::empty(1, at(1, 0)),
            WeatherRecord::empty(4, at(1, 1)),
        ];
        assert_eq!(distinct_sites(&records), vec![4, 1]);
    }

    #[test]
    fn test_skeleton_covers_global_range_for_every_site() {
        // Site 1 only reports at 03:00 but still receives the full range.
        let records = vec![
            WeatherRecord::builder(0, at(1, 0)).air_temperature(1.0).build(),
            WeatherRecord::builder(0, at(1, 5)).air_temperature(6.0).build(),
            WeatherRecord::builder(1, at(1, 3)).air_temperature(9.0).build(),
        ];

        let skeleton = build_skeleton(&records);

        assert_eq!(skeleton.hours, 6);
        assert_eq!(skeleton.rows.len(), 12);
        assert_eq!(skeleton.matched_rows, 3);
        assert_eq!(skeleton.added_rows(), 9);

        let mut keys: Vec<_> = skeleton.rows.iter().map(|r| r.key()).collect();
        keys.dedup();
        assert_eq!(keys.len(), 12);

        assert_eq!(skeleton.rows[6].key(), (1, at(1, 0)));
        assert_eq!(skeleton.rows[9].air_temperature, Some(9.0));
        assert_eq!(skeleton.rows[1].air_temperature, None);
    }

    #[test]
    fn test_empty_input_gives_empty_skeleton() {
        let skeleton = build_skeleton(&[]);
        assert!(skeleton.rows.is_empty());
        assert_eq!(skeleton.hours, 0);
    }
}
