use crate::models::JoinedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Join coverage of one output table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub total_records: usize,
    pub with_building: usize,
    pub with_weather: usize,
    pub with_site: usize,
    pub with_feels_like: usize,
    pub unmatched_buildings: BTreeSet<u16>,
}

impl MergeReport {
    pub fn from_records(records: &[JoinedRecord]) -> Self {
        let mut report = MergeReport {
            total_records: records.len(),
            ..Default::default()
        };

        for record in records {
            match record.building {
                Some(_) => report.with_building += 1,
                None => {
                    report.unmatched_buildings.insert(record.reading.building_id);
                }
            }
            if let Some(weather) = record.weather_record() {
                report.with_weather += 1;
                if weather.feels_like_temp.is_some() {
                    report.with_feels_like += 1;
                }
            }
            if record.site().is_some() {
                report.with_site += 1;
            }
        }

        report
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total_records as f64
        }
    }

    pub fn generate_summary(&self, table: &str) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== {} Merge Report ===\n", table));
        summary.push_str(&format!("Total Records: {}\n", self.total_records));
        summary.push_str(&format!(
            "With Building: {} ({:.1}%)\n",
            self.with_building,
            self.percent(self.with_building)
        ));
        summary.push_str(&format!(
            "With Weather: {} ({:.1}%)\n",
            self.with_weather,
            self.percent(self.with_weather)
        ));
        summary.push_str(&format!(
            "With Site Info: {} ({:.1}%)\n",
            self.with_site,
            self.percent(self.with_site)
        ));
        if self.with_feels_like > 0 {
            summary.push_str(&format!(
                "With Feels-Like: {} ({:.1}%)\n",
                self.with_feels_like,
                self.percent(self.with_feels_like)
            ));
        }

        if !self.unmatched_buildings.is_empty() {
            let shown: Vec<String> = self
                .unmatched_buildings
                .iter()
                .take(10)
                .map(|b| b.to_string())
                .collect();
            summary.push_str(&format!(
                "\nUnknown Buildings: {} (first: {})\n",
                self.unmatched_buildings.len(),
                shown.join(", ")
            ));
        }

        summary
    }
}
