use crate::config::ImputationSettings;
use crate::error::Result;
use crate::imputation::iterative::{ImputeSummary, IterativeImputer};
use crate::imputation::scaler::StandardScaler;
use crate::imputation::timeline::build_skeleton;
use crate::models::{WeatherField, WeatherRecord};
use chrono::{Datelike, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Statistics of a weather imputation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub sites: usize,
    pub hours: usize,
    pub added_rows: usize,
    pub dropped_rows: usize,
    pub imputed_cells: usize,
    pub rounds: usize,
    pub converged: bool,
    /// Weather columns with no observed values.
    pub empty_columns: Vec<String>,
}

impl ImputationReport {
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} sites x {} hours = {} rows ({} input, {} added, {} off-grid dropped)\n",
            self.sites, self.hours, self.output_rows, self.input_rows, self.added_rows, self.dropped_rows
        );
        out.push_str(&format!(
            "{} cells imputed in {} rounds ({})",
            self.imputed_cells,
            self.rounds,
            if self.converged { "converged" } else { "not converged" }
        ));
        if !self.empty_columns.is_empty() {
            out.push_str(&format!("\nLeft empty: {}", self.empty_columns.join(", ")));
        }
        out
    }
}

impl fmt::Display for ImputationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

// Helper features appended after the weather columns
const CALENDAR_FEATURES: usize = 3;

/// Completes a weather table to every (site, hour) pair and fills missing
/// weather values by iterative regression.
#[derive(Debug, Clone)]
pub struct WeatherImputer {
    settings: ImputationSettings,
    reference_time: NaiveDateTime,
}

impl WeatherImputer {
    pub fn new(settings: ImputationSettings) -> Self {
        Self {
            settings,
            reference_time: Utc::now().naive_utc(),
        }
    }

    /// Timestamps enter the model as seconds before this instant.
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn impute(&self, records: &[WeatherRecord]) -> Result<(Vec<WeatherRecord>, ImputationReport)> {
        let skeleton = build_skeleton(records);
        let mut rows = skeleton.rows;

        let mut report = ImputationReport {
            input_rows: records.len(),
            output_rows: rows.len(),
            sites: skeleton.sites.len(),
            hours: skeleton.hours,
            added_rows: rows.len() - skeleton.matched_rows,
            dropped_rows: records.len().saturating_sub(skeleton.matched_rows),
            converged: true,
            ..Default::default()
        };

        if rows.is_empty() {
            return Ok((rows, report));
        }

        let mut columns = self.feature_columns(&rows);
        let scaler = StandardScaler::fit_transform(&mut columns);

        let summary: ImputeSummary = IterativeImputer::new()
            .with_max_iter(self.settings.max_iter)
            .with_tolerance(self.settings.tolerance)
            .fit_transform(&mut columns)?;

        scaler.inverse_transform(&mut columns);

        // Columns 0 and 1 are timestamp and site; they come back from the grid
        for (offset, field) in WeatherField::ALL.iter().enumerate() {
            let column = &columns[offset + 2];
            for (row, value) in rows.iter_mut().zip(column) {
                row.set(*field, value.is_finite().then_some(*value as f32));
            }
        }

        report.imputed_cells = summary.imputed_cells;
        report.rounds = summary.rounds;
        report.converged = summary.converged;
        report.empty_columns = summary
            .skipped_columns
            .iter()
            .filter_map(|&j| j.checked_sub(2))
            .filter_map(|offset| WeatherField::ALL.get(offset))
            .map(|field| field.column_name().to_string())
            .collect();

        info!(
            "Imputed {} weather cells over {} rows in {} rounds",
            report.imputed_cells, report.output_rows, report.rounds
        );

        Ok((rows, report))
    }

    /// `[seconds, site, weather fields.., hour, weekday, month]`, `NaN` for missing.
    fn feature_columns(&self, rows: &[WeatherRecord]) -> Vec<Vec<f64>> {
        let width = 2 + WeatherField::ALL.len() + CALENDAR_FEATURES;
        let mut columns: Vec<Vec<f64>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();

        for row in rows {
            let seconds = (self.reference_time - row.timestamp).num_milliseconds() as f64 / 1000.0;
            columns[0].push(seconds);
            columns[1].push(f64::from(row.site_id));
            for (offset, field) in WeatherField::ALL.iter().enumerate() {
                columns[offset + 2].push(row.get(*field).map_or(f64::NAN, f64::from));
            }
            let base = 2 + WeatherField::ALL.len();
            columns[base].push(f64::from(row.timestamp.hour()));
            columns[base + 1].push(f64::from(row.timestamp.weekday().num_days_from_monday()));
            columns[base + 2].push(f64::from(row.timestamp.month()));
        }

        columns
    }
}
