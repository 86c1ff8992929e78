use crate::error::{ProcessingError, Result};
use crate::imputation::bayesian_ridge::{BayesianRidge, GramStatistics};
use crate::utils::constants::{DEFAULT_IMPUTER_MAX_ITER, DEFAULT_IMPUTER_TOLERANCE};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Outcome of one imputation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputeSummary {
    pub rounds: usize,
    pub converged: bool,
    pub imputed_cells: usize,
    /// Columns with no observed value; left missing.
    pub skipped_columns: Vec<usize>,
}

/// Round-robin multivariate imputation over a column-major matrix.
///
/// Missing cells are `NaN`. Each round regresses every incomplete column on
/// all other usable columns and overwrites its missing cells with the
/// predictions.
#[derive(Debug, Clone)]
pub struct IterativeImputer {
    max_iter: usize,
    tolerance: f64,
    estimator: BayesianRidge,
}

impl IterativeImputer {
    pub fn new() -> Self {
        Self {
            max_iter: DEFAULT_IMPUTER_MAX_ITER,
            tolerance: DEFAULT_IMPUTER_TOLERANCE,
            estimator: BayesianRidge::new(),
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn fit_transform(&self, columns: &mut [Vec<f64>]) -> Result<ImputeSummary> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(ProcessingError::Imputation(format!(
                "column {} has {} rows, expected {}",
                bad,
                columns[bad].len(),
                n_rows
            )));
        }

        let masks: Vec<Vec<bool>> = columns
            .iter()
            .map(|c| c.iter().map(|v| v.is_nan()).collect())
            .collect();
        let missing_counts: Vec<usize> = masks
            .iter()
            .map(|m| m.iter().filter(|missing| **missing).count())
            .collect();

        let (usable, skipped_columns): (Vec<usize>, Vec<usize>) =
            (0..columns.len()).partition(|&j| n_rows > 0 && missing_counts[j] < n_rows);

        let mut order: Vec<usize> = usable
            .iter()
            .copied()
            .filter(|&j| missing_counts[j] > 0)
            .collect();
        order.sort_by_key(|&j| missing_counts[j]);

        let imputed_cells: usize = order.iter().map(|&j| missing_counts[j]).sum();

        if order.is_empty() {
            return Ok(ImputeSummary {
                rounds: 0,
                converged: true,
                imputed_cells: 0,
                skipped_columns,
            });
        }

        let max_abs = usable
            .iter()
            .flat_map(|&j| columns[j].iter().copied().filter(|v| !v.is_nan()))
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let threshold = self.tolerance * max_abs;

        for &j in &order {
            let fill = median(&columns[j]);
            columns[j].iter_mut().filter(|v| v.is_nan()).for_each(|v| *v = fill);
        }

        let mut rounds = 0;
        let mut converged = false;

        for round in 1..=self.max_iter {
            rounds = round;
            let previous: Vec<Vec<f64>> = usable.iter().map(|&j| columns[j].clone()).collect();

            for &target in &order {
                let neighbors: Vec<usize> = usable.iter().copied().filter(|&j| j != target).collect();
                let stats = self.accumulate(columns, &neighbors, target, &masks[target]);
                let model = self.estimator.fit(&stats).map_err(|e| {
                    ProcessingError::Imputation(format!("column {}: {}", target, e))
                })?;

                let predictions: Vec<(usize, f64)> = masks[target]
                    .par_iter()
                    .enumerate()
                    .filter(|(_, missing)| **missing)
                    .map(|(i, _)| {
                        let value = model.intercept
                            + neighbors
                                .iter()
                                .zip(model.coef.iter())
                                .map(|(&j, c)| columns[j][i] * c)
                                .sum::<f64>();
                        (i, value)
                    })
                    .collect();

                if let Some((i, _)) = predictions.iter().find(|(_, v)| !v.is_finite()) {
                    return Err(ProcessingError::Imputation(format!(
                        "non-finite prediction for column {} at row {}",
                        target, i
                    )));
                }
                for (i, value) in predictions {
                    columns[target][i] = value;
                }
            }

            let change = (0..n_rows)
                .into_par_iter()
                .map(|i| {
                    usable
                        .iter()
                        .zip(previous.iter())
                        .map(|(&j, prev)| (columns[j][i] - prev[i]).abs())
                        .sum::<f64>()
                })
                .reduce(|| 0.0, f64::max);

            debug!("Imputation round {}: change {:.6} (threshold {:.6})", round, change, threshold);

            if change < threshold {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "Imputation did not converge after {} rounds (tolerance {})",
                self.max_iter, self.tolerance
            );
        }

        Ok(ImputeSummary {
            rounds,
            converged,
            imputed_cells,
            skipped_columns,
        })
    }

    /// Gram statistics of `[neighbors.., target]` over the rows where the
    /// target was originally observed.
    fn accumulate(
        &self,
        columns: &[Vec<f64>],
        neighbors: &[usize],
        target: usize,
        target_missing: &[bool],
    ) -> GramStatistics {
        let index: Vec<usize> = neighbors.iter().copied().chain(std::iter::once(target)).collect();
        let d = index.len();

        let (n, sums, products) = target_missing
            .par_iter()
            .enumerate()
            .filter(|(_, missing)| !**missing)
            .fold(
                || (0usize, vec![0.0; d], vec![0.0; d * d]),
                |(mut n, mut sums, mut products), (i, _)| {
                    n += 1;
                    for a in 0..d {
                        let za = columns[index[a]][i];
                        sums[a] += za;
                        for b in a..d {
                            products[a * d + b] += za * columns[index[b]][i];
                        }
                    }
                    (n, sums, products)
                },
            )
            .reduce(
                || (0usize, vec![0.0; d], vec![0.0; d * d]),
                |(n1, mut s1, mut p1), (n2, s2, p2)| {
                    s1.iter_mut().zip(s2).for_each(|(a, b)| *a += b);
                    p1.iter_mut().zip(p2).for_each(|(a, b)| *a += b);
                    (n1 + n2, s1, p1)
                },
            );

        GramStatistics::from_packed(n, &sums, &products)
    }
}

impl Default for IterativeImputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of the observed (non-NaN) values; the two middle values are
/// averaged for an even count.
pub fn median(values: &[f64]) -> f64 {
    let mut observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        return f64::NAN;
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        (observed[mid - 1] + observed[mid]) / 2.0
    } else {
        observed[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, f64::NAN, 1.0, 2.0, 3.0]), 2.5);
        assert!(median(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_fills_linear_gaps() -> Result<()> {
        let x: Vec<f64> = (0..40).map(|i| i as f64 / 10.0).collect();
        let mut y: Vec<f64> = x.iter().map(|v| 1.0 + 2.0 * v).collect();
        y[5] = f64::NAN;
        y[20] = f64::NAN;
        let mut columns = vec![x, y];

        let summary = IterativeImputer::new().fit_transform(&mut columns)?;

        assert_eq!(summary.imputed_cells, 2);
        assert!(summary.skipped_columns.is_empty());
        assert!((columns[1][5] - 2.0).abs() < 1e-2, "got {}", columns[1][5]);
        assert!((columns[1][20] - 5.0).abs() < 1e-2, "got {}", columns[1][20]);
        Ok(())
    }

    #[test]
    fn test_observed_cells_are_untouched() -> Result<()> {
        let mut columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.5, f64::NAN, 1.4, 2.1, f64::NAN, 3.2],
            vec![f64::NAN, 9.0, 8.0, 7.5, 6.0, 5.5],
        ];
        let original = columns.clone();

        IterativeImputer::new().fit_transform(&mut columns)?;

        for (col, orig) in columns.iter().zip(&original) {
            for (v, o) in col.iter().zip(orig) {
                assert!(v.is_finite());
                if !o.is_nan() {
                    assert_eq!(v, o);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_all_missing_column_is_skipped() -> Result<()> {
        let mut columns = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![f64::NAN; 4],
            vec![2.0, f64::NAN, 6.0, 8.0],
        ];

        let summary = IterativeImputer::new().fit_transform(&mut columns)?;

        assert_eq!(summary.skipped_columns, vec![1]);
        assert!(columns[1].iter().all(|v| v.is_nan()));
        assert!(columns[2][1].is_finite());
        Ok(())
    }

    #[test]
    fn test_round_cap_returns_last_estimates() -> Result<()> {
        let mut columns = vec![
            vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0, 8.0],
            vec![2.1, f64::NAN, 6.2, 7.9, f64::NAN, 12.1, 13.8, 16.2],
            vec![f64::NAN, 0.4, 0.9, f64::NAN, 1.1, 1.6, 1.4, 2.0],
        ];
        let original = columns.clone();

        // A zero tolerance can never be met
        let summary = IterativeImputer::new()
            .with_max_iter(1)
            .with_tolerance(0.0)
            .fit_transform(&mut columns)?;

        assert_eq!(summary.rounds, 1);
        assert!(!summary.converged);
        assert_eq!(summary.imputed_cells, 5);
        for (col, orig) in columns.iter().zip(&original) {
            for (v, o) in col.iter().zip(orig) {
                assert!(v.is_finite());
                if !o.is_nan() {
                    assert_eq!(v, o);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_complete_matrix_needs_no_rounds() -> Result<()> {
        let mut columns = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let summary = IterativeImputer::new().fit_transform(&mut columns)?;
        assert_eq!(summary.rounds, 0);
        assert!(summary.converged);
        Ok(())
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let mut columns = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(IterativeImputer::new().fit_transform(&mut columns).is_err());
    }
}
