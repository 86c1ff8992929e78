use crate::error::{ProcessingError, Result};
use crate::utils::constants::{RIDGE_GAMMA_PRIOR, RIDGE_MAX_ITER, RIDGE_TOLERANCE};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Sufficient statistics of a least-squares problem: row count plus the raw
/// first and second moments of the design `X` and target `y`.
#[derive(Debug, Clone)]
pub struct GramStatistics {
    pub n: usize,
    pub x_sum: DVector<f64>,
    pub y_sum: f64,
    pub xtx: DMatrix<f64>,
    pub xty: DVector<f64>,
    pub yty: f64,
}

impl GramStatistics {
    pub fn new(features: usize) -> Self {
        Self {
            n: 0,
            x_sum: DVector::zeros(features),
            y_sum: 0.0,
            xtx: DMatrix::zeros(features, features),
            xty: DVector::zeros(features),
            yty: 0.0,
        }
    }

    pub fn features(&self) -> usize {
        self.x_sum.len()
    }

    /// Build from a packed accumulator over `z = [x.., y]`: `sums` holds
    /// `Σz` and `products` the row-major upper triangle of `Σzzᵀ`.
    pub fn from_packed(n: usize, sums: &[f64], products: &[f64]) -> Self {
        let d = sums.len();
        let p = d.saturating_sub(1);
        let mut stats = Self::new(p);
        stats.n = n;
        if d == 0 {
            return stats;
        }

        for a in 0..p {
            stats.x_sum[a] = sums[a];
            for b in a..p {
                let v = products[a * d + b];
                stats.xtx[(a, b)] = v;
                stats.xtx[(b, a)] = v;
            }
            stats.xty[a] = products[a * d + p];
        }
        stats.y_sum = sums[p];
        stats.yty = products[p * d + p];
        stats
    }

    pub fn push(&mut self, x: &[f64], y: f64) {
        let p = self.features();
        self.n += 1;
        self.y_sum += y;
        self.yty += y * y;
        for a in 0..p {
            self.x_sum[a] += x[a];
            self.xty[a] += x[a] * y;
            for b in 0..p {
                self.xtx[(a, b)] += x[a] * x[b];
            }
        }
    }
}

/// Bayesian ridge regression with Gamma hyperpriors on the noise precision
/// `alpha` and the weight precision `lambda`, fitted by evidence
/// maximisation.
#[derive(Debug, Clone)]
pub struct BayesianRidge {
    max_iter: usize,
    tolerance: f64,
    alpha_1: f64,
    alpha_2: f64,
    lambda_1: f64,
    lambda_2: f64,
}

/// A fitted linear model.
#[derive(Debug, Clone)]
pub struct RidgeModel {
    pub coef: DVector<f64>,
    pub intercept: f64,
    pub alpha: f64,
    pub lambda: f64,
    pub iterations: usize,
}

impl RidgeModel {
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept + x.iter().zip(self.coef.iter()).map(|(a, b)| a * b).sum::<f64>()
    }
}

impl BayesianRidge {
    pub fn new() -> Self {
        Self {
            max_iter: RIDGE_MAX_ITER,
            tolerance: RIDGE_TOLERANCE,
            alpha_1: RIDGE_GAMMA_PRIOR,
            alpha_2: RIDGE_GAMMA_PRIOR,
            lambda_1: RIDGE_GAMMA_PRIOR,
            lambda_2: RIDGE_GAMMA_PRIOR,
        }
    }

    pub fn fit(&self, stats: &GramStatistics) -> Result<RidgeModel> {
        if stats.n == 0 {
            return Err(ProcessingError::Imputation(
                "cannot fit regression on zero samples".to_string(),
            ));
        }

        let n = stats.n as f64;
        let p = stats.features();
        let y_mean = stats.y_sum / n;
        let y_var = (stats.yty / n - y_mean * y_mean).max(0.0);

        if p == 0 {
            return Ok(RidgeModel {
                coef: DVector::zeros(0),
                intercept: y_mean,
                alpha: 1.0 / (y_var + f64::EPSILON),
                lambda: 1.0,
                iterations: 0,
            });
        }

        // Center by subtracting the mean outer products
        let x_mean = &stats.x_sum / n;
        let xtx = &stats.xtx - (&x_mean * x_mean.transpose()) * n;
        let xty = &stats.xty - &x_mean * (n * y_mean);
        let yty = (stats.yty - n * y_mean * y_mean).max(0.0);

        let eigen = SymmetricEigen::new(xtx.clone());
        let eigen_vals = eigen.eigenvalues.map(|v| v.max(0.0));
        let projected = eigen.eigenvectors.transpose() * &xty;

        let solve = |alpha: f64, lambda: f64| -> DVector<f64> {
            let shrink = lambda / alpha;
            let weights = DVector::from_iterator(
                p,
                projected
                    .iter()
                    .zip(eigen_vals.iter())
                    .map(|(proj, ev)| proj / (ev + shrink)),
            );
            &eigen.eigenvectors * weights
        };

        let residual_ss = |coef: &DVector<f64>| -> f64 {
            let quad = (coef.transpose() * &xtx * coef)[(0, 0)];
            (yty - 2.0 * coef.dot(&xty) + quad).max(0.0)
        };

        let mut alpha = 1.0 / (y_var + f64::EPSILON);
        let mut lambda = 1.0;
        let mut coef_old: Option<DVector<f64>> = None;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let coef = solve(alpha, lambda);
            let rss = residual_ss(&coef);

            let gamma: f64 = eigen_vals
                .iter()
                .map(|ev| alpha * ev / (lambda + alpha * ev))
                .sum();
            lambda = (gamma + 2.0 * self.lambda_1) / (coef.norm_squared() + 2.0 * self.lambda_2);
            alpha = (n - gamma + 2.0 * self.alpha_1) / (rss + 2.0 * self.alpha_2);

            if let Some(old) = &coef_old {
                let delta: f64 = (old - &coef).abs().sum();
                if delta < self.tolerance {
                    break;
                }
            }
            coef_old = Some(coef);
        }

        let coef = solve(alpha, lambda);
        let intercept = y_mean - x_mean.dot(&coef);

        if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
            return Err(ProcessingError::Imputation(
                "regression produced non-finite coefficients".to_string(),
            ));
        }

        Ok(RidgeModel {
            coef,
            intercept,
            alpha,
            lambda,
            iterations,
        })
    }
}

impl Default for BayesianRidge {
    fn default() -> Self {
        Self::new()
    }
}
