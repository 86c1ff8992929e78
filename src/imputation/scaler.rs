/// Column-wise standardization to zero mean and unit variance.
///
/// Missing cells are `NaN`: they are ignored when fitting and left as `NaN`
/// by both transforms. Variance is the population variance; a column with
/// (near) zero variance keeps a scale of 1.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let mut means = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());

        for column in columns {
            let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
            if observed.is_empty() {
                means.push(0.0);
                scales.push(1.0);
                continue;
            }

            let n = observed.len() as f64;
            let mean = observed.iter().sum::<f64>() / n;
            let var = observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std_dev = var.sqrt();

            means.push(mean);
            scales.push(if std_dev < 10.0 * f64::EPSILON { 1.0 } else { std_dev });
        }

        Self { means, scales }
    }

    pub fn mean(&self, column: usize) -> f64 {
        self.means[column]
    }

    pub fn scale(&self, column: usize) -> f64 {
        self.scales[column]
    }

    pub fn transform(&self, columns: &mut [Vec<f64>]) {
        for (j, column) in columns.iter_mut().enumerate() {
            let (mean, scale) = (self.means[j], self.scales[j]);
            column.iter_mut().for_each(|v| *v = (*v - mean) / scale);
        }
    }

    pub fn inverse_transform(&self, columns: &mut [Vec<f64>]) {
        for (j, column) in columns.iter_mut().enumerate() {
            let (mean, scale) = (self.means[j], self.scales[j]);
            column.iter_mut().for_each(|v| *v = *v * scale + mean);
        }
    }

    pub fn fit_transform(columns: &mut [Vec<f64>]) -> Self {
        let scaler = Self::fit(columns);
        scaler.transform(columns);
        scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_statistics() {
        let mut columns = vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, f64::NAN, 30.0, 20.0]];
        let scaler = StandardScaler::fit_transform(&mut columns);

        assert!((scaler.mean(0) - 2.5).abs() < 1e-12);
        assert!((scaler.scale(0) - 1.25f64.sqrt()).abs() < 1e-12);
        assert!((scaler.mean(1) - 20.0).abs() < 1e-12);

        let mean: f64 = columns[0].iter().sum::<f64>() / 4.0;
        let var: f64 = columns[0].iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
        assert!(columns[1][1].is_nan());
    }

    #[test]
    fn test_round_trip_restores_values() {
        let original = vec![
            vec![-7.8, 0.0, 12.5, 33.3, 21.1],
            vec![1015.2, 1019.7, 998.0, 1002.4, 1011.0],
            vec![5.0, 5.0, 5.0, 5.0, 5.0],
        ];
        let mut columns = original.clone();

        let scaler = StandardScaler::fit_transform(&mut columns);
        scaler.inverse_transform(&mut columns);

        for (restored, expected) in columns.iter().flatten().zip(original.iter().flatten()) {
            assert!((restored - expected).abs() < 1e-9, "{} != {}", restored, expected);
        }
    }

    #[test]
    fn test_constant_and_empty_columns_keep_unit_scale() {
        let columns = vec![vec![3.0, 3.0, 3.0], vec![f64::NAN, f64::NAN, f64::NAN]];
        let scaler = StandardScaler::fit(&columns);

        assert_eq!(scaler.scale(0), 1.0);
        assert_eq!(scaler.mean(0), 3.0);
        assert_eq!(scaler.scale(1), 1.0);
    }
}
