use crate::models::WeatherRecord;
use crate::utils::constants::{
    HEAT_INDEX_MIN_TEMP_F, HUMIDITY_NEGATIVE, HUMIDITY_POSITIVE, WIND_CHILL_MAX_TEMP_F,
    WIND_CHILL_MIN_WIND,
};
use rayon::prelude::*;
use tracing::debug;

// Rothfusz regression coefficients
const ROTHFUSZ: [f64; 9] = [
    -42.379,
    2.049_015_23,
    10.143_331_27,
    -0.224_755_41,
    -6.837_83e-3,
    -5.481_717e-2,
    1.228_74e-3,
    8.528_2e-4,
    -1.99e-6,
];

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Relative humidity (%) from air and dew point temperature in °C.
///
/// The constant set switches at exactly 0 °C: `T > 0` uses the positive
/// set, `T <= 0` the negative one.
pub fn relative_humidity(air_temperature: f64, dew_temperature: f64) -> f64 {
    let (b, c) = if air_temperature > 0.0 {
        HUMIDITY_POSITIVE
    } else {
        HUMIDITY_NEGATIVE
    };
    100.0 * (b * dew_temperature / (c + dew_temperature)).exp()
        / (b * air_temperature / (c + air_temperature)).exp()
}

pub fn wind_chill(temp_f: f64, wind_speed: f64) -> f64 {
    let v = wind_speed.powf(0.16);
    35.74 + 0.6215 * temp_f - 35.75 * v + 0.4275 * temp_f * v
}

pub fn heat_index(temp_f: f64, humidity: f64) -> f64 {
    let (t, rh) = (temp_f, humidity);
    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if simple < HEAT_INDEX_MIN_TEMP_F {
        return simple;
    }

    let c = ROTHFUSZ;
    let mut hi = c[0]
        + c[1] * t
        + c[2] * rh
        + c[3] * t * rh
        + c[4] * t * t
        + c[5] * rh * rh
        + c[6] * t * t * rh
        + c[7] * t * rh * rh
        + c[8] * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }
    hi
}

/// NOAA feels-like temperature in °F.
///
/// Missing wind never selects the wind-chill regime; missing humidity in
/// the heat-index regime yields `None`.
pub fn feels_like_fahrenheit(temp_f: f64, humidity: Option<f64>, wind_speed: Option<f64>) -> Option<f64> {
    let windy = wind_speed.filter(|v| *v > WIND_CHILL_MIN_WIND);
    match windy {
        Some(v) if temp_f <= WIND_CHILL_MAX_TEMP_F => Some(wind_chill(temp_f, v)),
        _ if temp_f >= HEAT_INDEX_MIN_TEMP_F => humidity.map(|rh| heat_index(temp_f, rh)),
        _ => Some(temp_f),
    }
}

/// Counts from one feels-like pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeelsLikeStats {
    pub rows: usize,
    pub humidity_derived: usize,
    pub feels_like_derived: usize,
}

/// Adds `relative_humidity`, `air_temp_f` and `feels_like_temp` to weather
/// rows in one parallel pass over the slice.
#[derive(Debug, Clone, Default)]
pub struct FeelsLikeCalculator;

impl FeelsLikeCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, records: &mut [WeatherRecord]) -> FeelsLikeStats {
        records.par_iter_mut().for_each(|record| {
            let air = record.air_temperature.map(f64::from);
            let dew = record.dew_temperature.map(f64::from);

            let humidity = air.zip(dew).map(|(t, td)| relative_humidity(t, td));
            let temp_f = air.map(celsius_to_fahrenheit);
            let feels_like = temp_f
                .and_then(|tf| feels_like_fahrenheit(tf, humidity, record.wind_speed.map(f64::from)))
                .map(fahrenheit_to_celsius);

            record.relative_humidity = humidity.map(|v| v as f32);
            record.air_temp_f = temp_f.map(|v| v as f32);
            record.feels_like_temp = feels_like.map(|v| v as f32);
        });

        let stats = FeelsLikeStats {
            rows: records.len(),
            humidity_derived: records.iter().filter(|r| r.relative_humidity.is_some()).count(),
            feels_like_derived: records.iter().filter(|r| r.feels_like_temp.is_some()).count(),
        };
        debug!(
            "Feels-like: {} rows, {} with humidity, {} with feels-like",
            stats.rows, stats.humidity_derived, stats.feels_like_derived
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(air: Option<f32>, dew: Option<f32>, wind: Option<f32>) -> WeatherRecord {
        let ts = NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut r = WeatherRecord::empty(0, ts);
        r.air_temperature = air;
        r.dew_temperature = dew;
        r.wind_speed = wind;
        r
    }

    #[test]
    fn test_saturated_air_has_full_humidity() {
        assert!((relative_humidity(15.0, 15.0) - 100.0).abs() < 1e-9);
        assert!((relative_humidity(-5.0, -5.0) - 100.0).abs() < 1e-9);
        assert!(relative_humidity(20.0, 10.0) < 100.0);
    }

    #[test]
    fn test_humidity_constants_switch_at_zero() {
        // At T = 0 the negative set applies, just above it the positive one
        let dew = -10.0;
        let at_zero = relative_humidity(0.0, dew);
        let (b, c) = HUMIDITY_NEGATIVE;
        let expected = 100.0 * (b * dew / (c + dew)).exp();
        assert!((at_zero - expected).abs() < 1e-9);

        let (b, c) = HUMIDITY_POSITIVE;
        let above = relative_humidity(1e-9, dew);
        let expected_above = 100.0 * (b * dew / (c + dew)).exp();
        assert!((above - expected_above).abs() < 1e-6);
        assert!((at_zero - above).abs() > 0.01);
    }

    #[test]
    fn test_wind_chill_regime_feels_colder() {
        let mut rows = vec![record(Some(-5.0), Some(-8.0), Some(10.0))];
        FeelsLikeCalculator::new().apply(&mut rows);

        let feels = rows[0].feels_like_temp.unwrap();
        assert!(feels < -5.0, "feels like {}", feels);
        assert!((rows[0].air_temp_f.unwrap() - 23.0).abs() < 1e-4);
    }

    #[test]
    fn test_mild_weather_feels_like_air() {
        // 20 °C is 68 °F: neither wind chill (<= 50 °F) nor heat index
        // (>= 80 °F) applies, so the air temperature comes back unchanged.
        let mut rows = vec![record(Some(20.0), Some(10.0), Some(5.0))];
        FeelsLikeCalculator::new().apply(&mut rows);
        assert!((rows[0].feels_like_temp.unwrap() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_heat_index_regime() {
        // 35 °C at 60 % humidity is well into the Rothfusz range
        let hi = feels_like_fahrenheit(95.0, Some(60.0), Some(1.0)).unwrap();
        assert!(hi > 110.0 && hi < 118.0, "heat index {}", hi);
        assert_eq!(feels_like_fahrenheit(85.0, None, None), None);
        // Simple formula below 80
        assert!(heat_index(80.0, 0.0) < 80.0);
    }

    #[test]
    fn test_heat_index_dry_adjustment() {
        // 100 °F at 10 %: Rothfusz 94.75261 minus (3/4)·sqrt(12/17)
        let hi = heat_index(100.0, 10.0);
        assert!((hi - 94.122_483).abs() < 1e-4, "heat index {}", hi);
    }

    #[test]
    fn test_heat_index_humid_adjustment() {
        // 85 °F at 90 %: Rothfusz 101.58080 plus (5/10)·(2/5)
        let hi = heat_index(85.0, 90.0);
        assert!((hi - 101.780_804).abs() < 1e-4, "heat index {}", hi);
    }

    #[test]
    fn test_missing_inputs_propagate() {
        let mut rows = vec![
            record(None, Some(3.0), Some(4.0)),
            record(Some(4.0), None, None),
        ];
        let stats = FeelsLikeCalculator::new().apply(&mut rows);

        assert_eq!(rows[0].relative_humidity, None);
        assert_eq!(rows[0].air_temp_f, None);
        assert_eq!(rows[0].feels_like_temp, None);

        assert_eq!(rows[1].relative_humidity, None);
        assert_eq!(rows[1].feels_like_temp, Some(4.0));
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.humidity_derived, 0);
        assert_eq!(stats.feels_like_derived, 1);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert!((fahrenheit_to_celsius(celsius_to_fahrenheit(-12.5)) + 12.5).abs() < 1e-12);
    }
}
