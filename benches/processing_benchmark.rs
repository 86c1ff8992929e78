use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use energy_prep::config::ImputationSettings;
use energy_prep::imputation::WeatherImputer;
use energy_prep::models::{BuildingMetadata, MeterReading, WeatherField, WeatherRecord};
use energy_prep::processors::{DataMerger, FeelsLikeCalculator};

// Hourly weather for `sites` sites over `hours` hours, with gaps
fn create_weather(sites: u8, hours: i64) -> Vec<WeatherRecord> {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut records = Vec::with_capacity(sites as usize * hours as usize);

    for site in 0..sites {
        for h in 0..hours {
            if (h + site as i64) % 17 == 0 {
                continue;
            }
            let phase = h as f32 / 24.0 * std::f32::consts::TAU;
            let temp = 8.0 + site as f32 + phase.sin() * 6.0;
            let mut builder = WeatherRecord::builder(site, start + Duration::hours(h))
                .dew_temperature(temp - 3.0)
                .wind_speed(2.0 + (h % 6) as f32)
                .value(WeatherField::SeaLevelPressure, 1013.0 + phase.cos() * 4.0);
            if h % 7 != 0 {
                builder = builder.air_temperature(temp);
            }
            records.push(builder.build());
        }
    }

    records
}

fn bench_feels_like(c: &mut Criterion) {
    let mut group = c.benchmark_group("feels_like");

    for rows in [1_000i64, 10_000, 100_000] {
        let weather = create_weather(10, rows / 10);
        group.bench_with_input(BenchmarkId::new("apply", rows), &weather, |b, weather| {
            b.iter(|| {
                let mut batch = weather.clone();
                black_box(FeelsLikeCalculator::new().apply(&mut batch))
            })
        });
    }

    group.finish();
}

fn bench_imputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("imputation");
    group.sample_size(10);

    for hours in [24i64 * 7, 24 * 30] {
        let weather = create_weather(4, hours);
        let imputer = WeatherImputer::new(ImputationSettings::default());
        group.bench_with_input(BenchmarkId::new("impute", hours), &weather, |b, weather| {
            b.iter(|| black_box(imputer.impute(weather)))
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let buildings: Vec<BuildingMetadata> = (0..100u16).map(|b| BuildingMetadata::new((b % 10) as u8, b)).collect();
    let readings: Vec<MeterReading> = (0..50_000)
        .map(|i| MeterReading::new((i % 100) as u16, 0, start + Duration::hours((i / 100) as i64), 1.0))
        .collect();
    let weather = create_weather(10, 500);

    c.bench_function("merge_readings_weather", |b| {
        b.iter(|| {
            let merger = DataMerger::new();
            let mut joined = merger.merge_buildings(readings.clone(), &buildings);
            let site_weather = merger.merge_sites(weather.clone(), &[]);
            black_box(merger.merge_weather(&mut joined, site_weather))
        })
    });
}

criterion_group!(benches, bench_feels_like, bench_imputation, bench_merge);
criterion_main!(benches);
