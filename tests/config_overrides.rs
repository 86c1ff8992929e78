use energy_prep::config::PipelineConfig;
use std::env;
use std::fs;
use tempfile::TempDir;

// Environment variables are process-wide, so this binary holds the only
// test that sets them.
#[test]
fn test_environment_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.yml");
    fs::write(
        &path,
        "include_feels_like: false\nimpute_weather_data: true\nimputation:\n  max_iter: 20\n  tolerance: 0.001\n",
    )
    .unwrap();

    env::set_var("ENERGY_PREP__INCLUDE_FEELS_LIKE", "true");
    env::set_var("ENERGY_PREP__IMPUTATION__MAX_ITER", "7");
    let loaded = PipelineConfig::load(&path, true);
    env::remove_var("ENERGY_PREP__INCLUDE_FEELS_LIKE");
    env::remove_var("ENERGY_PREP__IMPUTATION__MAX_ITER");

    let config = loaded.unwrap();
    assert!(config.include_feels_like);
    assert!(config.impute_weather_data);
    assert_eq!(config.imputation.max_iter, 7);
    assert_eq!(config.imputation.tolerance, 0.001);
}
