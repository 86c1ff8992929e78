use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One energy-meter measurement for a (building, meter type) pair.
///
/// `train.csv` rows carry `meter_reading`; `test.csv` rows carry `row_id`
/// instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub row_id: Option<u32>,
    pub building_id: u16,
    pub meter: u8,
    pub timestamp: NaiveDateTime,
    pub meter_reading: Option<f32>,
}

impl MeterReading {
    pub fn new(building_id: u16, meter: u8, timestamp: NaiveDateTime, meter_reading: f32) -> Self {
        Self {
            row_id: None,
            building_id,
            meter,
            timestamp,
            meter_reading: Some(meter_reading),
        }
    }

    pub fn unlabelled(row_id: u32, building_id: u16, meter: u8, timestamp: NaiveDateTime) -> Self {
        Self {
            row_id: Some(row_id),
            building_id,
            meter,
            timestamp,
            meter_reading: None,
        }
    }
}
