use serde::{Deserialize, Serialize};

/// A metered building and the site that hosts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    pub site_id: u8,
    pub building_id: u16,
    pub primary_use: Option<String>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u16>,
    pub floor_count: Option<u16>,
}

impl BuildingMetadata {
    pub fn new(site_id: u8, building_id: u16) -> Self {
        Self {
            site_id,
            building_id,
            primary_use: None,
            square_feet: None,
            year_built: None,
            floor_count: None,
        }
    }

    pub fn with_primary_use(mut self, primary_use: &str) -> Self {
        self.primary_use = Some(primary_use.to_string());
        self
    }

    pub fn with_square_feet(mut self, square_feet: u32) -> Self {
        self.square_feet = Some(square_feet);
        self
    }
}
