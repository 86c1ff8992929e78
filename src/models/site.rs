use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Descriptive attributes of a site (one weather station per site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub site_id: u8,
    pub timezone: Option<Tz>,
    pub country_code: Option<String>,
    pub location: Option<String>,
}

impl SiteInfo {
    pub fn new(site_id: u8, timezone: Tz) -> Self {
        Self {
            site_id,
            timezone: Some(timezone),
            country_code: None,
            location: None,
        }
    }

    pub fn with_country_code(mut self, country_code: &str) -> Self {
        self.country_code = Some(country_code.to_string());
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn timezone_name(&self) -> Option<&'static str> {
        self.timezone.map(|tz| tz.name())
    }
}
