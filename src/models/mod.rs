pub mod building;
pub mod joined;
pub mod reading;
pub mod site;
pub mod weather;

pub use building::BuildingMetadata;
pub use joined::{JoinedRecord, SiteWeather};
pub use reading::MeterReading;
pub use site::SiteInfo;
pub use weather::{WeatherField, WeatherRecord, WeatherRecordBuilder};
