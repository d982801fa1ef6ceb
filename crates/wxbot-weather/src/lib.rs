//! Weather lookups for wxbot
//!
//! Resolves place names and fetches current conditions or a 7-day forecast
//! from the Open-Meteo API, then renders chat-ready text with optional
//! clothing advice.

pub mod clothing;
pub mod geocode;
pub mod provider;
pub mod report;
pub mod types;

pub use clothing::recommend_clothing;
pub use geocode::Geocoder;
pub use provider::WeatherProvider;
pub use report::WeatherService;
pub use types::*;
