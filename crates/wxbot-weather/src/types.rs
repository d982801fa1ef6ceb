use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// WMO weather code as reported by Open-Meteo.
/// See: https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub i32);

/// Codes treated as wet when deciding on rain gear
const RAIN_CODES: [i32; 9] = [51, 53, 55, 61, 63, 65, 80, 81, 82];

impl WeatherCode {
    /// Label used in the current-conditions report
    pub fn current_label(self) -> &'static str {
        match self.0 {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            51 => "Light drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            71 => "Slight snow",
            80 => "Rain showers",
            95 => "Thunderstorm",
            _ => "Unknown conditions",
        }
    }

    /// Shorter label used in forecast lines
    pub fn forecast_label(self) -> &'static str {
        match self.0 {
            0 | 1 => "Clear",
            2 => "Cloudy",
            3 => "Overcast",
            45 => "Fog",
            51 => "Drizzle",
            61 | 63 => "Rain",
            65 => "Heavy rain",
            71 => "Snow",
            80 => "Showers",
            95 => "Thunderstorm",
            _ => "Unknown",
        }
    }

    pub fn is_rainy(self) -> bool {
        RAIN_CODES.contains(&self.0)
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Celsius to Fahrenheit, rounded to one decimal.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round1(celsius * 9.0 / 5.0 + 32.0)
}

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: String,
}

/// Current weather conditions, temperatures in Celsius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    /// km/h
    pub wind_speed: f64,
    pub code: WeatherCode,
}

/// Daily forecast entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub code: WeatherCode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentReport {
    pub place: Place,
    pub current: CurrentWeather,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub place: Place,
    /// Always `FORECAST_DAYS` long, today first
    pub days: Vec<DayForecast>,
}

/// Number of days requested from and rendered for the forecast
pub const FORECAST_DAYS: usize = 7;

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// `retried` is set when a first-word fallback search was also attempted
    #[error("Location not found: {query}")]
    LocationNotFound { query: String, retried: bool },

    #[error("Forecast returned {days} days, expected 7")]
    IncompleteForecast { days: usize },
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) => "Unable to reach the weather service. Please try again.",
            WeatherError::Api { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::Api { .. } => "The weather request failed. Please try again.",
            WeatherError::Parse(_) | WeatherError::IncompleteForecast { .. } => {
                "Received an unexpected response from the weather service."
            }
            WeatherError::LocationNotFound { .. } => "Location not found. Check and try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_clear() {
        assert_eq!(WeatherCode(0).current_label(), "Clear sky");
        assert_eq!(WeatherCode(0).forecast_label(), "Clear");
    }

    #[test]
    fn test_code_mainly_clear_differs_between_tables() {
        assert_eq!(WeatherCode(1).current_label(), "Mainly clear");
        assert_eq!(WeatherCode(1).forecast_label(), "Clear");
        assert_eq!(WeatherCode(2).current_label(), "Partly cloudy");
        assert_eq!(WeatherCode(2).forecast_label(), "Cloudy");
    }

    #[test]
    fn test_code_rain_variants() {
        assert_eq!(WeatherCode(61).current_label(), "Slight rain");
        assert_eq!(WeatherCode(63).current_label(), "Moderate rain");
        assert_eq!(WeatherCode(61).forecast_label(), "Rain");
        assert_eq!(WeatherCode(63).forecast_label(), "Rain");
        assert_eq!(WeatherCode(80).forecast_label(), "Showers");
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(WeatherCode(99).current_label(), "Unknown conditions");
        assert_eq!(WeatherCode(99).forecast_label(), "Unknown");
        assert_eq!(WeatherCode(-1).forecast_label(), "Unknown");
    }

    #[test]
    fn test_rain_codes() {
        for code in [51, 53, 55, 61, 63, 65, 80, 81, 82] {
            assert!(WeatherCode(code).is_rainy(), "code {} should be rainy", code);
        }
        for code in [0, 3, 45, 71, 95, 99] {
            assert!(!WeatherCode(code).is_rainy(), "code {} should not be rainy", code);
        }
    }

    #[test]
    fn test_fahrenheit_conversion() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
        assert_eq!(celsius_to_fahrenheit(21.3), 70.3);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(12.36), 12.4);
        assert_eq!(round1(-3.04), -3.0);
    }

    #[test]
    fn test_error_user_messages() {
        let err = WeatherError::LocationNotFound {
            query: "Atlantis".into(),
            retried: false,
        };
        assert!(err.to_string().contains("Atlantis"));
        assert!(err.user_message().contains("Location"));

        let err = WeatherError::Api {
            status: 503,
            body: String::new(),
        };
        assert!(err.user_message().contains("later"));

        let err = WeatherError::IncompleteForecast { days: 3 };
        assert!(err.to_string().contains("3 days"));
    }
}
