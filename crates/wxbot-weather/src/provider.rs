use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;
use wxbot_core::WeatherConfig;

use crate::geocode::Geocoder;
use crate::types::{
    round1, CurrentReport, CurrentWeather, DayForecast, ForecastReport, Place, WeatherCode,
    WeatherError, FORECAST_DAYS,
};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    #[serde(rename = "temperature_2m")]
    temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    humidity: f64,
    #[serde(rename = "wind_speed_10m")]
    wind_speed: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailyData,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<NaiveDate>,
    #[serde(rename = "temperature_2m_max")]
    temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min")]
    temperature_min: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

impl DailyData {
    fn into_days(self) -> Result<Vec<DayForecast>, WeatherError> {
        let available = self
            .time
            .len()
            .min(self.temperature_max.len())
            .min(self.temperature_min.len())
            .min(self.weather_code.len());

        if available < FORECAST_DAYS {
            return Err(WeatherError::IncompleteForecast { days: available });
        }

        (0..FORECAST_DAYS)
            .map(|i| -> Result<DayForecast, WeatherError> {
                let missing = |field: &str| {
                    WeatherError::Parse(format!("daily.{} is null for day {}", field, i + 1))
                };
                Ok(DayForecast {
                    date: self.time[i],
                    high: round1(self.temperature_max[i].ok_or_else(|| missing("temperature_2m_max"))?),
                    low: round1(self.temperature_min[i].ok_or_else(|| missing("temperature_2m_min"))?),
                    code: WeatherCode(self.weather_code[i].ok_or_else(|| missing("weather_code"))?),
                })
            })
            .collect()
    }
}

/// Open-Meteo client: geocodes a city, then fetches conditions for it.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    geocoder: Geocoder,
    forecast_url: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::with_client(
            Arc::new(client),
            &config.geocoding_url,
            &config.forecast_url,
        ))
    }

    pub fn with_client(client: Arc<Client>, geocoding_url: &str, forecast_url: &str) -> Self {
        Self {
            geocoder: Geocoder::new(client.clone(), geocoding_url),
            client,
            forecast_url: forecast_url.to_string(),
        }
    }

    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    /// Current temperature, humidity, wind, and sky for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, city: &str) -> Result<CurrentReport, WeatherError> {
        let place = self.geocoder.resolve(city).await?;

        let url = format!(
            "{}?latitude={}&longitude={}&current={}&timezone=auto",
            self.forecast_url, place.latitude, place.longitude, CURRENT_FIELDS
        );
        let body: CurrentResponse = self.get_json(&url).await?;
        let data = body.current;

        Ok(CurrentReport {
            place,
            current: CurrentWeather {
                temperature: round1(data.temperature),
                humidity: data.humidity,
                wind_speed: round1(data.wind_speed),
                code: WeatherCode(data.weather_code),
            },
        })
    }

    /// Seven days of highs, lows, and sky for `city`, today first.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, city: &str) -> Result<ForecastReport, WeatherError> {
        let place: Place = self.geocoder.resolve(city).await?;

        let url = format!(
            "{}?latitude={}&longitude={}&daily={}&timezone=auto&forecast_days={}",
            self.forecast_url, place.latitude, place.longitude, DAILY_FIELDS, FORECAST_DAYS
        );
        let body: DailyResponse = self.get_json(&url).await?;

        Ok(ForecastReport {
            place,
            days: body.daily.into_days()?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Weather API returned {}", status);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("weather response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_geocode(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"latitude": 47.61, "longitude": -122.33, "name": "Seattle", "country": "United States"}]
            })))
            .mount(server)
            .await;
    }

    fn provider(server: &MockServer) -> WeatherProvider {
        WeatherProvider::with_client(
            Arc::new(Client::new()),
            &format!("{}/v1/search", server.uri()),
            &format!("{}/v1/forecast", server.uri()),
        )
    }

    fn daily_body(days: usize) -> serde_json::Value {
        let time: Vec<String> = (1..=days).map(|d| format!("2024-06-{:02}", d)).collect();
        let max: Vec<f64> = (0..days).map(|d| 20.0 + d as f64).collect();
        let min: Vec<f64> = (0..days).map(|d| 10.0 + d as f64).collect();
        let codes: Vec<i32> = vec![0; days];
        serde_json::json!({
            "daily": {
                "time": time,
                "temperature_2m_max": max,
                "temperature_2m_min": min,
                "weather_code": codes
            }
        })
    }

    #[test]
    fn test_new_from_config() {
        let provider = WeatherProvider::new(&WeatherConfig::default());
        assert!(provider.is_ok());
    }

    #[tokio::test]
    async fn test_current_weather() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "47.61"))
            .and(query_param("longitude", "-122.33"))
            .and(query_param("current", CURRENT_FIELDS))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": {
                    "temperature_2m": 12.34,
                    "relative_humidity_2m": 81,
                    "wind_speed_10m": 9.87,
                    "weather_code": 61
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider(&mock_server).current("Seattle").await.unwrap();

        assert_eq!(report.place.name, "Seattle");
        assert_eq!(report.current.temperature, 12.3);
        assert_eq!(report.current.humidity, 81.0);
        assert_eq!(report.current.wind_speed, 9.9);
        assert_eq!(report.current.code, WeatherCode(61));
    }

    #[tokio::test]
    async fn test_forecast_takes_seven_days() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("forecast_days", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body(9)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider(&mock_server).forecast("Seattle").await.unwrap();

        assert_eq!(report.days.len(), FORECAST_DAYS);
        assert_eq!(report.days[0].date.to_string(), "2024-06-01");
        assert_eq!(report.days[1].high, 21.0);
        assert_eq!(report.days[6].low, 16.0);
    }

    #[tokio::test]
    async fn test_forecast_too_short() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body(3)))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).forecast("Seattle").await.unwrap_err();
        assert!(matches!(err, WeatherError::IncompleteForecast { days: 3 }));
    }

    #[tokio::test]
    async fn test_forecast_null_value() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        let mut body = daily_body(7);
        body["daily"]["temperature_2m_min"][4] = serde_json::Value::Null;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).forecast("Seattle").await.unwrap_err();
        assert!(err.to_string().contains("day 5"));
    }

    #[tokio::test]
    async fn test_malformed_weather_response() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hourly": {}})))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).current("Seattle").await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[tokio::test]
    async fn test_weather_api_error_status() {
        let mock_server = MockServer::start().await;
        mount_geocode(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid latitude"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server).current("Seattle").await.unwrap_err();
        assert!(matches!(err, WeatherError::Api { status: 400, .. }));
        assert!(err.to_string().contains("invalid latitude"));
    }
}
