//! Forward geocoding: turn a place name into coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::types::{Place, WeatherError};

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: String,
    country: Option<String>,
}

impl From<GeocodingResult> for Place {
    fn from(result: GeocodingResult) -> Self {
        Self {
            latitude: result.latitude,
            longitude: result.longitude,
            name: result.name,
            country: result.country.unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    base_url: String,
}

impl Geocoder {
    pub fn new(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up a single best match for `name`.
    /// Returns `Ok(None)` when the API has no results.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, name: &str) -> Result<Option<Place>, WeatherError> {
        let url = format!(
            "{}?name={}&count=1&language=en&format=json",
            self.base_url,
            urlencoding::encode(name)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("geocoding response: {}", e)))?;

        Ok(body
            .results
            .and_then(|results| results.into_iter().next())
            .map(Place::from))
    }

    /// Resolve a city, retrying once with only its first word when the full
    /// name has no match and contains a space.
    pub async fn resolve(&self, city: &str) -> Result<Place, WeatherError> {
        if let Some(place) = self.search(city).await? {
            tracing::debug!("Geocoded '{}' to {}, {}", city, place.name, place.country);
            return Ok(place);
        }

        if !city.contains(' ') {
            tracing::info!("No geocoding results for '{}'", city);
            return Err(WeatherError::LocationNotFound {
                query: city.to_string(),
                retried: false,
            });
        }

        if let Some(first_word) = city.split_whitespace().next() {
            tracing::info!(
                "No geocoding results for '{}', retrying with '{}'",
                city,
                first_word
            );
            if let Some(place) = self.search(first_word).await? {
                return Ok(place);
            }
        }

        Err(WeatherError::LocationNotFound {
            query: city.to_string(),
            retried: true,
        })
    }
}
