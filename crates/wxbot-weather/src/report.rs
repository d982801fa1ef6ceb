//! Chat-ready weather text.
//!
//! `WeatherService` never fails: lookup errors are folded into a `❌` line so
//! the caller can always return the text as a successful reply.

use std::fmt::Write;

use crate::clothing::recommend_clothing;
use crate::provider::WeatherProvider;
use crate::types::{celsius_to_fahrenheit, CurrentReport, ForecastReport, WeatherError};

const DAY_NAMES: [&str; 7] = ["Today", "Tomorrow", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportKind {
    Current,
    Forecast,
}

impl ReportKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Current => "weather",
            Self::Forecast => "forecast",
        }
    }

    fn service_name(self) -> &'static str {
        match self {
            Self::Current => "Weather",
            Self::Forecast => "Forecast",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: WeatherProvider,
}

impl WeatherService {
    pub fn new(provider: WeatherProvider) -> Self {
        Self { provider }
    }

    /// Current conditions for `city`, optionally with clothing advice.
    pub async fn current(&self, city: &str, include_clothing: bool) -> String {
        match self.provider.current(city).await {
            Ok(report) => render_current(&report, include_clothing),
            Err(e) => failure_message(ReportKind::Current, city, &e),
        }
    }

    /// Seven-day outlook for `city`, optionally with advice for tomorrow.
    pub async fn forecast(&self, city: &str, include_clothing: bool) -> String {
        match self.provider.forecast(city).await {
            Ok(report) => render_forecast(&report, include_clothing),
            Err(e) => failure_message(ReportKind::Forecast, city, &e),
        }
    }

    /// Current conditions without clothing advice.
    pub async fn report(&self, city: &str) -> String {
        self.current(city, false).await
    }
}

fn failure_message(kind: ReportKind, city: &str, error: &WeatherError) -> String {
    match error {
        WeatherError::LocationNotFound { retried: true, .. } => format!(
            "❌ Could not find {} for '{}'. Try just the city name.",
            kind.noun(),
            city
        ),
        WeatherError::LocationNotFound { retried: false, .. } => format!(
            "❌ Could not find {} for '{}'. Please check the spelling.",
            kind.noun(),
            city
        ),
        other => {
            tracing::warn!("{} lookup for '{}' failed: {}", kind.noun(), city, other);
            format!("❌ {} service error: {}", kind.service_name(), other)
        }
    }
}

pub fn render_current(report: &CurrentReport, include_clothing: bool) -> String {
    let current = &report.current;
    let condition = current.code.current_label();

    let mut text = format!(
        "🌤️ **Current Weather in {}, {}**\n\n\
         🌡️ **Temperature:** {:.1}°C ({:.1}°F)\n\
         💧 **Humidity:** {}%\n\
         🌬️ **Wind Speed:** {:.1} km/h\n\
         ☁️ **Conditions:** {}",
        report.place.name,
        report.place.country,
        current.temperature,
        celsius_to_fahrenheit(current.temperature),
        current.humidity,
        current.wind_speed,
        condition,
    );

    if include_clothing {
        let advice = recommend_clothing(current.temperature, condition, current.code.is_rainy());
        text.push_str("\n\n👔 **What to Wear:**\n");
        text.push_str(&advice);
    }

    text.push_str("\n\n*🤖 Powered by AI Weather Agent using Open-Meteo API*");
    if !include_clothing {
        text.push_str("\n*💡 Ask 'what should I wear?' for clothing recommendations*");
    }

    text
}

pub fn render_forecast(report: &ForecastReport, include_clothing: bool) -> String {
    let mut text = format!(
        "📅 **7-Day Weather Forecast for {}, {}**\n\n",
        report.place.name, report.place.country
    );

    for (i, day) in report.days.iter().enumerate() {
        let label = DAY_NAMES
            .get(i)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("Day {}", i + 1));

        // Writing to a String cannot fail
        let _ = writeln!(
            text,
            "**{}** ({}): {:.1}°C/{:.1}°C ({:.1}°F/{:.1}°F) - {}",
            label,
            day.date,
            day.high,
            day.low,
            celsius_to_fahrenheit(day.high),
            celsius_to_fahrenheit(day.low),
            day.code.forecast_label(),
        );
    }

    if include_clothing {
        if let Some(tomorrow) = report.days.get(1) {
            let advice = recommend_clothing(
                tomorrow.high,
                tomorrow.code.forecast_label(),
                tomorrow.code.is_rainy(),
            );
            let _ = write!(text, "\n👔 **What to Wear Tomorrow:**\n{}\n", advice);
        }
    }

    text.push_str("\n*🤖 7-day forecast from Open-Meteo API*");
    if !include_clothing {
        text.push_str("\n*💡 Ask 'what should I wear tomorrow?' for clothing advice*");
    }

    text
}
