//! Keyword routing for inbound chat messages.

const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "temp",
    "rain",
    "sunny",
    "cloudy",
    "forecast",
    "wear",
    "clothing",
    "dress",
];

const FORECAST_KEYWORDS: &[&str] = &["forecast", "tomorrow", "next", "days", "week", "future"];

const CLOTHING_KEYWORDS: &[&str] = &["wear", "clothing", "dress", "outfit", "should i"];

/// How a message should be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Answer from the weather API. Both flags may be set.
    Weather { forecast: bool, clothing: bool },
    /// Hand off to the generative-text service
    General,
}

/// Classify a message by case-insensitive substring match.
///
/// A message with no weather keyword is `General` even if it names a city.
pub fn classify(message: &str) -> QueryKind {
    let lowered = message.to_lowercase();
    let mentions_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if !mentions_any(WEATHER_KEYWORDS) {
        return QueryKind::General;
    }

    QueryKind::Weather {
        forecast: mentions_any(FORECAST_KEYWORDS),
        clothing: mentions_any(CLOTHING_KEYWORDS),
    }
}
