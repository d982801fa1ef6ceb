//! Request handling: event in, response envelope out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use wxbot_weather::WeatherService;

use crate::city::extract_city;
use crate::classify::{classify, QueryKind};
use crate::llm::{LlmClient, LlmError};

/// Message used when the body carries no `message` field
pub const NO_MESSAGE: &str = "No message";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    InvalidBody,

    #[error("'message' must be a string")]
    InvalidMessage,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl HandlerError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) | Self::InvalidBody | Self::InvalidMessage => {
                "The request could not be understood."
            }
            Self::Llm(e) => e.user_message(),
        }
    }
}

/// HTTP-style response: `{statusCode, headers, body}` where `body` is a JSON
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Envelope {
    /// 200 with `{response, success: true}`
    pub fn ok(response: &str) -> Self {
        Self::new(
            200,
            serde_json::json!({ "response": response, "success": true }),
        )
    }

    /// 500 with `{error: "Error: <message>", success: false}`
    pub fn error(error: &dyn std::fmt::Display) -> Self {
        Self::new(
            500,
            serde_json::json!({ "error": format!("Error: {}", error), "success": false }),
        )
    }

    fn new(status_code: u16, body: Value) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Pull the chat message out of an event.
///
/// A string `body` is parsed as JSON, an object `body` is used as is, and an
/// event without `body` is itself the body.
pub fn extract_message(event: &Value) -> Result<String, HandlerError> {
    let parsed;
    let body = match event.get("body") {
        Some(Value::String(raw)) => {
            parsed = serde_json::from_str::<Value>(raw)?;
            &parsed
        }
        Some(body) => body,
        None => event,
    };

    let body = body.as_object().ok_or(HandlerError::InvalidBody)?;

    match body.get("message") {
        None => Ok(NO_MESSAGE.to_string()),
        Some(Value::String(message)) => Ok(message.clone()),
        Some(_) => Err(HandlerError::InvalidMessage),
    }
}

/// Answers one chat message per call. Holds no per-request state.
pub struct Agent<L> {
    weather: WeatherService,
    llm: L,
}

impl<L: LlmClient> Agent<L> {
    pub fn new(weather: WeatherService, llm: L) -> Self {
        Self { weather, llm }
    }

    /// Handle a decoded event. Never fails: errors become a 500 envelope.
    pub async fn handle(&self, event: &Value) -> Envelope {
        match self.respond(event).await {
            Ok(text) => Envelope::ok(&text),
            Err(e) => {
                tracing::error!("Request failed: {}", e);
                Envelope::error(&e)
            }
        }
    }

    /// Handle raw event text, which may not be valid JSON.
    pub async fn handle_raw(&self, raw: &str) -> Envelope {
        match serde_json::from_str::<Value>(raw) {
            Ok(event) => self.handle(&event).await,
            Err(e) => {
                let e = HandlerError::from(e);
                tracing::error!("Rejected event: {}", e);
                Envelope::error(&e)
            }
        }
    }

    async fn respond(&self, event: &Value) -> Result<String, HandlerError> {
        let message = extract_message(event)?;

        match classify(&message) {
            QueryKind::Weather { forecast, clothing } => {
                let city = extract_city(&message);
                tracing::info!(
                    city = %city,
                    forecast,
                    clothing,
                    "Routing to weather"
                );

                let text = if forecast {
                    self.weather.forecast(&city, clothing).await
                } else {
                    self.weather.current(&city, clothing).await
                };
                Ok(text)
            }
            QueryKind::General => {
                tracing::info!("Routing to LLM");
                Ok(self.llm.complete(&message).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_of(envelope: &Envelope) -> Value {
        serde_json::from_str(&envelope.body).unwrap()
    }

    #[test]
    fn test_message_from_string_body() {
        let event = json!({ "body": "{\"message\": \"hi there\"}" });
        assert_eq!(extract_message(&event).unwrap(), "hi there");
    }

    #[test]
    fn test_message_from_object_body() {
        let event = json!({ "body": { "message": "hi there" } });
        assert_eq!(extract_message(&event).unwrap(), "hi there");
    }

    #[test]
    fn test_message_from_bare_event() {
        let event = json!({ "message": "hi there" });
        assert_eq!(extract_message(&event).unwrap(), "hi there");
    }

    #[test]
    fn test_missing_message_defaults() {
        assert_eq!(extract_message(&json!({})).unwrap(), NO_MESSAGE);
        assert_eq!(extract_message(&json!({ "body": "{}" })).unwrap(), NO_MESSAGE);
    }

    #[test]
    fn test_bad_bodies() {
        assert!(matches!(
            extract_message(&json!({ "body": "{not json" })),
            Err(HandlerError::InvalidJson(_))
        ));
        assert!(matches!(
            extract_message(&json!({ "body": null })),
            Err(HandlerError::InvalidBody)
        ));
        assert!(matches!(
            extract_message(&json!(["message"])),
            Err(HandlerError::InvalidBody)
        ));
        assert!(matches!(
            extract_message(&json!({ "message": 42 })),
            Err(HandlerError::InvalidMessage)
        ));
    }

    #[test]
    fn test_ok_envelope() {
        let envelope = Envelope::ok("Sunny ☀️");

        assert_eq!(envelope.status_code, 200);
        assert!(envelope.is_success());
        assert_eq!(body_of(&envelope), json!({ "response": "Sunny ☀️", "success": true }));
    }

    #[test]
    fn test_error_envelope() {
        let envelope = Envelope::error(&HandlerError::InvalidBody);

        assert_eq!(envelope.status_code, 500);
        assert_eq!(
            body_of(&envelope),
            json!({ "error": "Error: Request body must be a JSON object", "success": false })
        );
    }

    #[test]
    fn test_cors_headers_always_present() {
        for envelope in [Envelope::ok("x"), Envelope::error(&"boom")] {
            assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
            assert_eq!(envelope.headers["Access-Control-Allow-Headers"], "Content-Type");
            assert_eq!(envelope.headers["Access-Control-Allow-Methods"], "POST, OPTIONS");
        }
    }

    #[test]
    fn test_envelope_serializes_status_code_key() {
        let value = serde_json::to_value(Envelope::ok("x")).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert!(value["body"].is_string());
    }

    #[test]
    fn test_llm_error_passes_through_display() {
        let err = HandlerError::from(LlmError::EmptyResponse);
        assert_eq!(err.to_string(), "LLM response contained no text");
    }
}
