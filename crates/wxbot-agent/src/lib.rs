//! Chat request handling for wxbot
//!
//! Classifies an inbound message, answers weather questions from Open-Meteo,
//! and forwards everything else to a generative-text service.

pub mod city;
pub mod classify;
pub mod handler;
pub mod llm;

pub use city::{extract_city, normalize_city, DEFAULT_CITY};
pub use classify::{classify, QueryKind};
pub use handler::{Agent, Envelope, HandlerError};
pub use llm::{AnthropicClient, LlmClient, LlmError};
