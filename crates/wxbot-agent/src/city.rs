//! Pulling a city name out of free text.
//!
//! This is a heuristic, not an address parser. Everything after the first
//! `in`/`for` is treated as the city, so trailing words ("tomorrow") end up in
//! the result. The normalizer only cleans up a trailing US state abbreviation.

/// City used when the message names none
pub const DEFAULT_CITY: &str = "Seattle";

const STATE_SUFFIXES: [(&str, &str); 10] = [
    (" Wa", ", WA"),
    (" Ca", ", CA"),
    (" Ny", ", NY"),
    (" Tx", ", TX"),
    (" Fl", ", FL"),
    (" Il", ", IL"),
    (" Pa", ", PA"),
    (" Oh", ", OH"),
    (" Mi", ", MI"),
    (" Ga", ", GA"),
];

/// Extract and normalize the city a message asks about.
pub fn extract_city(message: &str) -> String {
    let cleaned = message.to_lowercase().replace(['?', '.'], "");
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let raw = words
        .iter()
        .enumerate()
        .find(|(i, word)| matches!(**word, "in" | "for") && i + 1 < words.len())
        .map(|(i, _)| title_case(&words[i + 1..].join(" ")))
        .unwrap_or_else(|| DEFAULT_CITY.to_string());

    let city = normalize_city(&raw);
    tracing::debug!("Extracted city '{}' (raw '{}')", city, raw);
    city
}

/// Best-effort cleanup of US state abbreviations.
///
/// `"Seattle Wa"` becomes `"Seattle, WA"` for the ten known suffixes. An
/// unrecognized two-letter second word (`"Denver Co"`) is dropped. Anything
/// else passes through unchanged.
pub fn normalize_city(city: &str) -> String {
    for (suffix, replacement) in STATE_SUFFIXES {
        if let Some(stem) = city.strip_suffix(suffix) {
            return format!("{}{}", stem, replacement);
        }
    }

    if !city.contains(',') {
        let words: Vec<&str> = city.split_whitespace().collect();
        if let [name, state] = words.as_slice() {
            if state.chars().count() == 2 {
                return (*name).to_string();
            }
        }
    }

    city.to_string()
}

/// Upper-case each letter that follows a non-letter, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
