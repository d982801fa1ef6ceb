//! Clothing advice from temperature and sky conditions.

/// Recommend clothing for a temperature (Celsius) and condition label.
///
/// Brackets are evaluated highest-first with inclusive lower bounds. Extra
/// items are added independently for rain, snow, wind or cold, and sun.
pub fn recommend_clothing(temp_c: f64, condition: &str, is_rainy: bool) -> String {
    let base = if temp_c >= 25.0 {
        "👕 Light clothing: T-shirt, shorts, sandals"
    } else if temp_c >= 20.0 {
        "👔 Comfortable clothing: Light shirt, pants, sneakers"
    } else if temp_c >= 15.0 {
        "🧥 Light layers: Long sleeves, light jacket, pants"
    } else if temp_c >= 10.0 {
        "🧥 Warm layers: Sweater or hoodie, jacket, long pants"
    } else if temp_c >= 5.0 {
        "🧥 Winter clothing: Warm coat, layers, gloves"
    } else {
        "❄️ Heavy winter gear: Heavy coat, hat, gloves, warm boots"
    };

    let condition = condition.to_lowercase();
    let mentions = |word: &str| condition.contains(word);

    let mut additions = Vec::new();

    if is_rainy || mentions("rain") || mentions("drizzle") || mentions("showers") {
        additions.push("☔ Umbrella or rain jacket");
    }

    if mentions("snow") {
        additions.push("❄️ Waterproof boots, extra layers");
    }

    if mentions("wind") || temp_c < 10.0 {
        additions.push("🌬️ Windbreaker or scarf");
    }

    if mentions("sunny") || mentions("clear") {
        additions.push("🕶️ Sunglasses, sunscreen");
    }

    if additions.is_empty() {
        base.to_string()
    } else {
        format!("{}\n👗 **Also bring:** {}", base, additions.join(", "))
    }
}
