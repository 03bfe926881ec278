use weathercast_core::{DisplayContent, MainReadings, StoredCity, model::temperature_text};

/// Human-readable summary of a lookup, optionally followed by the raw readings.
pub fn render(content: &DisplayContent, details: Option<&MainReadings>) -> String {
    let card = &content.card;

    let mut out = format!("{}\n  {}, {}", content.title, card.temperature_text, card.description_text);
    if !card.icon.is_empty() {
        out.push_str(&format!(" [{}]", card.icon));
    }

    if let Some(main) = details {
        out.push_str(&format!(
            "\n  Feels like: {}\n  Low/High:   {} / {}\n  Humidity:   {}%\n  Pressure:   {} hPa",
            temperature_text(main.feels_like),
            temperature_text(main.temp_min),
            temperature_text(main.temp_max),
            main.humidity,
            main.pressure,
        ));
    }

    out
}

pub fn render_last_city(state: &StoredCity) -> String {
    match (&state.last_searched_city, state.searched_at) {
        (Some(city), Some(at)) => format!("{city} (searched {})", at.format("%Y-%m-%d %H:%M UTC")),
        (Some(city), None) => city.clone(),
        (None, _) => "No city searched yet".to_string(),
    }
}
