//! Plain-text rendering of the display snapshot and widget timeline.

use std::fmt::Write;

use clima_core::{DisplayState, WidgetTimeline};

pub fn display(state: &DisplayState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", state.city_label);
    let _ = writeln!(out, "  {}  [{}]", state.temperature(), state.icon_category());
    let _ = writeln!(out, "  Sensación: {}", state.feels_like());
    let _ = writeln!(out, "  Humedad:   {}", state.humidity());
    let _ = writeln!(out, "  Viento:    {}", state.wind_speed());
    let _ = writeln!(out, "  Mapa:      {}", state.region.center);

    let cards = state.forecast_cards();
    if !cards.is_empty() {
        let _ = writeln!(out, "Pronóstico:");
        for card in cards {
            let _ = writeln!(out, "  {:<10} {:>6}  {}", card.label, card.temperature, card.category);
        }
    }

    out.trim_end().to_string()
}

pub fn timeline(timeline: &WidgetTimeline) -> String {
    let mut out = String::new();
    for entry in &timeline.entries {
        let _ = writeln!(out, "{}  {}", entry.city, entry.temperature);
    }
    let _ = write!(out, "next refresh: {}", timeline.next_refresh.format("%Y-%m-%d %H:%M UTC"));
    out
}
