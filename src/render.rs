//! Plain-text presentation of a search
use std::fmt::Write;

use crate::converter::ConversionResult;
use crate::model::GridCoords;
use crate::session::SearchState;

pub fn render_state(state: &SearchState) -> String {
    match state {
        SearchState::Idle => {
            "Enter a South Korean bus stop ID (e.g. 01141) to get Minecraft 1:1 coordinates.".to_string()
        }
        SearchState::Loading { stop_id, .. } => format!("Resolving bus stop {stop_id}..."),
        SearchState::Failure { message } => format!("⚠️  {message}"),
        SearchState::Success(result) => render_result(result),
    }
}

pub fn render_result(result: &ConversionResult) -> String {
    let stop = &result.stop;
    let mut out = String::new();

    // Writing to a String can't fail
    _ = writeln!(out, "📍 {}", stop.name());
    _ = writeln!(
        out,
        "   {} (ID: {})",
        stop.city().unwrap_or("Unknown City"),
        stop.id()
    );
    if let Some(description) = stop.description() {
        _ = writeln!(out, "   {description}");
    }
    _ = writeln!(out, "   Latitude   {:.6}", stop.latitude());
    _ = writeln!(out, "   Longitude  {:.6}", stop.longitude());

    if !result.sources.is_empty() {
        _ = writeln!(out, "\n   Data sources");
        for source in &result.sources {
            _ = writeln!(out, "   - {} <{}>", source.title, source.uri);
        }
    }

    _ = writeln!(out);
    out.push_str(&render_coords(&result.coords));

    out
}

pub fn render_coords(coords: &GridCoords) -> String {
    format!(
        "🧱 X {}  Y {}  Z {}\n   {}\n   * Relative to {} at (0, {}, 0). Scales assume 1 block = 1 meter.\n",
        coords.x,
        coords.y,
        coords.z,
        coords.teleport_command(),
        coords.origin_name,
        coords.y
    )
}
