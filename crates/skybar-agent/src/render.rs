//! Rendering boundary.
//!
//! The pipeline hands over the finished timeline after each run; what the
//! receiver draws with it is its own business. `TextRenderer` writes a
//! plain-text rendition of the status line and timeline rows.

use chrono::{DateTime, Local, TimeZone};
use skybar_weather::{PlaceInfo, WeatherData};

use crate::timeline::{DisplayEntry, EntryKind};

/// Receives the finished timeline after each pipeline run.
///
/// Invoked from the coordinator task only, after the snapshot for that
/// run is fully updated.
pub trait Renderer: Send {
    fn on_timeline_ready(
        &mut self,
        entries: &[DisplayEntry],
        weather: Option<&WeatherData>,
        place: Option<&PlaceInfo>,
    );
}

/// Writes the status line, place name, and timeline rows as plain text.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    fn on_timeline_ready(
        &mut self,
        entries: &[DisplayEntry],
        weather: Option<&WeatherData>,
        place: Option<&PlaceInfo>,
    ) {
        let Some(weather) = weather else {
            println!("(no weather data)");
            return;
        };

        println!("{}", status_line(weather));
        if let Some(name) = place.and_then(PlaceInfo::display_name) {
            println!("{name}");
        }
        for entry in entries {
            println!("  {}", entry_line(entry));
        }
    }
}

/// "21° and partly cloudy"
pub fn status_line(weather: &WeatherData) -> String {
    format!(
        "{:.0}° and {}",
        weather.current.temperature,
        weather.current.condition.description().to_lowercase()
    )
}

/// "10 am: 15° and clear", "sunrise ↑ 6:12 am", "sunset ↓ 8:45 pm"
pub fn entry_line(entry: &DisplayEntry) -> String {
    entry_line_in(entry, &Local)
}

fn entry_line_in<Tz: TimeZone>(entry: &DisplayEntry, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local: DateTime<Tz> = entry.timestamp.with_timezone(tz);
    match &entry.kind {
        EntryKind::Hourly(sample) => format!(
            "{}: {:.0}° and {}",
            local.format("%-I %P"),
            sample.temperature,
            sample.condition.description().to_lowercase()
        ),
        EntryKind::Sunrise => format!("sunrise ↑ {}", local.format("%-I:%M %P")),
        EntryKind::Sunset => format!("sunset ↓ {}", local.format("%-I:%M %P")),
    }
}
