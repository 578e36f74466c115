//! Timeline construction: merges hourly forecast samples and sun events
//! into one deduplicated, time-ordered, windowed sequence.
//!
//! Pure functions over already-fetched data; nothing here touches the
//! network or the wall clock.

use chrono::{DateTime, Duration, Utc};
use skybar_weather::{HourlySample, WeatherData};
use std::collections::BTreeMap;

/// Entries older than this many minutes before now are dropped.
const STALE_AFTER_MINUTES: i64 = 15;

/// Maximum gap between consecutive shown entries, in seconds.
const MAX_GAP_SECONDS: i64 = 3600;

/// One timeline row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Hourly(HourlySample),
    Sunrise,
    Sunset,
}

/// Normalize a forecast into display entries keyed by timestamp.
///
/// Hourly samples are inserted first, then sun events; on an exact
/// timestamp collision the later insert wins, so a sunrise or sunset
/// replaces an hourly sample sharing its instant.
pub fn collect(weather: &WeatherData) -> BTreeMap<DateTime<Utc>, DisplayEntry> {
    let mut entries = BTreeMap::new();

    for sample in &weather.hourly {
        entries.insert(
            sample.time,
            DisplayEntry {
                timestamp: sample.time,
                kind: EntryKind::Hourly(sample.clone()),
            },
        );
    }

    for day in &weather.daily {
        if let Some(sunrise) = day.sunrise {
            entries.insert(
                sunrise,
                DisplayEntry {
                    timestamp: sunrise,
                    kind: EntryKind::Sunrise,
                },
            );
        }
        if let Some(sunset) = day.sunset {
            entries.insert(
                sunset,
                DisplayEntry {
                    timestamp: sunset,
                    kind: EntryKind::Sunset,
                },
            );
        }
    }

    entries
}

/// Drop stale entries and bound the timeline to an hourly rhythm.
///
/// The first entry surviving the 15-minute cutoff anchors the walk; each
/// later entry is shown only if it falls within an hour of the last shown
/// one. Hourly samples are at most an hour apart and always pass; sparse
/// sun events surface only near an already-shown entry.
pub fn filter_entries(
    entries: BTreeMap<DateTime<Utc>, DisplayEntry>,
    now: DateTime<Utc>,
) -> Vec<DisplayEntry> {
    let cutoff = now - Duration::minutes(STALE_AFTER_MINUTES);
    let max_gap = Duration::seconds(MAX_GAP_SECONDS);

    let mut selected: Vec<DisplayEntry> = Vec::new();
    let mut last_selected: Option<DateTime<Utc>> = None;

    // BTreeMap iterates in ascending timestamp order
    for (timestamp, entry) in entries {
        if timestamp < cutoff {
            continue;
        }

        match last_selected {
            Some(prev) if timestamp - prev > max_gap => continue,
            _ => {
                last_selected = Some(timestamp);
                selected.push(entry);
            }
        }
    }

    selected
}

/// Build the timeline for a (possibly absent) forecast.
///
/// Absent weather yields an empty sequence; the caller renders a
/// "no data" state. Pure and idempotent.
pub fn build(weather: Option<&WeatherData>, now: DateTime<Utc>) -> Vec<DisplayEntry> {
    match weather {
        Some(weather) => filter_entries(collect(weather), now),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use skybar_weather::{CurrentWeather, DailySunEvents, WeatherCondition};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 6, hour, minute, 0).unwrap()
    }

    fn sample(time: DateTime<Utc>) -> HourlySample {
        HourlySample {
            time,
            temperature: 15.0,
            condition: WeatherCondition::Clear,
            icon: "sun".to_string(),
        }
    }

    fn weather(
        hours: &[DateTime<Utc>],
        sun_events: &[(Option<DateTime<Utc>>, Option<DateTime<Utc>>)],
    ) -> WeatherData {
        WeatherData {
            current: CurrentWeather {
                temperature: 15.0,
                condition: WeatherCondition::Clear,
                icon: "sun".to_string(),
                updated_at: at(10, 0),
            },
            hourly: hours.iter().copied().map(sample).collect(),
            daily: sun_events
                .iter()
                .map(|(sunrise, sunset)| DailySunEvents {
                    date: NaiveDate::from_ymd_opt(2024, 8, 6).unwrap(),
                    sunrise: *sunrise,
                    sunset: *sunset,
                })
                .collect(),
            fetched_at: at(10, 0),
        }
    }

    #[test]
    fn test_collect_merges_both_streams_in_order() {
        let w = weather(
            &[at(11, 0), at(10, 0)],
            &[(Some(at(5, 30)), Some(at(20, 45)))],
        );
        let entries = collect(&w);

        let timestamps: Vec<_> = entries.keys().copied().collect();
        assert_eq!(
            timestamps,
            vec![at(5, 30), at(10, 0), at(11, 0), at(20, 45)]
        );
        assert_eq!(entries[&at(5, 30)].kind, EntryKind::Sunrise);
        assert_eq!(entries[&at(20, 45)].kind, EntryKind::Sunset);
    }

    #[test]
    fn test_collect_collision_keeps_sun_event() {
        let w = weather(&[at(11, 0)], &[(None, Some(at(11, 0)))]);
        let entries = collect(&w);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[&at(11, 0)].kind, EntryKind::Sunset);
    }

    #[test]
    fn test_filter_scenario_near_sunset_shown_far_hour_dropped() {
        // now = 10:05, hourly at 10:00 / 11:00 / 13:00, sunset at 10:40.
        // 10:00 survives the 15-minute cutoff, 10:40 and 11:00 chain within
        // an hour of it, and 13:00 is two hours past the last shown entry.
        let w = weather(
            &[at(10, 0), at(11, 0), at(13, 0)],
            &[(None, Some(at(10, 40)))],
        );
        let result = filter_entries(collect(&w), at(10, 5));

        let kinds: Vec<_> = result
            .iter()
            .map(|e| (e.timestamp, matches!(e.kind, EntryKind::Sunset)))
            .collect();
        assert_eq!(
            kinds,
            vec![(at(10, 0), false), (at(10, 40), true), (at(11, 0), false)]
        );
    }

    #[test]
    fn test_filter_drops_entries_older_than_fifteen_minutes() {
        let w = weather(&[at(9, 40), at(9, 55), at(10, 30)], &[]);
        let result = filter_entries(collect(&w), at(10, 5));

        let timestamps: Vec<_> = result.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![at(9, 55), at(10, 30)]);
    }

    #[test]
    fn test_filter_keeps_entry_exactly_at_cutoff() {
        let w = weather(&[at(9, 50)], &[]);
        let result = filter_entries(collect(&w), at(10, 5));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_filter_isolated_far_sun_event_not_shown() {
        // A lone sunset three hours out has no neighboring entry to chain
        // from, so it stays hidden
        let w = weather(&[at(10, 0), at(11, 0)], &[(None, Some(at(14, 0)))]);
        let result = filter_entries(collect(&w), at(10, 5));

        assert!(result.iter().all(|e| e.kind != EntryKind::Sunset));
    }

    #[test]
    fn test_filter_empty_input_is_empty_output() {
        assert!(filter_entries(BTreeMap::new(), at(10, 5)).is_empty());
    }

    #[test]
    fn test_filter_all_stale_is_empty_output() {
        let w = weather(&[at(6, 0), at(7, 0)], &[]);
        assert!(filter_entries(collect(&w), at(10, 5)).is_empty());
    }

    #[test]
    fn test_build_without_weather_is_empty() {
        assert!(build(None, at(10, 5)).is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let w = weather(
            &[at(10, 0), at(11, 0), at(12, 0)],
            &[(Some(at(5, 30)), Some(at(20, 45)))],
        );
        let first = build(Some(&w), at(10, 5));
        let second = build(Some(&w), at(10, 5));
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_output_strictly_ascending_without_duplicates() {
        let w = weather(
            &[at(12, 0), at(10, 0), at(11, 0)],
            &[(Some(at(10, 0)), Some(at(11, 30)))],
        );
        let result = build(Some(&w), at(10, 5));

        assert!(!result.is_empty());
        for pair in result.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_build_consecutive_gaps_within_an_hour() {
        let w = weather(
            &[at(10, 0), at(11, 0), at(12, 0), at(15, 0)],
            &[(None, Some(at(12, 30)))],
        );
        let result = build(Some(&w), at(10, 5));

        for pair in result.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp <= Duration::seconds(3600));
        }
    }
}
