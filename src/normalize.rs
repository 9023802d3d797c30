use crate::constants::NOT_FELT_PLACEHOLDER;
use crate::types::{CompositeData, FeedData, Quake, RawQuake};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

/// Month abbreviations as used by the agency date strings, in calendar order
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Strips everything that is not a digit or decimal point from depth strings
static DEPTH_SANITIZER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.]").unwrap());

fn month_number(abbreviation: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == abbreviation)
        .map(|i| i as u32 + 1)
}

fn try_parse_datetime(date_str: &str, time_str: &str) -> Option<NaiveDateTime> {
    // Date arrives as "12 Des 2023": day, month abbreviation, year
    let date_parts: Vec<&str> = date_str.trim().split(' ').collect();
    if date_parts.len() != 3 {
        return None;
    }
    let day: u32 = date_parts[0].parse().ok()?;
    let month = month_number(date_parts[1])?;
    let year: i32 = date_parts[2].parse().ok()?;

    // Time arrives as "10:30:45 WIB"; the timezone label is discarded
    let time_part = time_str.split(' ').next().unwrap_or("");
    let time_parts: Vec<&str> = time_part.split(':').collect();
    if time_parts.len() < 2 {
        return None;
    }
    let hour: u32 = time_parts[0].parse().ok()?;
    let minute: u32 = time_parts[1].parse().ok()?;
    let second: u32 = time_parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(NaiveDateTime::new(date, time))
}

/// Parse the agency's locale date/time pair into a local wall-clock
/// timestamp. No timezone offset is applied here; the notifier's WIB clock
/// is a separate concern. Unparsable input falls back to the current
/// wall-clock time and is logged, never surfaced.
pub fn parse_feed_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
    match try_parse_datetime(date_str, time_str) {
        Some(parsed) => parsed,
        None => {
            warn!(
                "Could not parse feed date/time '{} {}', falling back to now",
                date_str, time_str
            );
            Local::now().naive_local()
        }
    }
}

fn parse_magnitude(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn parse_depth_km(raw: &str) -> f64 {
    DEPTH_SANITIZER
        .replace_all(raw, "")
        .parse()
        .unwrap_or(0.0)
}

/// Split the combined "lat,lon" string on its first comma and parse each
/// side independently. A malformed side stays NaN; coordinates are the one
/// field pair with no substitute default.
fn parse_coordinates(raw: &str) -> (f64, f64) {
    let mut parts = raw.splitn(2, ',');
    let latitude = parts
        .next()
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .unwrap_or(f64::NAN);
    let longitude = parts
        .next()
        .map(|s| s.trim().parse().unwrap_or(f64::NAN))
        .unwrap_or(f64::NAN);
    (latitude, longitude)
}

/// Convert one raw record into the canonical shape. Field-level parse
/// failures become the documented defaults; this never fails the batch.
pub fn normalize_record(source_tag: &str, raw: &RawQuake, index: usize) -> Quake {
    let (latitude, longitude) = parse_coordinates(&raw.coordinates);

    let felt = match raw.dirasakan.as_deref() {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => NOT_FELT_PLACEHOLDER.to_string(),
    };

    Quake {
        id: format!("{}-{}-{}", source_tag, raw.date_time, index),
        date: raw.tanggal.clone(),
        time: raw.jam.clone(),
        occurred_at: parse_feed_datetime(&raw.tanggal, &raw.jam),
        location: raw.wilayah.clone(),
        magnitude: parse_magnitude(&raw.magnitude),
        depth_km: parse_depth_km(&raw.kedalaman),
        latitude,
        longitude,
        felt,
        coordinates: raw.coordinates.clone(),
        potential: raw.potensi.clone(),
        shakemap: raw.shakemap.clone(),
    }
}

/// Normalize an ordered list, preserving the order of the raw array
pub fn normalize_list(source_tag: &str, raws: &[RawQuake]) -> Vec<Quake> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| normalize_record(source_tag, raw, index))
        .collect()
}

/// Merge the composite payload's three sub-feeds in fixed order: the single
/// latest record first, then the latest-15 list, then felt reports. A felt
/// entry whose identity string already appeared in the earlier passes is
/// dropped; index positions keep counting across the skip so surviving ids
/// match their position in the merged sequence.
pub fn normalize_composite(source_tag: &str, data: &CompositeData) -> Vec<Quake> {
    let mut merged: Vec<Quake> = Vec::new();
    let mut seen_identities: HashSet<String> = HashSet::new();

    if let Some(latest) = &data.latest {
        seen_identities.insert(latest.date_time.clone());
        merged.push(normalize_record(source_tag, latest, 0));
    }

    if let Some(latest15) = &data.latest15 {
        for (index, raw) in latest15.iter().enumerate() {
            seen_identities.insert(raw.date_time.clone());
            merged.push(normalize_record(source_tag, raw, index + 1));
        }
    }

    if let Some(felt) = &data.felt {
        let base = merged.len();
        for (index, raw) in felt.iter().enumerate() {
            if seen_identities.contains(&raw.date_time) {
                continue;
            }
            merged.push(normalize_record(source_tag, raw, index + base));
        }
    }

    merged
}

/// Normalize a decoded payload into the ordered canonical sequence
pub fn normalize_feed(source_tag: &str, data: &FeedData) -> Vec<Quake> {
    match data {
        FeedData::Single(raw) => vec![normalize_record(source_tag, raw, 0)],
        FeedData::List(raws) => normalize_list(source_tag, raws),
        FeedData::Composite(composite) => normalize_composite(source_tag, composite),
    }
}
