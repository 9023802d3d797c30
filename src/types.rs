use crate::constants;
use crate::error::MonitorError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Envelope shared by every mirror endpoint. A `status: false` body is a
/// logical failure even when the HTTP status is 200.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Raw earthquake record as published by the agency feed. Field names follow
/// the upstream JSON exactly; everything is loosely typed as strings and
/// individual fields may be absent, so each defaults to empty rather than
/// failing the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuake {
    #[serde(rename = "Tanggal", default)]
    pub tanggal: String,
    #[serde(rename = "Jam", default)]
    pub jam: String,
    #[serde(rename = "DateTime", default)]
    pub date_time: String,
    #[serde(rename = "Coordinates", default)]
    pub coordinates: String,
    #[serde(rename = "Lintang", default)]
    pub lintang: String,
    #[serde(rename = "Bujur", default)]
    pub bujur: String,
    #[serde(rename = "Magnitude", default)]
    pub magnitude: String,
    #[serde(rename = "Kedalaman", default)]
    pub kedalaman: String,
    #[serde(rename = "Wilayah", default)]
    pub wilayah: String,
    #[serde(rename = "Dirasakan", default, skip_serializing_if = "Option::is_none")]
    pub dirasakan: Option<String>,
    #[serde(rename = "Potensi", default, skip_serializing_if = "Option::is_none")]
    pub potensi: Option<String>,
    #[serde(rename = "Shakemap", default, skip_serializing_if = "Option::is_none")]
    pub shakemap: Option<String>,
}

/// Sub-feeds carried by the composite endpoint. Any of the three may be
/// missing from a given payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompositeData {
    #[serde(default)]
    pub latest: Option<RawQuake>,
    #[serde(default)]
    pub latest15: Option<Vec<RawQuake>>,
    #[serde(default)]
    pub felt: Option<Vec<RawQuake>>,
}

/// The upstream payload shapes, one variant per selector mode.
#[derive(Debug, Clone)]
pub enum FeedData {
    Single(RawQuake),
    List(Vec<RawQuake>),
    Composite(CompositeData),
}

/// Selector identifying which upstream endpoint and payload shape to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Latest,
    Latest15,
    Felt,
    All,
}

impl DataSource {
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Latest => constants::LATEST_SOURCE,
            DataSource::Latest15 => constants::LATEST15_SOURCE,
            DataSource::Felt => constants::FELT_SOURCE,
            DataSource::All => constants::ALL_SOURCE,
        }
    }

    /// Indonesian label as shown in the source picker
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Latest => "Gempa Terbaru",
            DataSource::Latest15 => "15 Gempa Terbaru",
            DataSource::Felt => "Gempa Dirasakan",
            DataSource::All => "Semua Data",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DataSource::Latest => "Gempa bumi terbaru yang tercatat",
            DataSource::Latest15 => "15 gempa bumi terbaru yang tercatat",
            DataSource::Felt => "Gempa bumi yang dirasakan masyarakat",
            DataSource::All => "Gabungan semua data gempa bumi",
        }
    }

    pub fn all_options() -> [DataSource; 4] {
        [
            DataSource::Latest,
            DataSource::Latest15,
            DataSource::Felt,
            DataSource::All,
        ]
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataSource {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            constants::LATEST_SOURCE => Ok(DataSource::Latest),
            // The mirror spells this endpoint "latest-15"; accept both
            constants::LATEST15_SOURCE | "latest-15" => Ok(DataSource::Latest15),
            constants::FELT_SOURCE => Ok(DataSource::Felt),
            constants::ALL_SOURCE => Ok(DataSource::All),
            other => Err(MonitorError::Config(format!(
                "Unknown data source '{}'. Available: {}",
                other,
                constants::supported_sources().join(", ")
            ))),
        }
    }
}

/// Canonical earthquake record used throughout the rest of the system.
/// Created fresh on every fetch cycle and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Quake {
    /// Stable per logical event within one fetch: source tag + raw identity
    /// string + position in the source array
    pub id: String,
    /// Original locale date string, verbatim for display
    pub date: String,
    /// Original locale time string, verbatim for display
    pub time: String,
    /// Parsed date+time as local wall-clock; no offset math applied here
    pub occurred_at: NaiveDateTime,
    pub location: String,
    /// Parsed magnitude, 0.0 when the raw string is unparsable
    pub magnitude: f64,
    /// Parsed depth in km, 0.0 when the raw string is unparsable
    pub depth_km: f64,
    /// Split from the combined coordinate string; NaN propagates on
    /// malformed input
    pub latitude: f64,
    pub longitude: f64,
    pub felt: String,
    /// Original combined "lat,lon" string, verbatim
    pub coordinates: String,
    pub potential: Option<String>,
    pub shakemap: Option<String>,
}

/// Sort keys for record-list rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Magnitude,
    Depth,
    Location,
}

impl FromStr for SortField {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date" => Ok(SortField::Date),
            "magnitude" => Ok(SortField::Magnitude),
            "depth" => Ok(SortField::Depth),
            "location" => Ok(SortField::Location),
            other => Err(MonitorError::Config(format!(
                "Unknown sort field '{}'. Available: date, magnitude, depth, location",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(MonitorError::Config(format!(
                "Unknown sort order '{}'. Available: asc, desc",
                other
            ))),
        }
    }
}
