/// Data source name constants to ensure consistency across the codebase.
/// These are the selector values accepted on the CLI and used in derived
/// record ids.

// Selector names (used in CLI and endpoint routing)
pub const LATEST_SOURCE: &str = "latest";
pub const LATEST15_SOURCE: &str = "latest15";
pub const FELT_SOURCE: &str = "felt";
pub const ALL_SOURCE: &str = "all";

// Id prefixes identifying which upstream produced a record
pub const MIRROR_SOURCE_TAG: &str = "local";
pub const AGENCY_SOURCE_TAG: &str = "bmkg";

/// Placeholder used when the feed carries no felt report for a record
pub const NOT_FELT_PLACEHOLDER: &str = "Tidak dirasakan";

/// WIB (Waktu Indonesia Barat) offset from UTC, in hours. Applied by the
/// notifier's clock only, never during record parsing.
pub const WIB_UTC_OFFSET_HOURS: i64 = 7;

/// Magnitude at or above which a recent event qualifies for alerting
pub const ALERT_MAGNITUDE_THRESHOLD: f64 = 4.0;

/// Window within which an event counts as recent for alerting, in minutes
pub const ALERT_RECENCY_MINUTES: i64 = 10;

/// Ledger size above which eviction runs, and how many oldest ids it drops
pub const LEDGER_CAP: usize = 100;
pub const LEDGER_EVICT: usize = 50;

/// Get all supported source selector names
pub fn supported_sources() -> Vec<&'static str> {
    vec![LATEST_SOURCE, LATEST15_SOURCE, FELT_SOURCE, ALL_SOURCE]
}
