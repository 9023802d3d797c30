use crate::config::NotifierConfig;
use crate::constants::{LEDGER_CAP, LEDGER_EVICT, WIB_UTC_OFFSET_HOURS};
use crate::error::Result;
use crate::types::Quake;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use metrics::counter;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Whether the alerting capability has been granted by the environment.
/// This is advisory only; evaluation degrades to a no-op without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPermission {
    Granted,
    Denied,
    Default,
}

/// Bounded set of record ids already alerted on, in insertion order.
/// Entries are never refreshed; eviction is strictly FIFO.
#[derive(Debug)]
pub struct NotificationLedger {
    order: Vec<String>,
    ids: HashSet<String>,
    cap: usize,
    evict: usize,
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::with_bounds(LEDGER_CAP, LEDGER_EVICT)
    }

    pub fn with_bounds(cap: usize, evict: usize) -> Self {
        Self {
            order: Vec::new(),
            ids: HashSet::new(),
            cap,
            evict,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record an id and run eviction. Re-inserting a known id does not
    /// extend its life.
    pub fn insert(&mut self, id: &str) {
        if self.ids.insert(id.to_string()) {
            self.order.push(id.to_string());
        }
        if self.order.len() > self.cap {
            let drop_count = self.evict.min(self.order.len());
            for old in self.order.drain(..drop_count) {
                self.ids.remove(&old);
            }
            debug!(
                "Evicted {} oldest ledger entries, {} remain",
                drop_count,
                self.order.len()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn reset(&mut self) {
        self.order.clear();
        self.ids.clear();
    }
}

/// A request to raise one user-facing alert for a significant recent event
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// De-duplication tag, equal to the record id
    pub tag: String,
    /// Deep link back into the monitoring view
    pub link: String,
    pub magnitude: f64,
    pub location: String,
}

impl Alert {
    fn for_quake(quake: &Quake) -> Self {
        Self {
            title: format!("🚨 Gempa Bumi M{:.1}", quake.magnitude),
            body: format!(
                "{}\n📅 {} {}\n📏 Kedalaman: {} km",
                quake.location, quake.date, quake.time, quake.depth_km
            ),
            icon: "/earthquake-icon.png".to_string(),
            tag: quake.id.clone(),
            link: format!("/monitor?gempa={}", quake.id),
            magnitude: quake.magnitude,
            location: quake.location.clone(),
        }
    }
}

/// Delivery seam for alerts. A sink failure is logged and swallowed so the
/// refresh cycle is never broken by the alerting capability.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<()>;
}

/// Default sink that surfaces alerts through the structured log
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn deliver(&self, alert: &Alert) -> Result<()> {
        info!(
            tag = %alert.tag,
            magnitude = alert.magnitude,
            "ALERT {} - {}",
            alert.title,
            alert.location
        );
        Ok(())
    }
}

/// Decides which normalized records warrant a user-facing alert, emits at
/// most one alert per record per session, and keeps the ledger bounded.
/// Owned by the caller and passed around explicitly; there is no global
/// notifier state.
#[derive(Debug)]
pub struct RecencyNotifier {
    ledger: NotificationLedger,
    permission: AlertPermission,
    min_magnitude: f64,
    recency: Duration,
}

impl RecencyNotifier {
    pub fn new(permission: AlertPermission, config: &NotifierConfig) -> Self {
        Self {
            ledger: NotificationLedger::with_bounds(config.ledger_cap, config.ledger_evict),
            permission,
            min_magnitude: config.min_magnitude,
            recency: Duration::minutes(config.recency_minutes),
        }
    }

    pub fn set_permission(&mut self, permission: AlertPermission) {
        self.permission = permission;
    }

    pub fn permission(&self) -> AlertPermission {
        self.permission
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    pub fn reset(&mut self) {
        self.ledger.reset();
    }

    /// Current time on the WIB clock: UTC now plus the fixed +7h offset.
    /// Record timestamps were parsed as local wall-clock without an offset,
    /// so the two are only directly comparable on a host running in the
    /// +7h zone (a preserved quirk of the feed's convention).
    pub fn wib_now() -> NaiveDateTime {
        Utc::now().naive_utc() + Duration::hours(WIB_UTC_OFFSET_HOURS)
    }

    pub fn is_recent(&self, occurred_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        occurred_at >= now - self.recency
    }

    /// Evaluate the current record set against the ledger. Returns the
    /// alerts to emit; each returned record's id has been added to the
    /// ledger, so a repeated evaluation returns nothing new.
    pub fn evaluate(&mut self, quakes: &[Quake], now: NaiveDateTime) -> Vec<Alert> {
        if self.permission != AlertPermission::Granted {
            debug!("Alert permission not granted, skipping evaluation");
            return Vec::new();
        }

        let mut alerts = Vec::new();
        for quake in quakes {
            if self.ledger.contains(&quake.id) {
                continue;
            }
            if quake.magnitude < self.min_magnitude {
                continue;
            }
            if !self.is_recent(quake.occurred_at, now) {
                continue;
            }

            alerts.push(Alert::for_quake(quake));
            self.ledger.insert(&quake.id);
        }

        if !alerts.is_empty() {
            counter!("gempa_alerts_emitted_total").increment(alerts.len() as u64);
            info!(
                "{} earthquake(s) qualified for alerting, ledger size {}",
                alerts.len(),
                self.ledger.len()
            );
        }
        alerts
    }
}

/// Hand each alert to the sink; delivery failure degrades to a no-op
pub async fn emit_alerts(sink: &dyn AlertSink, alerts: &[Alert]) {
    for alert in alerts {
        if let Err(e) = sink.deliver(alert).await {
            warn!(tag = %alert.tag, "Alert delivery failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier_config() -> NotifierConfig {
        NotifierConfig::default()
    }

    fn quake(id: &str, magnitude: f64, occurred_at: NaiveDateTime) -> Quake {
        Quake {
            id: id.to_string(),
            date: "12 Des 2023".to_string(),
            time: "10:30:45 WIB".to_string(),
            occurred_at,
            location: "Banten".to_string(),
            magnitude,
            depth_km: 10.0,
            latitude: -6.21,
            longitude: 106.85,
            felt: "Tidak dirasakan".to_string(),
            coordinates: "-6.21,106.85".to_string(),
            potential: None,
            shakemap: None,
        }
    }

    #[test]
    fn ledger_eviction_drops_fifty_oldest() {
        let mut ledger = NotificationLedger::with_bounds(60, 50);
        for i in 1..=60 {
            ledger.insert(&format!("id{}", i));
        }
        assert_eq!(ledger.len(), 60);

        ledger.insert("id61");
        assert_eq!(ledger.len(), 11);

        // the 10 most recently inserted of the original 60 survive, plus the
        // new entry
        for i in 51..=61 {
            assert!(ledger.contains(&format!("id{}", i)), "id{} missing", i);
        }
        for i in 1..=50 {
            assert!(!ledger.contains(&format!("id{}", i)), "id{} retained", i);
        }
    }

    #[test]
    fn ledger_reinsertion_does_not_refresh_position() {
        let mut ledger = NotificationLedger::with_bounds(3, 2);
        ledger.insert("a");
        ledger.insert("b");
        ledger.insert("a");
        ledger.insert("c");
        assert_eq!(ledger.len(), 3);

        // "a" is still oldest, so the next eviction takes it first
        ledger.insert("d");
        assert!(!ledger.contains("a"));
        assert!(!ledger.contains("b"));
        assert!(ledger.contains("c"));
        assert!(ledger.contains("d"));
    }

    #[test]
    fn ledger_reset_clears_everything() {
        let mut ledger = NotificationLedger::new();
        ledger.insert("a");
        ledger.reset();
        assert!(ledger.is_empty());
        assert!(!ledger.contains("a"));
    }

    #[test]
    fn evaluation_is_a_noop_without_permission() {
        let now = RecencyNotifier::wib_now();
        let quakes = vec![quake("q1", 6.0, now)];

        let mut notifier = RecencyNotifier::new(AlertPermission::Denied, &notifier_config());
        assert!(notifier.evaluate(&quakes, now).is_empty());
        assert!(notifier.ledger().is_empty());

        let mut notifier = RecencyNotifier::new(AlertPermission::Default, &notifier_config());
        assert!(notifier.evaluate(&quakes, now).is_empty());
    }

    #[test]
    fn below_threshold_never_alerts() {
        let now = RecencyNotifier::wib_now();
        let one_minute_ago = now - Duration::minutes(1);
        let quakes = vec![quake("q1", 3.9, one_minute_ago)];

        let mut notifier = RecencyNotifier::new(AlertPermission::Granted, &notifier_config());
        assert!(notifier.evaluate(&quakes, now).is_empty());
    }

    #[test]
    fn recent_significant_quake_alerts_exactly_once() {
        let now = RecencyNotifier::wib_now();
        let nine_minutes_ago = now - Duration::minutes(9);
        let quakes = vec![quake("q1", 4.0, nine_minutes_ago)];

        let mut notifier = RecencyNotifier::new(AlertPermission::Granted, &notifier_config());
        let first = notifier.evaluate(&quakes, now);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].tag, "q1");

        let second = notifier.evaluate(&quakes, now);
        assert!(second.is_empty());
    }

    #[test]
    fn stale_quake_does_not_alert() {
        let now = RecencyNotifier::wib_now();
        let eleven_minutes_ago = now - Duration::minutes(11);
        let quakes = vec![quake("q1", 6.5, eleven_minutes_ago)];

        let mut notifier = RecencyNotifier::new(AlertPermission::Granted, &notifier_config());
        assert!(notifier.evaluate(&quakes, now).is_empty());
    }

    #[test]
    fn alert_carries_correlation_tag_and_deep_link() {
        let now = RecencyNotifier::wib_now();
        let quakes = vec![quake("local-x-0", 5.3, now)];

        let mut notifier = RecencyNotifier::new(AlertPermission::Granted, &notifier_config());
        let alerts = notifier.evaluate(&quakes, now);
        assert_eq!(alerts.len(), 1);

        let alert = &alerts[0];
        assert_eq!(alert.title, "🚨 Gempa Bumi M5.3");
        assert!(alert.body.contains("Banten"));
        assert!(alert.body.contains("12 Des 2023"));
        assert!(alert.body.contains("10:30:45 WIB"));
        assert!(alert.body.contains("10 km"));
        assert_eq!(alert.tag, "local-x-0");
        assert_eq!(alert.link, "/monitor?gempa=local-x-0");
    }

    #[tokio::test]
    async fn log_sink_accepts_alerts() {
        let now = RecencyNotifier::wib_now();
        let mut notifier = RecencyNotifier::new(AlertPermission::Granted, &notifier_config());
        let alerts = notifier.evaluate(&[quake("q1", 4.5, now)], now);

        // Delivery never propagates an error into the refresh cycle
        emit_alerts(&LogAlertSink, &alerts).await;
    }
}
