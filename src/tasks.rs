use crate::error::Result;
use crate::feed::FeedClient;
use crate::notify::{emit_alerts, AlertSink, RecencyNotifier};
use crate::stats::QuakeStats;
use crate::types::{DataSource, Quake};
use chrono::Local;
use metrics::counter;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of one refresh cycle: the freshly normalized record set replaces
/// the previous one wholesale, plus the derived summary and alert count
#[derive(Debug, Serialize)]
pub struct RefreshOutcome {
    pub run_id: Uuid,
    pub quakes: Vec<Quake>,
    pub stats: QuakeStats,
    pub alerts_emitted: usize,
}

/// Fetch, summarize, and run the notifier once. The ledger lives in the
/// caller-owned notifier, so repeated cycles alert on each record at most
/// once per session.
pub async fn refresh_once(
    client: &FeedClient,
    notifier: &mut RecencyNotifier,
    sink: &dyn AlertSink,
    source: DataSource,
) -> Result<RefreshOutcome> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("refresh", %run_id, source = %source);
    let _enter = span.enter();

    let quakes = client.fetch(source).await?;
    let stats = QuakeStats::from_records(&quakes, Local::now().naive_local());

    let alerts = notifier.evaluate(&quakes, RecencyNotifier::wib_now());
    emit_alerts(sink, &alerts).await;

    Ok(RefreshOutcome {
        run_id,
        quakes,
        stats,
        alerts_emitted: alerts.len(),
    })
}

/// Periodic polling loop. A failed cycle is surfaced in the log and skipped;
/// the loop itself keeps running until the process is stopped.
pub async fn watch(
    client: &FeedClient,
    notifier: &mut RecencyNotifier,
    sink: &dyn AlertSink,
    source: DataSource,
    interval_seconds: u64,
) -> Result<()> {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_seconds.max(1)));
    info!(
        "Watching source '{}' every {} second(s)",
        source, interval_seconds
    );

    loop {
        ticker.tick().await;
        counter!("gempa_watch_cycles_total").increment(1);

        match refresh_once(client, notifier, sink, source).await {
            Ok(outcome) => {
                info!(
                    run_id = %outcome.run_id,
                    records = outcome.quakes.len(),
                    alerts = outcome.alerts_emitted,
                    "Refresh cycle complete"
                );
                println!(
                    "🔄 {} record(s), {} alert(s) - max M{:.1}",
                    outcome.stats.total, outcome.alerts_emitted, outcome.stats.max_magnitude
                );
            }
            Err(e) => {
                counter!("gempa_watch_errors_total").increment(1);
                error!("Refresh cycle failed: {}", e);
                println!("⚠️  Refresh failed: {}", e);
            }
        }
    }
}
