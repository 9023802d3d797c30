use clap::{Parser, Subcommand};
use tracing::{error, info};

mod config;
mod constants;
mod error;
mod feed;
mod logging;
mod normalize;
mod notify;
mod render;
mod stats;
mod tasks;
mod types;

use crate::config::Config;
use crate::feed::FeedClient;
use crate::notify::{AlertPermission, LogAlertSink, RecencyNotifier};
use crate::stats::QuakeStats;
use crate::types::{DataSource, SortField, SortOrder};
use chrono::Local;

#[derive(Parser)]
#[command(name = "gempa_monitor")]
#[command(about = "BMKG earthquake feed monitor for Indonesia")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one batch of records and print them
    Fetch {
        /// Data source to query. Available: latest, latest15, felt, all
        #[arg(long, default_value = constants::FELT_SOURCE)]
        source: String,
        /// Sort field: date, magnitude, depth, location
        #[arg(long, default_value = "date")]
        sort: String,
        /// Sort order: asc, desc
        #[arg(long, default_value = "desc")]
        order: String,
        /// Keep only records with magnitude >= this value
        #[arg(long)]
        min_magnitude: Option<f64>,
        /// Keep only records with magnitude <= this value
        #[arg(long)]
        max_magnitude: Option<f64>,
    },
    /// Poll a source periodically and alert on recent significant events
    Watch {
        /// Data source to poll. Available: latest, latest15, felt, all
        #[arg(long, default_value = constants::ALL_SOURCE)]
        source: String,
        /// Seconds between refresh cycles (defaults to the config value)
        #[arg(long)]
        interval: Option<u64>,
        /// Run the notifier without the alert capability (dry run)
        #[arg(long)]
        no_alerts: bool,
    },
    /// Fetch once and print only the statistics summary
    Stats {
        /// Data source to query. Available: latest, latest15, felt, all
        #[arg(long, default_value = constants::ALL_SOURCE)]
        source: String,
    },
    /// List the available data sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Fetch {
            source,
            sort,
            order,
            min_magnitude,
            max_magnitude,
        } => {
            let source: DataSource = source.parse()?;
            let sort: SortField = sort.parse()?;
            let order: SortOrder = order.parse()?;

            println!("📥 Fetching '{}' ({})...", source, source.label());
            let client = FeedClient::new(config.feed)?;

            match client.fetch(source).await {
                Ok(quakes) => {
                    let now = Local::now().naive_local();
                    let filtered = render::filter_by_magnitude(
                        &quakes,
                        min_magnitude.unwrap_or(0.0),
                        max_magnitude.unwrap_or(10.0),
                    );
                    let sorted = render::sort_quakes(&filtered, sort, order);

                    println!("\n🌍 {} gempa bumi:", sorted.len());
                    render::print_records(&sorted, now);
                    render::print_stats(&QuakeStats::from_records(&sorted, now));
                }
                Err(e) => {
                    error!("Fetch failed: {}", e);
                    println!("❌ Fetch failed: {}", e);
                }
            }
        }
        Commands::Watch {
            source,
            interval,
            no_alerts,
        } => {
            let source: DataSource = source.parse()?;
            let interval = interval.unwrap_or(config.watch.interval_seconds);

            let permission = if no_alerts {
                AlertPermission::Denied
            } else {
                AlertPermission::Granted
            };

            println!(
                "🚀 Watching '{}' every {}s (alerts {})...",
                source,
                interval,
                if no_alerts { "off" } else { "on" }
            );
            info!("Starting watch loop");

            let client = FeedClient::new(config.feed)?;
            let mut notifier = RecencyNotifier::new(permission, &config.notifier);
            tasks::watch(&client, &mut notifier, &LogAlertSink, source, interval).await?;
        }
        Commands::Stats { source } => {
            let source: DataSource = source.parse()?;
            let client = FeedClient::new(config.feed)?;

            match client.fetch(source).await {
                Ok(quakes) => {
                    let stats = QuakeStats::from_records(&quakes, Local::now().naive_local());
                    render::print_stats(&stats);
                }
                Err(e) => {
                    error!("Stats fetch failed: {}", e);
                    println!("❌ Stats fetch failed: {}", e);
                }
            }
        }
        Commands::Sources => {
            println!("📡 Available data sources:");
            for option in DataSource::all_options() {
                println!(
                    "   {:10} {} - {}",
                    option.name(),
                    option.label(),
                    option.description()
                );
            }
        }
    }
    Ok(())
}
