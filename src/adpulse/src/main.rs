//! adpulse: aggregate saved ads-reporting responses into dashboard metrics.
//!
//! Each `--input` file is one fetched day. Files are loaded concurrently,
//! unreadable days are skipped, and the requested view is printed as JSON.

use adpulse_collector::{collect_all, source::load_response_file};
use adpulse_core::config::{AppConfig, RevenueMode};
use adpulse_reporting::{BreakdownKind, InsightsStore, MetricsAggregator, ReportViews, RevenueStrategy};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "adpulse")]
#[command(about = "Aggregate ad-campaign reporting data into dashboard metrics")]
#[command(version)]
struct Cli {
    /// View to print
    #[arg(value_enum)]
    view: View,

    /// Reporting response files, one per fetched day
    #[arg(short, long = "input", required = true, num_args = 1..)]
    inputs: Vec<String>,

    /// Config file (defaults to ./adpulse.toml when present)
    #[arg(long, env = "ADPULSE_CONFIG")]
    config: Option<String>,

    /// Account the snapshot is published under
    #[arg(long, default_value = "default")]
    account: String,

    /// Revenue mode (overrides config)
    #[arg(long, value_enum)]
    revenue: Option<RevenueArg>,

    /// Include empty categories in breakdown views
    #[arg(long, default_value_t = false)]
    complete: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    Overall,
    Markets,
    Daily,
    Campaigns,
    Records,
    Age,
    Gender,
    Device,
    Snapshot,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RevenueArg {
    None,
    Reported,
    Estimated,
}

impl From<RevenueArg> for RevenueMode {
    fn from(arg: RevenueArg) -> Self {
        match arg {
            RevenueArg::None => RevenueMode::None,
            RevenueArg::Reported => RevenueMode::Reported,
            RevenueArg::Estimated => RevenueMode::Estimated,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adpulse=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    };

    if let Some(revenue) = cli.revenue {
        config.revenue.mode = revenue.into();
    }
    if cli.complete {
        config.report.complete_categories = true;
    }
    config.validate()?;

    info!(
        inputs = cli.inputs.len(),
        revenue_mode = ?config.revenue.mode,
        max_concurrent_fetches = config.collector.max_concurrent_fetches,
        "Configuration loaded"
    );

    let report = collect_all(
        cli.inputs.clone(),
        config.collector.max_concurrent_fetches,
        |path| load_response_file(path),
    )
    .await;
    if !report.is_complete() {
        warn!(failed = ?report.failed, "Some inputs were skipped");
    }
    let records = report.records;

    let strategy = RevenueStrategy::from_config(&config.revenue);
    let views = ReportViews::with_aggregator(MetricsAggregator::with_policy(strategy));
    let complete = config.report.complete_categories;

    let output = match cli.view {
        View::Overall => serde_json::to_value(views.overall(&records))?,
        View::Markets => serde_json::to_value(views.markets(&records))?,
        View::Daily => serde_json::to_value(views.daily_series(&records))?,
        View::Campaigns => serde_json::to_value(views.campaign_table(&records))?,
        View::Records => serde_json::to_value(views.record_table(&records))?,
        View::Age => serde_json::to_value(views.breakdown(&records, BreakdownKind::Age, complete))?,
        View::Gender => {
            serde_json::to_value(views.breakdown(&records, BreakdownKind::Gender, complete))?
        }
        View::Device => {
            serde_json::to_value(views.breakdown(&records, BreakdownKind::Device, complete))?
        }
        View::Snapshot => {
            let store = InsightsStore::new();
            store.publish(views.snapshot(&cli.account, &records));
            serde_json::to_value(store.latest(&cli.account))?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
