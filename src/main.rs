use anyhow::{Context, Result};
use clap::Parser;
use popdash::{Config, Dashboard};
use std::{path::PathBuf, thread, time::Duration};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Taiwan population indicator dashboard")]
struct Args {
    /// YAML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the HTML page (overrides `output.html`).
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Also export the indicator table as Parquet (overrides `output.parquet`).
    #[arg(long)]
    parquet: Option<PathBuf>,
    /// Re-run every SECS seconds instead of exiting after one run.
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,popdash=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    // ─── 2) configuration ────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(out) = args.out {
        config.output.html = out;
    }
    if let Some(parquet) = args.parquet {
        config.output.parquet = Some(parquet);
    }
    info!(
        url = %config.source.url,
        fallback = %config.source.fallback.display(),
        "startup"
    );

    let mut dashboard = Dashboard::from_config(&config).context("building dashboard")?;

    // ─── 3) run once, or keep re-running ─────────────────────────────
    let Some(secs) = args.watch else {
        let origin = dashboard
            .publish(&config.output)
            .with_context(|| format!("publishing {}", config.output.html.display()))?;
        info!(?origin, "done");
        return Ok(());
    };

    let every = Duration::from_secs(secs.max(1));
    info!(every = ?every, "watching");
    loop {
        if let Err(e) = dashboard.publish(&config.output) {
            error!(kind = e.kind(), "run failed: {}", e);
        }
        thread::sleep(every);
    }
}
