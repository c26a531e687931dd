//! Flow runner entry point.
//!
//! Runs the storefront business flows against a live session and writes a
//! JSON report. Requires Node.js with Playwright installed.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vitrine_driver::{AuthApi, DriverConfig, StoreSession};
use vitrine_e2e::flows;
use vitrine_e2e::{FlowRecord, FlowReport};

#[derive(Parser, Debug)]
#[command(name = "vitrine-e2e")]
#[command(about = "Storefront flow runner")]
struct Args {
    /// Run only this flow (see --list)
    #[arg(short, long)]
    flow: Option<String>,

    /// List available flows and exit
    #[arg(long)]
    list: bool,

    /// Storefront base URL
    #[arg(long, env = "VITRINE_BASE_URL")]
    base_url: Option<String>,

    /// Run the browser headful
    #[arg(long)]
    headful: bool,

    /// Output directory for the JSON report
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if args.list {
        for name in flows::FLOW_NAMES {
            println!("{name}");
        }
        return;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create runtime: {e}");
            std::process::exit(2);
        }
    };

    match runtime.block_on(run(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> Result<bool> {
    let mut config = DriverConfig::from_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if args.headful {
        config.headless = false;
    }

    let api = AuthApi::new(&config)?;

    let selected: Vec<&str> = match &args.flow {
        Some(flow) => vec![flow.as_str()],
        None => flows::FLOW_NAMES.to_vec(),
    };

    let mut report = FlowReport::default();
    let suite_start = Instant::now();

    for name in selected {
        // A fresh browser per flow keeps cart and login state isolated.
        let session = StoreSession::launch(config.clone()).await?;

        let start = Instant::now();
        let outcome = flows::run_flow(name, &session, &api).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Err(e) = session.close().await {
            error!(%e, "session shutdown failed");
        }

        match outcome {
            Ok(detail) => {
                info!("PASS {name} ({duration_ms} ms): {detail}");
                report.record(FlowRecord {
                    name: name.to_string(),
                    success: true,
                    duration_ms,
                    detail: Some(detail),
                    error: None,
                });
            }
            Err(e) => {
                error!("FAIL {name} ({duration_ms} ms): {e:#}");
                report.record(FlowRecord {
                    name: name.to_string(),
                    success: false,
                    duration_ms,
                    detail: None,
                    error: Some(format!("{e:#}")),
                });
            }
        }
    }

    report.duration_ms = suite_start.elapsed().as_millis() as u64;
    info!(
        "flows: {} passed, {} failed ({} ms)",
        report.passed, report.failed, report.duration_ms
    );
    report.write_json(&args.output)?;

    Ok(report.all_passed())
}
