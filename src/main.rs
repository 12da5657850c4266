// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing)
// 3. Build the scan plan: fresh bounds, or a snapshot to resume from
// 4. Run the scan until it completes or Ctrl-C interrupts it
// 5. Exit with proper code (0 = done or saved, 1 = bad invocation, 2 = error)
// =============================================================================

mod checker; // src/checker/ - probing and classification
mod cli; // src/cli.rs - command-line parsing
mod error; // src/error.rs - ScanError
mod scan; // src/scan/ - coordinator and workers
mod sequence; // src/sequence/ - identifiers and ranges
mod store; // src/store/ - discovery file and snapshots

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Entry, LogFormat};
use error::ScanError;
use scan::{ScanOutcome, ScanPlan, ScanReport, Scanner};
use store::SnapshotStore;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// The #[tokio::main] attribute transforms our async main into a real main function
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<ScanError>() {
            // The user's fault: say what was wrong and how to call us
            Some(scan_err) if scan_err.is_usage() => {
                eprintln!("Error: {scan_err}\n");
                Cli::command().write_help(&mut std::io::stderr()).ok();
                1
            }
            _ => {
                eprintln!("Error: {e:#}");
                2
            }
        },
    };

    // Exiting here also drops any probe still in flight after an interrupt
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.scan_config()?;
    let discovery_path = config.discovery_path.clone();
    let workers = config.workers;
    let base_url = config.base_url().to_string();

    // Open the discovery file before consuming a snapshot, so a bad file
    // does not cost the user their resume point
    let scanner = Scanner::new(config).context("failed to prepare the scan")?;

    let plan = match cli.entry()? {
        Entry::Fresh(bounds) => ScanPlan::fresh(bounds),
        Entry::Resume(path) => {
            let state = SnapshotStore::load(&path)?;
            println!("♻️  Resuming from {}", path.display());
            ScanPlan::resume(state)?
        }
    };

    println!(
        "🔍 Scanning {} to {} with {} worker(s)",
        plan.bounds.start(),
        plan.bounds.end(),
        workers
    );
    println!("🌐 Probing {base_url}<identifier>");
    if let Some(current) = &plan.resume_after {
        println!("   continuing after {current}");
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let outcome = scanner.run(plan, cancel).await?;
    let discoveries = scanner.discovery_count().await;

    match outcome {
        ScanOutcome::Completed(report) => {
            print_summary(&report, discoveries);
            println!("💾 Discoveries saved to {}", discovery_path.display());
        }
        ScanOutcome::Interrupted { snapshot, report } => {
            println!("\n⏸️  Interrupted! State saved to {}", snapshot.display());
            print_summary(&report, discoveries);
            println!("   Resume with: slug-scout -c {}", snapshot.display());
        }
    }

    Ok(())
}

// Cancels the scan on Ctrl-C (and SIGTERM on unix)
async fn cancel_on_shutdown(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    cancel.cancel();
}

fn init_tracing(verbose: bool, format: LogFormat) {
    // RUST_LOG wins; otherwise -v decides how chatty we are
    let default_filter = if verbose {
        "slug_scout=debug,warn"
    } else {
        "slug_scout=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so stdout stays for the summary
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_summary(report: &ScanReport, discoveries: usize) {
    println!("📊 Summary:");
    println!("   🔎 Probed: {}", report.probed);
    println!("   ✅ Valid: {}", report.accepted);
    println!("   🔒 Restricted: {}", report.restricted);
    println!(
        "   ❌ Invalid: {} ({} network errors)",
        report.rejected, report.transport_failures
    );
    println!("   📋 Total recorded: {}", discoveries);
}
