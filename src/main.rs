/*!
 * Command-line interface for coursesync
 */

use std::fs;
use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use coursesync::config::{Args, Config};
use coursesync::remote::CanvasClient;
use coursesync::report::Reporter;
use coursesync::sync::Syncer;
use coursesync::{logging, SyncError};

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "coursesync", &mut io::stdout());
        return Ok(());
    }

    logging::init(args.verbose);

    let config = Config::from_args(args);
    config.validate()?;
    fs::create_dir_all(&config.output_root)?;

    let remote = CanvasClient::new(
        config.parsed_base_url()?,
        &config.token,
        config.per_page,
        config.timeout,
    )
    .map_err(SyncError::from)?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) Elapsed: {elapsed_precise}")
            .map_err(|e| SyncError::Unexpected(e.to_string()))?,
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));

    let syncer = Syncer::new(config.clone(), Arc::new(remote), Arc::new(progress.clone()))?;

    let cancel = syncer.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let reporter = Reporter::new(config.report_format);
    info!(selector = %config.selector, "starting sync");

    let summary = syncer.run(|report| {
        progress.suspend(|| reporter.print_report(report));
    })?;

    progress.finish_and_clear();
    reporter.print_summary(&summary);

    Ok(())
}
