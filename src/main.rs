use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use sriov_vfstats::config::{Args, Config};
use sriov_vfstats::vfstats::NetlinkSource;
use sriov_vfstats::{cycle, devices};

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = init_logging(args.log_file.as_deref());

    let config = match Config::from_args(args) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let should_quit = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(e) = signal_hook::flag::register(sig, Arc::clone(&should_quit)) {
            error!(error = %e, "failed to install signal handler");
            return ExitCode::FAILURE;
        }
    }

    match run(&config, &should_quit) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to write samples");
            ExitCode::FAILURE
        }
    }
}

/// Collect until interrupted, or once when no interval is set.
fn run(config: &Config, should_quit: &AtomicBool) -> io::Result<()> {
    let source = NetlinkSource::new();
    let mut stdout = io::stdout().lock();

    info!(
        root = %config.collectors.sys_class_net.display(),
        priority = ?config.priority,
        "starting collection"
    );

    loop {
        let started = Instant::now();
        let pfs = devices::discover(&config.collectors.sys_class_net, &config.pfs);
        let samples = cycle::collect(&pfs, &config.priority, &config.collectors, &source);
        cycle::write_json_lines(&mut stdout, chrono::Utc::now(), &samples)?;
        info!(
            pfs = pfs.len(),
            samples = samples.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle done"
        );

        let Some(interval) = config.interval else {
            return Ok(());
        };
        if sleep_until_quit(interval.saturating_sub(started.elapsed()), should_quit) {
            return Ok(());
        }
    }
}

/// Sleep in short slices; returns true when asked to quit.
fn sleep_until_quit(total: Duration, should_quit: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if should_quit.load(Ordering::Relaxed) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "sriov-vfstats.log".into());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
            None
        }
    }
}
