//! procgauged - host utilization exporter.
//!
//! Samples CPU, memory, disk, network, and scheduler counters from /proc once
//! per second and serves them over HTTP in the Prometheus text format.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod handlers;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread::JoinHandle;

use clap::Parser;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use procgauge_core::collector::RealFs;
use procgauge_core::collector::traits::FileSystem;
#[cfg(not(target_os = "linux"))]
use procgauge_core::collector::MockFs;
use procgauge_core::{Registry, SAMPLE_INTERVAL, Sampler, Scheduler, StopHandle};

/// Endpoint failed to bind or serve.
const EXIT_ENDPOINT: i32 = 1;
/// Metric families could not be registered.
const EXIT_REGISTRY: i32 = 2;
/// Sampling thread could not be started.
const EXIT_SCHEDULER: i32 = 3;

/// Host utilization exporter.
#[derive(Parser)]
#[command(name = "procgauged", about = "Host utilization exporter for Prometheus", version = procgauge_core::VERSION)]
struct Args {
    /// Listen address for the exposition endpoint.
    #[arg(long, default_value = "0.0.0.0:8000", env = "PROCGAUGE_LISTEN")]
    listen: SocketAddr,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc", env = "PROCGAUGE_PROC_PATH")]
    proc_path: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["procgauged", "procgauge_core"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn start_sampler<F: FileSystem + 'static>(
    fs: F,
    args: &Args,
    registry: &Arc<Registry>,
) -> io::Result<(StopHandle, JoinHandle<u64>)> {
    let scheduler = Scheduler::new(Sampler::new(fs, args.proc_path.clone()), Arc::clone(registry));
    let stop = scheduler.stop_handle();
    let handle = scheduler.spawn()?;
    Ok((stop, handle))
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!(version = procgauge_core::VERSION, "procgauged starting");
    info!(
        listen = %args.listen,
        proc = %args.proc_path.display(),
        interval_ms = SAMPLE_INTERVAL.as_millis() as u64,
        "config"
    );

    let registry = match Registry::new() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!(error = %e, "failed to register metric families");
            process::exit(EXIT_REGISTRY);
        }
    };

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = {
        tracing::warn!("not running on linux, sampling a mock /proc");
        MockFs::typical_system()
    };

    let (stop, sampler_thread) = match start_sampler(fs, &args, &registry) {
        Ok(started) => started,
        Err(e) => {
            error!(error = %e, "failed to start sampling thread");
            process::exit(EXIT_SCHEDULER);
        }
    };

    let served = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .and_then(|runtime| runtime.block_on(serve(args.listen, Arc::clone(&registry))));

    stop.stop();
    match sampler_thread.join() {
        Ok(ticks) => info!(ticks, "sampler stopped"),
        Err(_) => error!("sampling thread panicked"),
    }

    if let Err(e) = served {
        error!(addr = %args.listen, error = %e, "exposition endpoint failed");
        process::exit(EXIT_ENDPOINT);
    }
    info!("shutdown complete");
}

async fn serve(addr: SocketAddr, registry: Arc<Registry>) -> io::Result<()> {
    let app = handlers::router(registry).layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["procgauged"]).unwrap();
        assert_eq!(args.listen, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(args.proc_path, PathBuf::from("/proc"));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn flags() {
        let args = Args::try_parse_from([
            "procgauged",
            "--listen",
            "127.0.0.1:9100",
            "--proc-path",
            "/host/proc",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.listen.port(), 9100);
        assert_eq!(args.proc_path, PathBuf::from("/host/proc"));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn invalid_listen_address_rejected() {
        assert!(Args::try_parse_from(["procgauged", "--listen", "not-an-addr"]).is_err());
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [EXIT_ENDPOINT, EXIT_REGISTRY, EXIT_SCHEDULER];
        assert!(codes.iter().all(|&c| c != 0));
        assert_ne!(EXIT_ENDPOINT, EXIT_REGISTRY);
        assert_ne!(EXIT_REGISTRY, EXIT_SCHEDULER);
        assert_ne!(EXIT_ENDPOINT, EXIT_SCHEDULER);
    }

    #[tokio::test]
    async fn serve_fails_on_busy_port() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let registry = Arc::new(Registry::new().unwrap());
        assert!(serve(addr, registry).await.is_err());
    }
}
