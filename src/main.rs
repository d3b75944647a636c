use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use profilerd::api::profile_routes;
use profilerd::backend::DirectoryBackends;
use profilerd::config::ServerConfig;
use profilerd::jobs::{ProfileService, spawn_sweep_task};
use profilerd::profiler::ExecProfiler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing; keep the guard alive so buffered file logs are flushed
    let (writer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "profilerd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(writer)
        .init();

    eprintln!("profilerd v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        executable = %config.executable.display(),
        backend = %config.backend_dir.display(),
        timeout_min = config.job_timeout.as_secs() / 60,
        max_jobs = config.max_jobs,
        "Configuration loaded"
    );

    let backends = Arc::new(DirectoryBackends::new(config.backend_dir.clone()));
    let profiler = Arc::new(ExecProfiler::new(config.executable.clone()));
    let service = Arc::new(ProfileService::new(
        config.max_jobs,
        config.job_timeout,
        backends,
        profiler,
    ));

    // Optional periodic sweep on top of the per-submission sweep
    let _sweep_handle = config.sweep_interval.map(|interval| {
        tracing::info!(interval_secs = interval.as_secs(), "Background sweep enabled");
        spawn_sweep_task(Arc::clone(&service), interval)
    });

    let app = profile_routes(service);
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    tracing::info!(listen = %config.listen, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
