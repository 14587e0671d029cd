//! SST heatmap server and command-line renderer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sst_api::{start_server, AppState, RenderJob, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "sst-api")]
#[command(about = "Sea-surface-temperature heatmap renderer")]
struct Args {
    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the upload server
    Serve {
        /// Listen address
        #[arg(long, env = "SST_LISTEN", default_value = "0.0.0.0:5000")]
        listen: SocketAddr,

        /// Number of tokio worker threads (default: number of CPU cores)
        #[arg(long, env = "TOKIO_WORKER_THREADS")]
        worker_threads: Option<usize>,
    },
    /// Render a single heatmap to a file
    Render {
        /// Base map image
        #[arg(long)]
        map: PathBuf,

        /// ZIP archive containing a .grid entry
        #[arg(long)]
        zip: PathBuf,

        /// Output PNG path
        #[arg(long, short)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServiceConfig::from_env().context("failed to load configuration")?;
    info!(
        grid_width = config.render.layout.width,
        grid_height = config.render.layout.height,
        format = ?config.render.layout.format,
        policy = ?config.render.policy,
        mode = ?config.render.mode,
        work_dir = %config.work_dir.display(),
        "Loaded configuration"
    );

    match args.command {
        Command::Serve {
            listen,
            worker_threads,
        } => serve(config, listen, worker_threads),
        Command::Render { map, zip, out } => {
            let job = RenderJob {
                map_path: map,
                zip_path: zip,
            };
            let output = job.render_to_file(&config, &out)?;
            info!(
                min = output.range.min,
                max = output.range.max,
                painted = output.stats.painted,
                masked = output.stats.masked,
                "Heatmap written"
            );
            Ok(())
        }
    }
}

fn serve(config: ServiceConfig, listen: SocketAddr, worker_threads: Option<usize>) -> Result<()> {
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = worker_threads {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async move {
        let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        info!("Prometheus metrics exporter initialized");

        let state = Arc::new(AppState::new(config).with_prometheus(prometheus_handle));
        start_server(state, listen).await
    })
}
