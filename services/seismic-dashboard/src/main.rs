//! Seismic dashboard renderer.
//!
//! Reads the four ShakeMap ground-motion rasters and writes a 2x2 heatmap
//! dashboard (`dashboard.png` + `dashboard.json`) to the output directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use renderer::Theme;
use seismic_dashboard::{build_dashboard, DashboardConfig};

#[derive(Parser, Debug)]
#[command(name = "seismic-dashboard")]
#[command(about = "Render seismic ground-motion rasters into a heatmap dashboard")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "SEISMIC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the parameter rasters
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for dashboard.png and dashboard.json
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Mesh nodes per axis
    #[arg(long)]
    grid_size: Option<usize>,

    /// Dashboard theme (white, dark)
    #[arg(long)]
    theme: Option<Theme>,

    /// Process parameters one after another
    #[arg(long)]
    sequential: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "SEISMIC_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(size) = self.grid_size {
            config.grid_size = size;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if self.sequential {
            config.parallel = false;
        }
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!("Starting seismic dashboard");

    let mut config = match DashboardConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(e.exit_code());
        }
    };
    args.apply(&mut config);

    match build_dashboard(&config) {
        Ok(displayed) => {
            info!(
                image = %displayed.image_path.display(),
                manifest = %displayed.manifest_path.display(),
                width = displayed.width,
                height = displayed.height,
                panels = displayed.populated_panels,
                "Dashboard written"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "Dashboard was not displayed");
            std::process::exit(e.exit_code());
        }
    }
}
