mod http;
mod png_surface;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use foundation::math::ZoomLevel;
use streaming::AtlasCache;
use viewer::{CameraMode, Viewer, ViewerConfig};

use crate::http::HttpFetcher;
use crate::png_surface::PngSurface;

const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless globe viewer over a web-map tile provider")]
struct Args {
    /// JSON viewer configuration; missing fields take their defaults
    #[arg(long, env = "GLOBE_CONFIG")]
    config: Option<PathBuf>,

    /// Tile URL template with {z}, {x} and {y}
    #[arg(long, env = "GLOBE_TILE_URL", default_value = DEFAULT_TILE_URL)]
    tile_url: String,

    /// Static-map URL template with {lon}, {lat}, {z}, {w} and {h} (pan mode)
    #[arg(long, env = "GLOBE_REGION_URL")]
    region_url: Option<String>,

    /// Upper bound on concurrent tile requests per atlas
    #[arg(long, env = "GLOBE_FETCH_CONCURRENCY")]
    fetch_concurrency: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the warm atlas zooms and report progress
    Preload {
        /// Comma-separated zoom levels (defaults to the configured warm zooms)
        #[arg(long, value_delimiter = ',')]
        zooms: Vec<u8>,
    },

    /// Render the globe once and write it to a PNG
    Snapshot {
        /// Output file
        #[arg(long, default_value = "globe.png")]
        out: PathBuf,

        #[arg(long)]
        lon: Option<f64>,

        #[arg(long)]
        lat: Option<f64>,

        #[arg(long)]
        zoom: Option<u8>,

        /// Fetch a flat region image instead of rendering the sphere
        #[arg(long)]
        pan: bool,

        #[arg(long, default_value_t = 512)]
        width: u32,

        #[arg(long, default_value_t = 512)]
        height: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path).await?,
        None => ViewerConfig::default(),
    };
    if let Some(n) = args.fetch_concurrency {
        config.fetch_concurrency = n;
    }
    config.validate()?;

    let fetcher = Arc::new(HttpFetcher::new(args.tile_url, args.region_url)?);
    let cache = AtlasCache::new(fetcher, config.cache_config());

    match args.command {
        Command::Preload { zooms } => {
            if !zooms.is_empty() {
                config.warm_zooms = zooms;
            }
            preload(&cache, &config).await?
        }
        Command::Snapshot {
            out,
            lon,
            lat,
            zoom,
            pan,
            width,
            height,
        } => {
            config.initial_lon = lon.unwrap_or(config.initial_lon);
            config.initial_lat = lat.unwrap_or(config.initial_lat);
            config.initial_zoom = zoom.unwrap_or(config.initial_zoom);
            if pan {
                config.mode = CameraMode::Pan;
                config.region_width = width;
                config.region_height = height;
            }
            config.warm_zooms.clear();
            config.auto_rotate_rad_per_s = 0.0;
            snapshot(cache, config, &out, (width, height)).await?
        }
    }

    Ok(())
}

async fn load_config(path: &Path) -> Result<ViewerConfig, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let config = serde_json::from_str(&text)?;
    info!("loaded configuration from {}", path.display());
    Ok(config)
}

async fn preload(
    cache: &AtlasCache,
    config: &ViewerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let zooms: Vec<ZoomLevel> = config.warm_zoom_levels();
    let done = streaming::preload(cache, &zooms, |_| {}).await;
    println!("{done}");
    if done.failed > 0 {
        return Err(format!("{} of {} zoom levels failed", done.failed, done.total).into());
    }
    Ok(())
}

async fn snapshot(
    cache: AtlasCache,
    config: ViewerConfig,
    out: &Path,
    (width, height): (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let surface = PngSurface::new(width, height);
    let viewer = Viewer::new(config, surface, cache)?;

    // No interactive input: the loop settles after the startup refresh.
    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    let viewer = viewer.run(rx).await;

    let stats = viewer.metrics().snapshot();
    let surface = viewer.into_surface();
    if surface.save(out)? {
        info!("wrote {} ({stats})", out.display());
        Ok(())
    } else {
        error!("nothing was drawn ({stats})");
        warn!("check the provider URL templates and network access");
        Err("no frame was rendered".into())
    }
}
