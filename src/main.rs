use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diffrant::loaders::{load_metadata, load_raw};
use diffrant::models::{ViewOverrides, ViewerConfig};
use diffrant::rendering::FrameRenderer;
use diffrant::services::ViewerSession;
use diffrant_core::{ring_radii, suggest_max, Point};

#[derive(Parser)]
#[command(name = "diffrant")]
#[command(about = "Render X-ray diffraction detector images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an image with overlays to a PNG file
    Render {
        /// Raw little-endian sample dump
        #[arg(short, long)]
        image: PathBuf,

        /// JSON metadata sidecar
        #[arg(short, long)]
        metadata: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        view: ViewOverrides,
    },
    /// Print the intensity histogram and auto-exposure suggestion
    Histogram {
        #[arg(short, long)]
        image: PathBuf,

        #[arg(short, long)]
        metadata: PathBuf,

        /// Number of bins (defaults to the configured count)
        #[arg(short, long)]
        bins: Option<usize>,

        /// Viewer configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the pixel under a canvas coordinate
    Inspect {
        #[arg(short, long)]
        image: PathBuf,

        #[arg(short, long)]
        metadata: PathBuf,

        /// Canvas x coordinate
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Canvas y coordinate
        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        #[command(flatten)]
        view: ViewOverrides,
    },
    /// Print resolution ring radii for the current view
    Rings {
        #[arg(short, long)]
        metadata: PathBuf,

        #[command(flatten)]
        view: ViewOverrides,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diffrant=info,diffrant_core=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Render {
            image,
            metadata,
            output,
            view,
        } => run_render_command(&image, &metadata, &output, &view),
        Commands::Histogram {
            image,
            metadata,
            bins,
            config,
        } => run_histogram_command(&image, &metadata, bins, config.as_deref()),
        Commands::Inspect {
            image,
            metadata,
            x,
            y,
            view,
        } => run_inspect_command(&image, &metadata, Point::new(x, y), &view),
        Commands::Rings { metadata, view } => run_rings_command(&metadata, &view),
    }
}

fn load_config(overrides: &ViewOverrides) -> anyhow::Result<ViewerConfig> {
    let config = ViewerConfig::load(overrides.config.as_deref())?.with_overrides(overrides)?;
    Ok(config)
}

fn open_session(
    image: &Path,
    metadata: &Path,
    config: &ViewerConfig,
) -> anyhow::Result<ViewerSession> {
    let metadata = load_metadata(metadata)
        .with_context(|| format!("Failed to load metadata {}", metadata.display()))?;
    let image = load_raw(image, &metadata)
        .with_context(|| format!("Failed to load image {}", image.display()))?;
    Ok(ViewerSession::from_config(image, metadata, config)?)
}

/// Render one frame to a PNG file
fn run_render_command(
    image: &Path,
    metadata: &Path,
    output: &Path,
    overrides: &ViewOverrides,
) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let mut session = open_session(image, metadata, &config)?;

    let frame = match session.on_frame() {
        Some(frame) => frame?,
        None => session.render_now()?,
    };
    tracing::info!(
        zoom = session.view().zoom,
        exposure_min = session.view().exposure_min,
        exposure_max = session.view().exposure_max,
        rings = frame.rings.len(),
        labels = frame.labels.len(),
        "Rendered frame"
    );

    let png_bytes = FrameRenderer::new()
        .render_png(&frame)
        .map_err(|e| anyhow::anyhow!("Render error: {e}"))?;

    std::fs::write(output, &png_bytes)?;
    println!("Rendered {} ({} bytes)", output.display(), png_bytes.len());

    Ok(())
}

fn run_histogram_command(
    image: &Path,
    metadata: &Path,
    bins: Option<usize>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = ViewerConfig::load(config)?;
    let bins = bins.unwrap_or(config.histogram_bins);
    let mut session = open_session(image, metadata, &config)?;

    let suggestion = suggest_max(session.image(), session.metadata());
    let histogram = session.histogram(bins)?;
    let edges = histogram.bin_edges();

    println!("bin_start\tbin_end\tcount");
    for (i, &count) in histogram.counts().iter().enumerate() {
        if count > 0 {
            println!("{:.1}\t{:.1}\t{count}", edges[i], edges[i + 1]);
        }
    }
    println!();
    println!("trusted samples: {}", histogram.total());
    match histogram.max_raw() {
        Some(max) => println!("max raw: {max}"),
        None => println!("max raw: none (every sample masked)"),
    }
    match suggestion {
        Some(max) => println!("suggested exposure: 0 - {max}"),
        None => println!("suggested exposure: none"),
    }

    Ok(())
}

fn run_inspect_command(
    image: &Path,
    metadata: &Path,
    point: Point,
    overrides: &ViewOverrides,
) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let session = open_session(image, metadata, &config)?;

    let Some(info) = session.cursor(point)? else {
        println!("({}, {}) is outside the image", point.x, point.y);
        return Ok(());
    };

    println!("pixel: ({}, {})", info.x, info.y);
    if info.masked {
        println!("raw: {} (masked)", info.raw);
    } else {
        println!("raw: {}", info.raw);
    }
    match info.resolution {
        Some(d) => println!("resolution: {d:.2} Å"),
        None => println!("resolution: n/a"),
    }

    Ok(())
}

fn run_rings_command(metadata: &Path, overrides: &ViewOverrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let metadata = load_metadata(metadata)
        .with_context(|| format!("Failed to load metadata {}", metadata.display()))?;
    let (width, height) = metadata.panel_size;
    let view = config.initial_view(width, height);

    let rings = ring_radii(&metadata, &view);
    if rings.is_empty() {
        println!("No resolution rings (beam energy unknown or rings out of view)");
        return Ok(());
    }

    println!("d_spacing\tradius_px");
    for ring in &rings {
        println!("{}\t{:.1}", ring.label(), ring.radius);
    }

    Ok(())
}
