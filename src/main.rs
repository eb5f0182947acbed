//! collab-map CLI - Research Collaboration World Map
//!
//! Reads a collaboration export, geocodes each institution and writes a map
//! with great-circle (or dateline-safe straight) edges from home.
//!
//! Usage:
//!   collab-map [OPTIONS] [INPUT]

use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use collab_map::{
    CachedGeocoder, CollabMapConfig, Coordinate, Geocoder, NominatimGeocoder, OfflineGeocoder,
    OutputFormat, Palette, build_map, generate_summary, load_config, load_config_file,
    load_records, render, resolve_locations,
    web::{ServerConfig, start_server},
};

const DEFAULT_OUTPUT: &str = "scival_collaboration_map.html";

/// collab-map - Draw your research collaborations on a world map
#[derive(Parser, Debug)]
#[command(name = "collab-map")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV export with Institution, Country/Region and Co-authored publications columns
    #[arg(default_value = "collab.csv")]
    input: PathBuf,

    /// Output file (default: scival_collaboration_map.html, or .geojson for GeoJSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file path (default: search for .collab-map.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Home location as LAT,LON
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    home: Option<Coordinate>,

    /// Popup label of the home marker
    #[arg(long)]
    home_label: Option<String>,

    /// Points sampled along each great-circle arc (>= 2)
    #[arg(long, value_name = "N")]
    resolution: Option<usize>,

    /// Minimum delay between geocoding requests in seconds
    #[arg(long, value_name = "SECS")]
    min_delay: Option<f64>,

    /// User-Agent for geocoding requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Geocode cache file (JSON), created if missing
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Do not geocode; rows without Latitude/Longitude columns are skipped
    #[arg(long)]
    offline: bool,

    /// Print a text summary to stdout
    #[arg(short, long)]
    summary: bool,

    /// Number of threads for path building (default: all CPU cores)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show timing information
    #[arg(long)]
    timing: bool,

    // === Web visualization options ===
    /// Start web server for interactive visualization
    #[arg(long)]
    web: bool,

    /// Port for web server (default: 3000)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("collab_map={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file and apply CLI overrides on top of it
fn resolve_config(args: &Args) -> Result<CollabMapConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => {
            let (config, found) = load_config(&args.input)?;
            if let Some(path) = found {
                if args.verbose {
                    eprintln!("Loaded configuration from {}", path.display());
                }
            }
            config
        }
    };

    if let Some(home) = args.home {
        config.map.home = home;
    }
    if let Some(label) = &args.home_label {
        config.map.home_label = label.clone();
    }
    if let Some(resolution) = args.resolution {
        config.map.arc_resolution = resolution;
    }
    if let Some(delay) = args.min_delay {
        config.geocoder.min_delay_secs = delay;
    }
    if let Some(agent) = &args.user_agent {
        config.geocoder.user_agent = agent.clone();
    }

    config.validate()?;
    Ok(config)
}

fn default_output_path(format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Html => PathBuf::from(DEFAULT_OUTPUT),
        OutputFormat::GeoJson => Path::new(DEFAULT_OUTPUT).with_extension("geojson"),
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Configure thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .unwrap_or_else(|e| eprintln!("Warning: Could not set thread count: {}", e));
    }

    let total_start = Instant::now();
    let config = resolve_config(&args)?;

    let (palette, unknown_colors) = Palette::with_overrides(&config.colors);
    for key in unknown_colors {
        eprintln!("Warning: Unknown continent '{}' in [colors]", key);
    }

    eprintln!("Loading institutions from '{}'...", args.input.display());
    let records = load_records(&args.input)?;

    // Geocode institutions
    let geocode_start = Instant::now();
    eprintln!("Geocoding {} institutions...", records.len());
    let table = if args.offline {
        resolve_with(&records, OfflineGeocoder, args.cache.as_deref())?
    } else {
        resolve_with(
            &records,
            NominatimGeocoder::new(&config.geocoder)?,
            args.cache.as_deref(),
        )?
    };
    let geocode_time = geocode_start.elapsed();
    eprintln!(
        "Located {} institutions, skipped {}",
        table.len(),
        table.skipped().len()
    );

    let build_start = Instant::now();
    let map = build_map(&table, &config.map, &palette)?;
    let build_time = build_start.elapsed();

    if args.timing {
        eprintln!(
            "Located {} institutions (took {:.2?}), built {} paths (took {:.2?})",
            table.len(),
            geocode_time,
            map.collaborators.len(),
            build_time
        );
    }

    if args.summary {
        let mut out = stdout();
        generate_summary(&map, &mut out)?;
        out.flush()?;
    }

    // Web visualization mode
    if args.web {
        let server_config = ServerConfig {
            port: args.port,
            open_browser: !args.no_open,
        };

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(start_server(&map, server_config))
            .map_err(|e| -> Box<dyn std::error::Error> { e })?;

        return Ok(());
    }

    let format = args
        .format
        .or(config.output.format)
        .unwrap_or_default();
    let output_path = args
        .output
        .clone()
        .or_else(|| config.output.path.clone())
        .unwrap_or_else(|| default_output_path(format));

    let mut writer = BufWriter::new(File::create(&output_path)?);
    render(&map, format, &mut writer)?;
    writer.flush()?;

    eprintln!("Map saved as '{}'", output_path.display());

    if args.timing {
        eprintln!("Total time: {:.2?}", total_start.elapsed());
    }

    Ok(())
}

/// Resolve locations through `geocoder`, optionally behind a file cache
fn resolve_with<G: Geocoder>(
    records: &[collab_map::CollaboratorRecord],
    geocoder: G,
    cache: Option<&Path>,
) -> Result<collab_map::LocationTable, Box<dyn std::error::Error>> {
    match cache {
        Some(path) => {
            let mut cached = CachedGeocoder::open(path, geocoder)?;
            let table = resolve_locations(records, &mut cached);
            cached.save()?;
            Ok(table)
        }
        None => {
            let mut geocoder = geocoder;
            Ok(resolve_locations(records, &mut geocoder))
        }
    }
}
