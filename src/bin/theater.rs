use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use theater_geo::config::TheaterConfig;
use theater_geo::config::catalog::InstalledTheater;
use theater_geo::core::constants::METERS_PER_INTERNATIONAL_FOOT;
use theater_geo::elevation::{self, HeightmapFile};
use theater_geo::projection::{self, Conversion, ConversionStrategy, CoordinateConverter};
use theater_geo::{GameCoordinate, GeodeticCoordinate, LengthUnit, TheaterCatalog};
use tracing::{Level, debug, warn};
use tracing_subscriber::EnvFilter;

/// Convert between simulator game coordinates and WGS84, and look up terrain elevation.
#[derive(Parser, Debug)]
#[command(author, version, about = "Theater coordinate converter")]
struct Cli {
    /// Simulator installation root (enables Theater.lst / Theater.txt discovery and heightmaps)
    #[arg(long, env = "FALCON_BMS_ROOT", global = true)]
    install_root: Option<PathBuf>,

    /// Theater override catalog (YAML list, TOML file, or directory of TOML files)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG also applies
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a game coordinate to latitude/longitude (or back with --reverse)
    Convert(ConvertArgs),
    /// Print the geodetic position of each heightmap corner
    Corners(CornersArgs),
    /// List the theaters that can be resolved
    Theaters,
    /// Generate a Transverse Mercator descriptor for a new theater centre
    Projection(ProjectionArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Game X (or latitude with --reverse)
    #[arg(allow_hyphen_values = true)]
    x: f64,

    /// Game Y (or longitude with --reverse)
    #[arg(allow_hyphen_values = true)]
    y: f64,

    /// Theater key (case-insensitive)
    #[arg(long, default_value = "korea")]
    theater: String,

    /// Unit of the game coordinate
    #[arg(long, value_enum, default_value_t = UnitArg::Feet)]
    unit: UnitArg,

    /// Treat X Y as latitude longitude and convert to game space
    #[arg(long, default_value_t = false)]
    reverse: bool,

    /// Conversion strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Exact)]
    strategy: StrategyArg,

    /// Also look up terrain elevation
    #[arg(long, default_value_t = false)]
    elevation: bool,

    /// Heightmap file (defaults to the theater's file under --install-root)
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Print latitude/longitude as degrees, minutes, seconds
    #[arg(long, default_value_t = false)]
    dms: bool,

    /// Emit JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct CornersArgs {
    /// Theater key (case-insensitive)
    #[arg(long, default_value = "korea")]
    theater: String,

    /// Conversion strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Exact)]
    strategy: StrategyArg,
}

#[derive(Args, Debug)]
struct ProjectionArgs {
    /// Theater centre latitude
    #[arg(allow_hyphen_values = true)]
    lat: f64,

    /// Theater centre longitude
    #[arg(allow_hyphen_values = true)]
    lon: f64,

    /// Northing (m) the centre should land on
    #[arg(long, default_value_t = 512_000.0)]
    desired_y: f64,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum UnitArg {
    Feet,
    Meters,
}

impl From<UnitArg> for LengthUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Feet => LengthUnit::Feet,
            UnitArg::Meters => LengthUnit::Meters,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum StrategyArg {
    Exact,
    Generic,
}

impl From<StrategyArg> for ConversionStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Exact => ConversionStrategy::GridExact,
            StrategyArg::Generic => ConversionStrategy::Generic,
        }
    }
}

#[derive(Serialize)]
struct ConvertReport {
    theater: String,
    strategy: &'static str,
    fallback: Option<String>,
    game: GameReport,
    geodetic: GeodeticReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<ElevationReport>,
}

#[derive(Serialize)]
struct GameReport {
    x: f64,
    y: f64,
    unit: &'static str,
}

#[derive(Serialize)]
struct GeodeticReport {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
struct ElevationReport {
    feet: Option<u16>,
    meters: Option<f64>,
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = build_catalog(&cli)?;
    match &cli.command {
        Command::Convert(args) => convert(&catalog, args),
        Command::Corners(args) => corners(&catalog, args),
        Command::Theaters => theaters(&catalog),
        Command::Projection(args) => {
            println!(
                "{}",
                projection::projection_string_for_center(args.lat, args.lon, args.desired_y)
            );
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn build_catalog(cli: &Cli) -> anyhow::Result<TheaterCatalog> {
    let mut catalog = TheaterCatalog::builtin();
    if let Some(root) = &cli.install_root {
        catalog = catalog.with_install_root(root);
        if !catalog.installation_available() {
            warn!(
                root = %root.display(),
                "install root has no Data directory; using built-in theaters"
            );
        }
    }
    if let Some(path) = &cli.catalog {
        catalog = catalog
            .load_overrides(path)
            .with_context(|| format!("failed to load theater catalog {}", path.display()))?;
    }
    Ok(catalog)
}

fn resolve(catalog: &TheaterCatalog, key: &str) -> anyhow::Result<TheaterConfig> {
    catalog
        .resolve(key)
        .with_context(|| format!("cannot resolve theater '{key}'"))
}

fn convert(catalog: &TheaterCatalog, args: &ConvertArgs) -> anyhow::Result<()> {
    let config = resolve(catalog, &args.theater)?;
    let converter = CoordinateConverter::new(&config)
        .with_context(|| format!("invalid projection for theater '{}'", config.key()))?;
    let unit = LengthUnit::from(args.unit);
    let strategy = ConversionStrategy::from(args.strategy);

    let (game, geodetic, used, fallback) = if args.reverse {
        let geodetic = GeodeticCoordinate::new(args.x, args.y);
        let Conversion {
            value,
            strategy,
            fallback,
        } = converter.geodetic_to_game(&geodetic, unit, strategy);
        (value, geodetic, strategy, fallback)
    } else {
        let game = GameCoordinate::new(args.x, args.y, unit);
        let Conversion {
            value,
            strategy,
            fallback,
        } = converter.game_to_geodetic(&game, strategy);
        (game, value, strategy, fallback)
    };
    if let Some(reason) = &fallback {
        warn!(theater = config.key(), %reason, "grid-exact conversion unavailable");
    }

    let elevation = args
        .elevation
        .then(|| lookup_elevation(catalog, &config, args.heightmap.clone(), &game));

    if args.json {
        let report = ConvertReport {
            theater: config.key().to_string(),
            strategy: used.label(),
            fallback: fallback.map(|reason| reason.to_string()),
            game: GameReport {
                x: game.x,
                y: game.y,
                unit: game.unit.label(),
            },
            geodetic: GeodeticReport {
                latitude: geodetic.latitude,
                longitude: geodetic.longitude,
            },
            elevation,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Theater   : {} ({})", config.name(), config.key());
    println!("Game      : ({:.2}, {:.2}) {}", game.x, game.y, game.unit);
    println!("Geodetic  : {}", format_geodetic(&geodetic, args.dms));
    match fallback {
        Some(reason) => println!("Strategy  : {used} (fallback: {reason})"),
        None => println!("Strategy  : {used}"),
    }
    if let Some(report) = elevation {
        match (report.feet, report.meters, report.error) {
            (Some(feet), Some(meters), _) => println!("Elevation : {feet} ft ({meters:.1} m)"),
            (_, _, Some(error)) => println!("Elevation : unavailable ({error})"),
            _ => println!("Elevation : unavailable"),
        }
    }
    Ok(())
}

fn lookup_elevation(
    catalog: &TheaterCatalog,
    config: &TheaterConfig,
    heightmap: Option<PathBuf>,
    game: &GameCoordinate,
) -> ElevationReport {
    let path = heightmap.or_else(|| catalog.heightmap_path(config));
    let Some(path) = path else {
        return ElevationReport {
            feet: None,
            meters: None,
            error: Some("no heightmap (pass --heightmap or --install-root)".to_string()),
        };
    };
    debug!(path = %path.display(), "reading heightmap");
    let result =
        HeightmapFile::open(&path).and_then(|file| elevation::elevation(game, config, &file));
    match result {
        Ok(feet) => ElevationReport {
            feet: Some(feet),
            meters: Some(feet as f64 * METERS_PER_INTERNATIONAL_FOOT),
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "elevation lookup failed");
            ElevationReport {
                feet: None,
                meters: None,
                error: Some(err.to_string()),
            }
        }
    }
}

fn corners(catalog: &TheaterCatalog, args: &CornersArgs) -> anyhow::Result<()> {
    let config = resolve(catalog, &args.theater)?;
    let converter = CoordinateConverter::new(&config)
        .with_context(|| format!("invalid projection for theater '{}'", config.key()))?;
    let conversion = converter.corners(args.strategy.into());

    println!("Theater   : {} ({})", config.name(), config.key());
    match conversion.fallback {
        Some(reason) => println!("Strategy  : {} (fallback: {reason})", conversion.strategy),
        None => println!("Strategy  : {}", conversion.strategy),
    }
    for (corner, point) in conversion.value.iter() {
        println!(
            "{:<2} : game ({:>12.1}, {:>12.1}) ft -> {:>10.5}, {:>10.5}",
            corner.label(),
            point.game.x,
            point.game.y,
            point.geodetic.latitude,
            point.geodetic.longitude
        );
    }
    Ok(())
}

fn theaters(catalog: &TheaterCatalog) -> anyhow::Result<()> {
    let installed: BTreeMap<String, InstalledTheater> = catalog
        .installed_theaters()
        .into_iter()
        .map(|theater| (theater.key.clone(), theater))
        .collect();
    for key in catalog.available() {
        match catalog.resolve(&key) {
            Ok(config) => {
                let grid = if config.grid().is_some() {
                    "grid-exact"
                } else {
                    "generic only"
                };
                println!(
                    "{:<12} {:<20} {:>5}x{:<5} {:<12} {}",
                    config.key(),
                    config.name(),
                    config.heightmap_size().width,
                    config.heightmap_size().height,
                    grid,
                    config.projection_string()
                );
            }
            Err(err) => println!("{key:<12} unavailable: {err}"),
        }
        if let Some(theater) = installed.get(&key) {
            println!("{:<12} {}", "", describe_installed(theater));
        }
    }
    Ok(())
}

fn describe_installed(theater: &InstalledTheater) -> String {
    let mut parts = vec![format!("defined in {}", theater.tdf_path.display())];
    if let Some(description) = &theater.definition.description {
        parts.push(description.clone());
    }
    if let Some(declination) = theater.definition.magnetic_declination {
        parts.push(format!("magnetic declination {declination:+.1}°"));
    }
    parts.join("; ")
}

fn format_geodetic(geo: &GeodeticCoordinate, dms: bool) -> String {
    if !dms {
        return format!("{:.6}, {:.6}", geo.latitude, geo.longitude);
    }
    let (lat, lon) = geo.to_dms();
    let ns = if geo.latitude < 0.0 { 'S' } else { 'N' };
    let ew = if geo.longitude < 0.0 { 'W' } else { 'E' };
    format!(
        "{}° {}' {:.2}\" {ns}, {}° {}' {:.2}\" {ew}",
        lat.degrees, lat.minutes, lat.seconds, lon.degrees, lon.minutes, lon.seconds
    )
}
