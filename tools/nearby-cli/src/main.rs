use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod output;

use nearby_core::config::DEFAULT_RELAY;
use nearby_core::graph::GeoPoint;
use nearby_core::{Dialect, HttpFetcher, NearbyConfig, PlaceKind, ProximityQuery, Resolver, SourceKind};
use output::{render_text, to_feature_collection, write_geojson, write_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line per source: `name (d km) <link>`
    Text,
    /// GeoJSON FeatureCollection of point features
    Geojson,
}

#[derive(Parser, Debug)]
#[command(
    name = "nearby",
    author,
    version,
    about = "Find train stations and places of interest near a coordinate",
    long_about = "Looks up train stations in the iRail station graph and tagged OpenStreetMap \
                  places (museums by default) on a remote SPARQL endpoint, and lists them \
                  nearest first.\n\n\
                  Settings come from an optional TOML file; flags override individual values."
)]
struct Args {
    /// Longitude of the origin (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Latitude of the origin (WGS84)
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Skip the station lookup
    #[arg(long)]
    no_stations: bool,

    /// OpenStreetMap `tourism` values to look up (repeatable)
    #[arg(short, long = "place", default_values_t = vec!["museum".to_string()])]
    places: Vec<String>,

    /// Station search radius in km
    #[arg(long)]
    station_radius: Option<f64>,

    /// Place search radius in km
    #[arg(long)]
    place_radius: Option<f64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote SPARQL endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Route remote queries through a CORS relay (defaults to the public relay)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_RELAY)]
    relay: Option<String>,

    /// Geofunction dialect of the remote endpoint (virtuoso, geosparql)
    #[arg(long)]
    dialect: Option<Dialect>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the listing or GeoJSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> Result<NearbyConfig> {
    let Some(path) = path else {
        return Ok(NearbyConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn apply_overrides(config: &mut NearbyConfig, args: &Args) {
    if let Some(radius) = args.station_radius {
        config.station_radius_km = radius;
    }
    if let Some(radius) = args.place_radius {
        config.place_radius_km = radius;
    }
    if let Some(endpoint) = &args.endpoint {
        config.remote.endpoint = endpoint.clone();
    }
    if let Some(relay) = &args.relay {
        config.remote.relay = Some(relay.clone());
    }
    if let Some(dialect) = args.dialect {
        config.remote.dialect = dialect;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let origin = GeoPoint::new(args.lon, args.lat).context("Invalid origin")?;

    let mut queries = Vec::new();
    if !args.no_stations {
        queries.push(ProximityQuery::new(origin, config.station_radius_km, SourceKind::Stations));
    }
    for kind in &args.places {
        queries.push(ProximityQuery::new(
            origin,
            config.place_radius_km,
            SourceKind::Places(PlaceKind::tourism(kind.as_str())),
        ));
    }
    if queries.is_empty() {
        bail!("Nothing to look up: --no-stations given without any --place");
    }

    tracing::info!(
        lon = origin.longitude,
        lat = origin.latitude,
        sources = queries.len(),
        "resolving"
    );

    let client = reqwest::Client::new();
    let fetcher = HttpFetcher::new(client.clone(), config.user_agent.clone());
    let resolver = Resolver::with_client(config, Arc::new(fetcher), client);

    let mut results = Vec::with_capacity(queries.len());
    for (query, result) in queries.iter().zip(resolver.resolve_all(&queries).await) {
        let result = result.with_context(|| format!("Failed to resolve {:?}", query.source))?;
        results.push((query.source.clone(), result));
    }

    match args.format {
        Format::Text => write_text(&render_text(&results), args.output.as_deref())?,
        Format::Geojson => write_geojson(&to_feature_collection(&results), args.output.as_deref())?,
    }

    Ok(())
}
