use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nav_core::clock::EventKind;
use nav_core::config::NavigationConfig;
use nav_core::delivery_route::Delivery;
use nav_core::geo::GeoPoint;
use nav_core::geocoding::{CachedLookupGeocoder, Geocoder, KnownAddresses};
use nav_core::navigation::NavigationSnapshot;
use nav_core::navigator::Navigator;
use nav_core::routing::{build_route_provider, RouteProfile, RouteProvider, RouteProviderKind};

mod script;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "delivery-nav",
    about = "Simulated delivery-driver navigation",
    long_about = "Drive a simulated vehicle along delivery routes, divert it onto a wrong\n\
                  route, and watch the route being recalculated, all in virtual time."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print one JSON snapshot per tick
    Simulate(SimulateArgs),
    /// Fetch a single route and print it as JSON
    Route {
        /// Start as `lat,lng`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: GeoPoint,
        /// End as `lat,lng`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: GeoPoint,
        #[command(flatten)]
        provider: ProviderArgs,
    },
    /// Resolve an address to coordinates
    Geocode {
        address: String,
        #[command(flatten)]
        provider: ProviderArgs,
    },
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long, env = "DELIVERY_NAV_CONFIG")]
    config: Option<PathBuf>,
    /// Vehicle speed in km/h
    #[arg(long)]
    speed: Option<f64>,
    /// Tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Virtual delay before a fetched route is applied
    #[arg(long)]
    latency_ms: Option<u64>,
    /// Recalculation period while diverted
    #[arg(long)]
    recalculation_ms: Option<u64>,
    /// Virtual time to simulate
    #[arg(long, default_value_t = 60_000)]
    duration_ms: u64,
    /// Driver location as `lat,lng`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    driver: Option<GeoPoint>,
    /// Delivery address; resolved through the geocoder
    #[arg(long, conflicts_with = "delivery_at")]
    delivery: Option<String>,
    /// Delivery location as `lat,lng`
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    delivery_at: Option<GeoPoint>,
    /// Toggle the wrong route at this virtual time
    #[arg(long)]
    wrong_route_at: Option<u64>,
    /// JSON file of timed inputs, replaces the flags above that drive inputs
    #[arg(long)]
    script: Option<PathBuf>,
    #[command(flatten)]
    provider: ProviderArgs,
}

#[derive(clap::Args)]
struct ProviderArgs {
    /// Routing backend; defaults to the configuration file's choice
    #[arg(long, value_enum)]
    provider: Option<ProviderChoice>,
    /// OpenRouteService base URL
    #[arg(long, env = "ORS_ENDPOINT", default_value = nav_core::routing::ors::DEFAULT_ENDPOINT)]
    ors_endpoint: String,
    /// OpenRouteService API key
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    ors_api_key: Option<String>,
    /// Route profile, e.g. `driving-car`
    #[arg(long)]
    profile: Option<RouteProfile>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderChoice {
    /// Densified straight chord, no network access
    StraightLine,
    /// OpenRouteService HTTP API
    Ors,
}

// ── helpers ────────────────────────────────────────────────────────

fn parse_point(raw: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got '{raw}'"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude '{lat}': {e}"))?;
    let longitude: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude '{lng}': {e}"))?;
    let point = GeoPoint::new(latitude, longitude);
    if !point.is_finite() {
        return Err(format!("non-finite coordinate '{raw}'"));
    }
    Ok(point)
}

impl ProviderArgs {
    fn provider_kind(&self, fallback: RouteProviderKind) -> Result<RouteProviderKind> {
        match self.provider {
            None => Ok(fallback),
            Some(ProviderChoice::StraightLine) => Ok(RouteProviderKind::default()),
            Some(ProviderChoice::Ors) => self.ors_kind(),
        }
    }

    #[cfg(feature = "ors")]
    fn ors_kind(&self) -> Result<RouteProviderKind> {
        let api_key = self
            .ors_api_key
            .clone()
            .context("the ors provider needs ORS_API_KEY or --ors-api-key")?;
        Ok(RouteProviderKind::Ors {
            endpoint: self.ors_endpoint.clone(),
            api_key,
        })
    }

    #[cfg(not(feature = "ors"))]
    fn ors_kind(&self) -> Result<RouteProviderKind> {
        bail!("delivery-nav was built without the `ors` feature")
    }

    #[cfg(feature = "ors")]
    fn geocoder(&self) -> CachedLookupGeocoder {
        let fallback = self.ors_api_key.as_deref().map(|key| {
            Box::new(nav_core::geocoding::OrsGeocoder::new(&self.ors_endpoint, key))
                as Box<dyn Geocoder>
        });
        CachedLookupGeocoder::new(KnownAddresses::campinas(), fallback)
    }

    #[cfg(not(feature = "ors"))]
    fn geocoder(&self) -> CachedLookupGeocoder {
        CachedLookupGeocoder::new(KnownAddresses::campinas(), None)
    }
}

fn load_config(args: &SimulateArgs) -> Result<NavigationConfig> {
    let mut config = match &args.config {
        Some(path) => NavigationConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NavigationConfig::default(),
    };
    if let Some(speed) = args.speed {
        config = config.with_speed_kmh(speed);
    }
    if let Some(tick_ms) = args.tick_ms {
        config = config.with_tick_ms(tick_ms);
    }
    if let Some(latency_ms) = args.latency_ms {
        config = config.with_route_latency_ms(latency_ms);
    }
    if let Some(interval_ms) = args.recalculation_ms {
        config = config.with_recalculation_interval_ms(interval_ms);
    }
    if let Some(profile) = args.provider.profile {
        config = config.with_profile(profile);
    }
    let provider = args.provider.provider_kind(config.provider.clone())?;
    config = config.with_provider(provider);
    config.validate()?;
    Ok(config)
}

fn write_snapshots(out: &mut impl Write, snapshots: &[NavigationSnapshot]) -> Result<()> {
    for snapshot in snapshots {
        serde_json::to_writer(&mut *out, snapshot)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Advance to `until_ms`, collecting a snapshot after every tick.
fn drive_until(navigator: &mut Navigator, until_ms: u64, out: &mut impl Write) -> Result<()> {
    let mut snapshots = Vec::new();
    navigator.run_until_with_hook(until_ms, |world, event| {
        if event.kind == EventKind::SimulationTick {
            snapshots.push(NavigationSnapshot::capture(world));
        }
    });
    write_snapshots(out, &snapshots)
}

// ── commands ───────────────────────────────────────────────────────

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(&args)?;
    let mut navigator = Navigator::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = &args.script {
        let entries = script::load_script(path)?;
        log::info!("replaying {} scripted inputs from {}", entries.len(), path.display());
        for entry in entries {
            if entry.at_ms > args.duration_ms {
                log::warn!("input at {} ms is past the end of the run", entry.at_ms);
                break;
            }
            drive_until(&mut navigator, entry.at_ms, &mut out)?;
            navigator.submit(entry.input);
        }
    } else {
        let driver = args
            .driver
            .context("--driver is required without --script")?;
        navigator.update_driver_location(driver);

        let target = match (&args.delivery, args.delivery_at) {
            (Some(address), _) => {
                let Some(point) = args.provider.geocoder().geocode(address) else {
                    bail!("could not geocode '{address}'");
                };
                Some(Delivery::new("cli", Some(point)).with_address(address.clone()))
            }
            (None, Some(point)) => Some(Delivery::new("cli", Some(point))),
            (None, None) => None,
        };
        if target.is_none() {
            log::warn!("no delivery selected; the vehicle has no route to follow");
        }
        navigator.select_delivery(target);
        navigator.start();

        if let Some(at_ms) = args.wrong_route_at {
            drive_until(&mut navigator, at_ms.min(args.duration_ms), &mut out)?;
            navigator.toggle_wrong_route();
        }
    }

    drive_until(&mut navigator, args.duration_ms, &mut out)?;
    navigator.shutdown();

    let last = navigator.snapshot();
    log::info!(
        "finished at {} ms: mode {:?}, {:.1} of {:.1} m{}",
        last.time_ms,
        last.mode,
        last.progress_m,
        last.total_length_m,
        if last.arrived { ", arrived" } else { "" }
    );
    out.flush()?;
    Ok(())
}

fn route(from: GeoPoint, to: GeoPoint, provider: ProviderArgs) -> Result<()> {
    let kind = provider.provider_kind(RouteProviderKind::default())?;
    let profile = provider.profile.unwrap_or_default();
    let polyline = build_route_provider(&kind)
        .route(from, to, profile)
        .context("route request failed")?;
    log::info!(
        "{} points, {:.1} m",
        polyline.len(),
        nav_core::geo::polyline_length_m(&polyline)
    );
    println!("{}", serde_json::to_string(&polyline)?);
    Ok(())
}

fn geocode(address: &str, provider: ProviderArgs) -> Result<()> {
    let Some(point) = provider.geocoder().geocode(address) else {
        bail!("no match for '{address}'");
    };
    println!("{}", serde_json::to_string(&point)?);
    Ok(())
}

// ── main ───────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Route { from, to, provider } => route(from, to, provider),
        Commands::Geocode { address, provider } => geocode(&address, provider),
    }
}
