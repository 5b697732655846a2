//! hill_climb — planning answers and a short fleet run for a vehicle catalog.
//!
//! Usage: `hill_climb [catalog.json] [trace.csv]`
//!
//! Without arguments the bundled `catalog.json` is used and the trace goes to
//! `hill_climb_trace.csv`.  Set `RUST_LOG=debug` to see section changes.
//!
//! For every consist in the catalog the tool prints what a planner would ask
//! before buying it: top speed empty and full, the heaviest train it can
//! haul up each grade, and how far it needs to stop.  It then puts all
//! consists on the catalog route and lets them shuttle for
//! `config.total_ticks` steps.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cv_convoy::PotentialConvoy;
use cv_core::units::{KMH_SPEED_UNLIMITED, WEIGHT_UNLIMITED, kmh_to_v};
use cv_core::{SimConfig, Tick};
use cv_physics::{ConvoyPhysics, VehicleSpec};
use cv_sim::{
    Convoy, ConvoyPlan, CsvTraceObserver, FleetBuilder, FleetObserver, Route, Section,
};

const BUNDLED_CATALOG: &str = include_str!("../catalog.json");
const DEFAULT_TRACE: &str = "hill_climb_trace.csv";
/// Ticks between the departures of consecutive consists.
const DEPARTURE_SPACING: u64 = 60;
const DWELL_TICKS: u64 = 30;

// ── Catalog file ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Catalog {
    config:          SimConfig,
    vehicles:        Vec<VehicleSpec>,
    consists:        Vec<ConsistEntry>,
    route:           Vec<Section>,
    #[serde(default)]
    grades_permille: Vec<i32>,
}

#[derive(Deserialize)]
struct ConsistEntry {
    name:     String,
    #[serde(default)]
    loaded:   bool,
    vehicles: Vec<VehicleRef>,
}

#[derive(Deserialize)]
struct VehicleRef {
    id:    String,
    #[serde(default = "one")]
    count: usize,
}

fn one() -> usize {
    1
}

fn resolve(
    entry:   &ConsistEntry,
    catalog: &FxHashMap<String, Arc<VehicleSpec>>,
) -> Result<Vec<Arc<VehicleSpec>>> {
    let mut consist = Vec::new();
    for r in &entry.vehicles {
        let Some(spec) = catalog.get(&r.id) else {
            bail!("consist {:?}: unknown vehicle {:?}", entry.name, r.id);
        };
        consist.extend(std::iter::repeat_n(Arc::clone(spec), r.count));
    }
    Ok(consist)
}

// ── Planning report ───────────────────────────────────────────────────────────

fn fmt_kmh(kmh: i32) -> String {
    if kmh >= KMH_SPEED_UNLIMITED { "unlimited".into() } else { format!("{kmh} km/h") }
}

fn fmt_tonnes(kg: i32) -> String {
    if kg == WEIGHT_UNLIMITED { "unlimited".into() } else { format!("{} t", kg / 1000) }
}

fn fmt_metres(m: i32) -> String {
    if m == i32::MAX { "cannot stop".into() } else { format!("{m} m") }
}

fn plan(name: &str, consist: &[Arc<VehicleSpec>], config: &SimConfig, grades: &[i32]) {
    let refs: Vec<&VehicleSpec> = consist.iter().map(Arc::as_ref).collect();
    let Some(way) = refs.first().map(|v| v.way) else {
        return;
    };
    let mut lazy = PotentialConvoy::new(refs, config.physics).lazy();

    let vehicles = lazy.vehicle_summary();
    let freight = lazy.freight_summary();
    let empty = lazy.weight_with_load(0);
    let full = lazy.weight_with_load(freight.max_freight_weight);
    let kmh_empty = lazy.calc_max_speed(&empty);
    let kmh_full = lazy.calc_max_speed(&full);

    println!(
        "── {name}: {} vehicles, {} tiles, {} t empty, up to {} t payload",
        vehicles.count,
        vehicles.tiles,
        vehicles.weight / 1000,
        freight.max_freight_weight / 1000,
    );
    println!("   top speed      empty {:>10}   full {:>10}", fmt_kmh(kmh_empty), fmt_kmh(kmh_full));
    println!(
        "   braking        empty {:>10}   full {:>10}",
        fmt_metres(lazy.calc_min_braking_distance(&empty, kmh_to_v(kmh_empty))),
        fmt_metres(lazy.calc_min_braking_distance(&full, kmh_to_v(kmh_full))),
    );
    for &grade in grades {
        let sin = way.base_friction() as i32 + grade;
        println!(
            "   grade {grade:>3} ‰    start {:>10}   haul {:>10}",
            fmt_tonnes(lazy.calc_max_starting_weight(sin)),
            fmt_tonnes(lazy.calc_max_weight(sin)),
        );
    }
}

// ── Fleet run ─────────────────────────────────────────────────────────────────

/// Writes the CSV trace and counts events for the final report.
struct Report {
    trace:    CsvTraceObserver,
    arrivals: usize,
    stalls:   usize,
}

impl FleetObserver for Report {
    fn on_arrival(&mut self, _tick: Tick, _convoy: &Convoy) {
        self.arrivals += 1;
    }

    fn on_stall(&mut self, _tick: Tick, _convoy: &Convoy) {
        self.stalls += 1;
    }

    fn on_trace(&mut self, tick: Tick, convoys: &[Convoy], route: &Route) {
        self.trace.on_trace(tick, convoys, route);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.trace.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let catalog_text = match args.next() {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => BUNDLED_CATALOG.to_owned(),
    };
    let trace_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_TRACE.to_owned()));

    let catalog: Catalog = serde_json::from_str(&catalog_text).context("parsing catalog")?;
    catalog.config.validate()?;

    let mut specs = FxHashMap::default();
    for spec in catalog.vehicles {
        spec.validate()?;
        specs.insert(spec.name.clone(), Arc::new(spec));
    }
    info!(vehicles = specs.len(), consists = catalog.consists.len(), "catalog loaded");

    println!("=== hill_climb — convoy planning ===");
    println!();
    let mut plans = Vec::with_capacity(catalog.consists.len());
    for (i, entry) in catalog.consists.iter().enumerate() {
        let consist = resolve(entry, &specs)?;
        plan(&entry.name, &consist, &catalog.config, &catalog.grades_permille);
        println!();

        let mut p = ConvoyPlan::new(entry.name.clone(), consist)
            .departing_at(Tick(i as u64 * DEPARTURE_SPACING));
        if entry.loaded {
            p = p.loaded();
        }
        plans.push(p);
    }

    let route = Route::new(catalog.route)?;
    println!(
        "=== fleet run: {} convoys, {} sections, {} steps, {} ticks ===",
        plans.len(),
        route.sections().len(),
        route.len_steps(),
        catalog.config.total_ticks,
    );

    let mut fleet = FleetBuilder::new(catalog.config, route)
        .convoys(plans)
        .dwell_ticks(DWELL_TICKS)
        .build()?;
    let mut report = Report {
        trace:    CsvTraceObserver::create(&trace_path)?,
        arrivals: 0,
        stalls:   0,
    };

    let t0 = Instant::now();
    fleet.run(&mut report)?;
    if let Some(e) = report.trace.take_error() {
        return Err(e).context("writing trace");
    }
    println!(
        "Ran {} ticks ({:.0} s simulated) in {:.1} ms; {} arrivals, {} stalls",
        fleet.clock.current_tick.0,
        fleet.clock.elapsed_secs(),
        t0.elapsed().as_secs_f64() * 1e3,
        report.arrivals,
        report.stalls,
    );
    println!();

    println!("{:<16} {:>5} {:>9} {:>8} {:>9} {:>7}  state", "convoy", "trips", "position", "section", "speed", "load t");
    for c in &fleet.convoys {
        let state = if c.stalled {
            "stalled"
        } else if c.is_running() {
            "running"
        } else {
            "waiting"
        };
        println!(
            "{:<16} {:>5} {:>9} {:>8} {:>5} km/h {:>7}  {state} ({:?})",
            c.name,
            c.trips,
            c.position,
            c.section.0,
            c.speed_kmh(),
            c.train.payload_kg() / 1000,
            c.direction,
        );
    }
    println!();
    println!("Trace: {} ({} rows)", trace_path.display(), report.trace.rows_written());
    Ok(())
}
