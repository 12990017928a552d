use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use fire_response_core::{
    locate_anchors, Board, Cell, FireTier, GridCoord, IterationOrchestrator, ResponseConfig,
    SpatialIndex, Terrain, TickReport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Chance of catching fire per unit of neighbouring fire speed
const SPREAD_CHANCE: f64 = 0.04;
/// Fire speed an unworked cell can grow to
const MAX_FIRE_SPEED: f64 = 8.0;
/// Worked cells go out once their speed drops below this
const EXTINGUISHED_SPEED: f64 = 0.4;

/// Wildfire response demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "response-demo")]
#[command(about = "Fire zone detection and firefighter allocation demo", long_about = None)]
struct Args {
    /// JSON response configuration; replaces the board and pool flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board width in cells
    #[arg(long, default_value_t = 30)]
    width: u32,

    /// Board height in cells
    #[arg(long, default_value_t = 30)]
    height: u32,

    /// Firefighter pool size
    #[arg(short, long, default_value_t = 60)]
    firefighters: usize,

    /// Controller pool size
    #[arg(long, default_value_t = 5)]
    controllers: usize,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 40)]
    ticks: u64,

    /// Number of initial ignition points
    #[arg(short, long, default_value_t = 3)]
    ignitions: u32,

    /// Distance between sensors in cells (0 = no sensors)
    #[arg(long, default_value_t = 8)]
    sensor_spacing: u32,

    /// Seed for the board and the spread step
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Report interval in ticks
    #[arg(short, long, default_value_t = 5)]
    report_interval: u64,

    /// Print the last tick report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    println!("=== Fire Response Demo ===\n");
    println!(
        "Board {}x{}, {} firefighters, {} controllers, seed {}",
        config.board_width, config.board_height, config.firefighters, config.controllers, args.seed
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut board = synthesize_board(&config, args.sensor_spacing, &mut rng);

    let mut spatial = SpatialIndex::new(&config);
    spatial.refresh(&board)?;
    let layout = locate_anchors(&mut board, &spatial, config.classification.dangerous)?;
    println!(
        "Placed {} sensors and {} managing anchors",
        layout.sensors.len(),
        layout.managing.len()
    );
    let testing_window = config.testing_window;
    let mut orchestrator = IterationOrchestrator::with_anchors(config, layout)?;

    let lit = ignite(&mut board, args.ignitions, &mut rng);
    println!("Ignited {} cells\n", lit);

    println!("Tick | Burning | Zones | Busy FF | Free FF | Free ctl | Merges | Retired | Failures");
    println!("-----|---------|-------|---------|---------|----------|--------|---------|---------");

    let interval = args.report_interval.max(1);
    let mut last: Option<TickReport> = None;
    for _ in 0..args.ticks {
        if board.burning_count() == 0 && orchestrator.detector().is_empty() {
            info!("No fire left, stopping early");
            break;
        }

        let report = orchestrator.tick(&mut board)?;
        if report.tick % interval == 0 || !report.merges.is_empty() || !report.retired.is_empty() {
            print_row(&orchestrator, &board, &report);
        }
        spread(&mut board, testing_window, args.seed, report.tick);
        last = Some(report);
    }

    let destroyed = board
        .cells()
        .iter()
        .filter(|c| c.percent_destroyed >= 100.0)
        .count();
    println!("\n=== Run Complete ===");
    println!("Ticks run: {}", orchestrator.ticks());
    println!("Cells still burning: {}", board.burning_count());
    println!("Cells destroyed: {}", destroyed);
    println!("Zones still tracked: {}", orchestrator.detector().len());
    println!(
        "Firefighters busy: {} of {}",
        orchestrator.pool().busy_firefighters(),
        orchestrator.pool().firefighter_capacity()
    );

    if args.json {
        if let Some(report) = &last {
            println!("\n{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<ResponseConfig, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let config: ResponseConfig = serde_json::from_str(&text)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => ResponseConfig {
            firefighters: args.firefighters,
            controllers: args.controllers,
            ..ResponseConfig::with_board(args.width, args.height)
        },
    };
    config.validate()?;
    Ok(config)
}

fn print_row(orchestrator: &IterationOrchestrator, board: &Board, report: &TickReport) {
    let pool = orchestrator.pool();
    println!(
        "{:4} | {:7} | {:5} | {:7} | {:7} | {:8} | {:6} | {:7} | {:8}",
        report.tick,
        board.burning_count(),
        orchestrator.detector().len(),
        pool.busy_firefighters(),
        pool.free_firefighters(),
        pool.free_controllers(),
        report.merges.len(),
        report.retired.len(),
        report.failures.len()
    );
}

/// Random terrain and danger index, sensors on a regular lattice
///
/// Every other sensor also hosts a managing anchor.
fn synthesize_board(config: &ResponseConfig, sensor_spacing: u32, rng: &mut StdRng) -> Board {
    let mut board = Board::new(config.board_width, config.board_height, Terrain::Forest);
    let coords = board.coords();
    for (index, cell) in board.cells_mut().iter_mut().enumerate() {
        cell.terrain = match rng.random_range(0..100) {
            0..=64 => Terrain::Forest,
            65..=89 => Terrain::Grassland,
            90..=95 => Terrain::Sand,
            _ => Terrain::Water,
        };
        if cell.terrain.is_flammable() {
            cell.fire_index = rng.random_range(0.0..60.0);
        }

        if sensor_spacing == 0 {
            continue;
        }
        let at = coords.coord(index);
        let offset = sensor_spacing / 2;
        if at.row % sensor_spacing == offset && at.col % sensor_spacing == offset {
            cell.markers.has_sensor = true;
            cell.markers.center = (at.row / sensor_spacing + at.col / sensor_spacing) % 2 == 0;
        }
    }
    board
}

/// Light up to `count` random flammable cells
fn ignite(board: &mut Board, count: u32, rng: &mut StdRng) -> u32 {
    let (width, height) = (board.width(), board.height());
    let mut lit = 0;
    for _ in 0..count.saturating_mul(20) {
        if lit == count {
            break;
        }
        let at = GridCoord::new(rng.random_range(0..height), rng.random_range(0..width));
        let speed = rng.random_range(1.0..6.0);
        if let Some(cell) = board.cell_at_mut(at) {
            if cell.terrain.is_flammable() && !cell.being_burned {
                cell.ignite(speed);
                info!("Ignited {} at speed {:.2}", at, speed);
                lit += 1;
            }
        }
    }
    lit
}

/// Toy fire step standing in for the external physics
///
/// Worked cells slow down and go out. Unworked cells speed up until they
/// burn through. Fire jumps to flammable neighbours with a chance that grows
/// with the neighbours' total speed.
fn spread(board: &mut Board, window: u32, seed: u64, tick: u64) {
    let coords = board.coords();
    let current = board.cells();
    let next: Vec<Cell> = (0..current.len())
        .into_par_iter()
        .map(|index| {
            let mut cell = current[index].clone();
            if cell.being_burned {
                burn(&mut cell);
                return cell;
            }
            if !cell.terrain.is_flammable()
                || cell.being_extinguished
                || cell.percent_destroyed >= 100.0
            {
                return cell;
            }

            let pressure: f64 = coords
                .window_indices(index, window)
                .filter(|&n| n != index)
                .filter_map(|n| current.get(n))
                .filter(|n| n.being_burned)
                .map(|n| n.fire_speed)
                .sum();
            if pressure > 0.0 {
                let mut rng = StdRng::seed_from_u64(seed ^ (tick << 32) ^ index as u64);
                if rng.random_bool((pressure * SPREAD_CHANCE).min(0.9)) {
                    cell.ignite(rng.random_range(0.5..2.0) + pressure / 4.0);
                }
            }
            cell
        })
        .collect();
    board.cells_mut().clone_from_slice(&next);
}

fn burn(cell: &mut Cell) {
    if cell.being_extinguished {
        let speed = cell.fire_speed * 0.5;
        if speed < EXTINGUISHED_SPEED {
            cell.being_burned = false;
        } else {
            cell.fire_speed = speed;
            cell.fire_tier = FireTier::from_fire_speed(speed);
        }
        return;
    }

    cell.percent_destroyed += cell.fire_speed * 4.0;
    if cell.percent_destroyed >= 100.0 {
        cell.percent_destroyed = 100.0;
        cell.fire_tier = FireTier::Destroyed;
        cell.fire_speed = 0.0;
        cell.being_burned = false;
    } else {
        cell.fire_speed = (cell.fire_speed * 1.15).min(MAX_FIRE_SPEED);
        cell.fire_tier = FireTier::from_fire_speed(cell.fire_speed);
    }
}
