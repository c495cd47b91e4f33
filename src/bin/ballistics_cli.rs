use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use ballistics_trajectory::constants::{FEET_PER_YARD, INCHES_PER_FOOT};
use ballistics_trajectory::{
    Ammo, Atmosphere, Calculator, DragModel, EngineConfig, EngineKind, HitResult, Shot,
    StandardDragTable, TerminationReason, TrajectoryRow, Weapon, Wind,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const FPS_PER_MPH: f64 = 5280.0 / 3600.0;

#[derive(Parser)]
#[command(name = "ballistics-cli")]
#[command(version)]
#[command(about = "Point-mass trajectory calculator", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON); missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Integration scheme
    #[arg(short = 'e', long, global = true, value_enum, default_value = "distance-step")]
    engine: EngineArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Zero the rifle, then calculate a trajectory table
    Trajectory {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        conditions: ConditionArgs,

        /// Zero distance (yards), measured on level ground
        #[arg(short = 'z', long, default_value = "100")]
        zero: f64,

        /// Maximum range (yards)
        #[arg(short = 'r', long, default_value = "1000")]
        range: f64,

        /// Row interval (yards)
        #[arg(short = 's', long, default_value = "100")]
        step: f64,

        /// Also record a row at least this often (seconds); 0 disables
        #[arg(long, default_value = "0")]
        time_step: f64,

        /// Record every event (zero crossings, Mach 1, apex) at chart resolution
        #[arg(long)]
        extra: bool,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Find the barrel elevation that zeroes the rifle at a distance
    Zero {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        conditions: ConditionArgs,

        /// Zero distance along the line of sight (yards)
        #[arg(short = 'z', long, default_value = "100")]
        zero: f64,
    },

    /// Display engine information
    Info,
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Muzzle velocity (ft/s)
    #[arg(short = 'v', long)]
    velocity: f64,

    /// Ballistic coefficient
    #[arg(short = 'b', long)]
    bc: f64,

    /// Standard drag table the ballistic coefficient refers to
    #[arg(long, value_enum, default_value = "g7")]
    drag_table: DragTableArg,

    /// Bullet weight (grains)
    #[arg(short = 'w', long, default_value = "0")]
    weight: f64,

    /// Bullet diameter (inches)
    #[arg(short = 'd', long, default_value = "0")]
    diameter: f64,

    /// Bullet length (inches)
    #[arg(short = 'l', long, default_value = "0")]
    length: f64,

    /// Sight height above the bore (inches)
    #[arg(long, default_value = "2")]
    sight_height: f64,

    /// Barrel twist (inches per turn, negative for left-hand); 0 disables spin drift
    #[arg(short = 't', long, default_value = "0")]
    twist: f64,
}

#[derive(Args, Debug)]
struct ConditionArgs {
    /// Look angle to the target (degrees, positive uphill)
    #[arg(short = 'a', long, default_value = "0", allow_hyphen_values = true)]
    look_angle: f64,

    /// Wind speed (mph)
    #[arg(long, default_value = "0")]
    wind_speed: f64,

    /// Direction the wind blows from (degrees, 0 = from behind, 90 = from the left)
    #[arg(long, default_value = "0")]
    wind_direction: f64,

    /// Temperature (°F)
    #[arg(long, default_value = "59", allow_hyphen_values = true)]
    temperature: f64,

    /// Station pressure (inHg)
    #[arg(long, default_value = "29.92")]
    pressure: f64,

    /// Relative humidity (percent)
    #[arg(long, default_value = "0")]
    humidity: f64,

    /// Altitude (ft)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    altitude: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    DistanceStep,
    Leapfrog,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::DistanceStep => EngineKind::DistanceStep,
            EngineArg::Leapfrog => EngineKind::LeapFrog,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DragTableArg {
    G1,
    G7,
}

impl From<DragTableArg> for StandardDragTable {
    fn from(arg: DragTableArg) -> Self {
        match arg {
            DragTableArg::G1 => StandardDragTable::G1,
            DragTableArg::G7 => StandardDragTable::G7,
        }
    }
}

#[derive(Debug, Serialize)]
struct TrajectoryReport<'a> {
    engine: &'a str,
    zero_distance_ft: f64,
    zero_elevation_rad: f64,
    termination: Option<TerminationReason>,
    rows: &'a [TrajectoryRow],
}

#[derive(Debug, Serialize)]
struct ZeroReport<'a> {
    engine: &'a str,
    zero_distance_ft: f64,
    look_angle_rad: f64,
    barrel_elevation_rad: f64,
    zero_elevation_rad: f64,
    zero_elevation_moa: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Trajectory {
            load,
            conditions,
            zero,
            range,
            step,
            time_step,
            extra,
            output,
        } => {
            let calc = Calculator::new(config, cli.engine.into())?;
            let mut shot = build_shot(&load, &conditions)?;
            let look_angle = shot.look_angle_rad;

            // Zero on level ground, then aim along the look angle
            shot.look_angle_rad = 0.0;
            let zero_distance_ft = zero * FEET_PER_YARD;
            calc.set_weapon_zero(&mut shot, zero_distance_ft)?;
            let shot = shot.with_look_angle(look_angle);

            let hit = calc.fire(
                &shot,
                range * FEET_PER_YARD,
                step * FEET_PER_YARD,
                extra,
                time_step,
            )?;
            let report = TrajectoryReport {
                engine: calc.engine_name(),
                zero_distance_ft,
                zero_elevation_rad: shot.weapon.zero_elevation_rad,
                termination: hit.termination,
                rows: &hit.rows,
            };
            display_trajectory(&report, &hit, output)?;
        }

        Commands::Zero { load, conditions, zero } => {
            let calc = Calculator::new(config, cli.engine.into())?;
            let mut shot = build_shot(&load, &conditions)?;
            let zero_distance_ft = zero * FEET_PER_YARD;
            let zero_elevation_rad = calc.set_weapon_zero(&mut shot, zero_distance_ft)?;
            let report = ZeroReport {
                engine: calc.engine_name(),
                zero_distance_ft,
                look_angle_rad: shot.look_angle_rad,
                barrel_elevation_rad: shot.barrel_elevation_rad,
                zero_elevation_rad,
                zero_elevation_moa: zero_elevation_rad.to_degrees() * 60.0,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      BALLISTICS TRAJECTORY v{:<10} ║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Point-mass trajectory calculator.      ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Engines:                               ║");
            println!("║ • distance-step (semi-implicit)        ║");
            println!("║ • leapfrog (fixed time step)           ║");
            println!("║ Drag tables: G1, G7                    ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Max calc step:     {:>8.3} ft         ║", config.max_calc_step_size_ft);
            println!("║ Zero accuracy:     {:>8.6} ft         ║", config.zero_finding_accuracy_ft);
            println!("║ Min velocity:      {:>8.1} ft/s       ║", config.minimum_velocity_fps);
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn build_shot(load: &LoadArgs, conditions: &ConditionArgs) -> Result<Shot, Box<dyn Error>> {
    let dm = DragModel::standard(load.bc, load.drag_table.into())?.with_dimensions(
        load.weight,
        load.diameter,
        load.length,
    );
    let weapon = Weapon::new(load.sight_height / INCHES_PER_FOOT, load.twist);
    let atmosphere = Atmosphere::new(
        conditions.altitude,
        conditions.pressure,
        conditions.temperature,
        conditions.humidity,
    );

    let mut shot = Shot::new(weapon, Ammo::new(dm, load.velocity))
        .with_atmosphere(Arc::new(atmosphere))
        .with_look_angle(conditions.look_angle.to_radians());
    if conditions.wind_speed != 0.0 {
        shot = shot.with_winds(vec![Wind::new(
            conditions.wind_speed * FPS_PER_MPH,
            conditions.wind_direction.to_radians(),
        )]);
    }
    Ok(shot)
}

fn display_trajectory(
    report: &TrajectoryReport<'_>,
    hit: &HitResult,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }

        OutputFormat::Csv => {
            println!("time_s,distance_ft,velocity_fps,mach,height_ft,target_drop_ft,windage_ft,energy_ftlb,flag");
            for row in &hit.rows {
                println!(
                    "{:.4},{:.2},{:.1},{:.3},{:.4},{:.4},{:.4},{:.0},{}",
                    row.time_s,
                    row.distance_ft,
                    row.velocity_fps,
                    row.mach,
                    row.height_ft,
                    row.target_drop_ft,
                    row.windage_ft,
                    row.energy_ftlb,
                    row.flag
                );
            }
        }

        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         TRAJECTORY RESULTS             ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Engine:            {:>14}      ║", report.engine);
            println!("║ Zero distance:     {:>8.1} yd         ║", report.zero_distance_ft / FEET_PER_YARD);
            println!("║ Zero elevation:    {:>8.2} MOA        ║", report.zero_elevation_rad.to_degrees() * 60.0);
            if let Some(reason) = report.termination {
                println!("║ Stopped early: {:<24}║", reason.to_string());
            }
            println!("╚════════════════════════════════════════╝");

            println!("┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│ Range yd │ Time (s) │ Vel ft/s │ Drop in  │ Wind in  │ Energy   │");
            println!("├──────────┼──────────┼──────────┼──────────┼──────────┼──────────┤");
            for row in &hit.rows {
                println!(
                    "│ {:>8.1} │ {:>8.3} │ {:>8.1} │ {:>8.2} │ {:>8.2} │ {:>8.0} │",
                    row.distance_ft / FEET_PER_YARD,
                    row.time_s,
                    row.velocity_fps,
                    row.target_drop_ft * INCHES_PER_FOOT,
                    row.windage_ft * INCHES_PER_FOOT,
                    row.energy_ftlb
                );
            }
            println!("└──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘");
        }
    }

    Ok(())
}
