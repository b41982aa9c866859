use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use strata_blocks::Material;
use strata_chunk::{CancelToken, HeightLimits, HeightmapKind, column_sample, height_at};
use strata_runtime::{GenerationRuntime, RuntimeConfig, square_region, summarize};
use strata_world::{
    ChunkCoord, TERRAIN_STAGE_LABELS, TerrainGenerator, WorldGenParams, load_params_from_path,
};

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Deterministic volumetric terrain generation")]
struct Cli {
    /// World seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Worldgen TOML; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a square of chunks and print a summary
    Generate {
        #[arg(long, default_value_t = 0)]
        cx: i32,
        #[arg(long, default_value_t = 0)]
        cz: i32,
        #[arg(long, default_value_t = 1)]
        radius: i32,
        /// Worker threads; defaults to available parallelism
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Terrain height of one block column
    Height {
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        z: i32,
        #[arg(long, value_enum, default_value_t = Kind::WorldSurface)]
        kind: Kind,
    },
    /// Materials of one block column, as runs from the top
    Column {
        #[arg(allow_hyphen_values = true)]
        x: i32,
        #[arg(allow_hyphen_values = true)]
        z: i32,
        #[arg(long, allow_hyphen_values = true)]
        min_y: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        max_y: Option<i32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    OceanFloor,
    WorldSurface,
}

impl From<Kind> for HeightmapKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::OceanFloor => HeightmapKind::OceanFloor,
            Kind::WorldSurface => HeightmapKind::WorldSurface,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let params = match &cli.config {
        Some(path) => {
            log::info!("loading worldgen config from {}", path.display());
            load_params_from_path(path)?
        }
        None => WorldGenParams::default(),
    };
    let generator = TerrainGenerator::new(cli.seed, params);
    let full = HeightLimits::of(generator.shape());

    match cli.command {
        Command::Generate {
            cx,
            cz,
            radius,
            workers,
        } => {
            let mut config = RuntimeConfig::default();
            if let Some(w) = workers {
                config.workers = w;
            }
            let runtime = GenerationRuntime::new(Arc::new(generator), config)?;
            let coords = square_region(ChunkCoord::new(cx, cz), radius.max(0));
            let started = Instant::now();
            let chunks = runtime.generate_region(&coords, &CancelToken::new())?;
            let elapsed = started.elapsed();

            let mut histogram = [0u64; Material::ALL.len()];
            for chunk in &chunks {
                for m in &chunk.buf.blocks {
                    histogram[m.as_byte() as usize] += 1;
                }
            }
            let metrics = summarize(&chunks);
            println!(
                "{} chunks with {} workers in {:.1?}",
                chunks.len(),
                runtime.workers(),
                elapsed
            );
            for (label, micros) in TERRAIN_STAGE_LABELS.iter().zip(metrics.stage_micros) {
                println!("  {label:<8} {:>10.1} ms", micros as f64 / 1000.0);
            }
            println!(
                "  fluid ticks {}, vein blocks {}, non-finite {}",
                metrics.fluid_ticks, metrics.vein_blocks, metrics.non_finite
            );
            for m in Material::ALL {
                let n = histogram[m.as_byte() as usize];
                if n > 0 {
                    println!("  {:<18} {n}", m.name());
                }
            }
        }
        Command::Height { x, z, kind } => {
            log::debug!("height query in chunk {:?}", ChunkCoord::containing(x, z));
            let y = height_at(&generator, x, z, kind.into(), full)?;
            println!("{y}");
        }
        Command::Column { x, z, min_y, max_y } => {
            let lo = min_y.unwrap_or(full.min_y);
            let hi = max_y.unwrap_or(full.max_y());
            let limits = HeightLimits {
                min_y: lo,
                height: hi.saturating_sub(lo).max(0),
            };
            log::info!(
                "column ({x}, {z}) in chunk {:?}, y {lo}..{hi}",
                ChunkCoord::containing(x, z)
            );
            let column = column_sample(&generator, x, z, limits)?;
            let mut top = limits.max_y() - 1;
            for run in column.chunk_by(|a, b| a == b).rev() {
                let bottom = top - run.len() as i32 + 1;
                println!("{top:>5} .. {bottom:>5}  {}", run[0]);
                top = bottom - 1;
            }
        }
    }
    Ok(())
}
