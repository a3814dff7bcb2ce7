mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stratavox_compose::{BlockVocabulary, CancelToken, Compositor, StampConfig};
use stratavox_persist::{FileStore, WorldSink};
use stratavox_stream::{JsonlReader, JsonlWriter, MemorySource, OverrideSource};
use tracing_subscriber::EnvFilter;

use crate::config::BuildConfig;

#[derive(Parser)]
#[command(name = "stratavox", about = "Layered voxel world compositor")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compose a world from a build config and save it
    Compose {
        /// Path to the build config JSON
        #[arg(short, long)]
        config: PathBuf,
        /// Output store directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Inspect a saved world store
    Inspect {
        /// Store directory
        dir: PathBuf,
        /// Verify payload hashes and decode the grid
        #[arg(long)]
        verify: bool,
    },
    /// Re-encode an override stream, compressing or decompressing by extension
    Pack {
        /// Input stream, `.jsonl` or `.jsonl.zst`
        input: PathBuf,
        /// Output stream, `.jsonl` or `.jsonl.zst`
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stratavox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("compose: {}", stratavox_compose::crate_info());
            println!("stream: {}", stratavox_stream::crate_info());
            println!("persist: {}", stratavox_persist::crate_info());
            let stamp = StampConfig::default();
            println!(
                "default levels: stone={}, dirt={}, sea={}",
                stamp.stone_level, stamp.dirt_level, stamp.sea_level
            );
            println!(
                "default footprints: pool {}x{}x{}, island {}x{}x{}",
                stamp.pool_width, stamp.pool_width, stamp.pool_depth,
                stamp.island_width, stamp.island_width, stamp.island_depth
            );
        }
        Commands::Compose { config, output } => {
            let build = BuildConfig::from_path(&config)?;
            let layers = build.layer_stack()?;
            let directives = build.directives();
            let island = build.island();

            println!(
                "Composing '{}' over {}",
                build.world.world_name, build.bounds
            );

            let source: Box<dyn OverrideSource> = match &build.overrides {
                Some(path) => Box::new(JsonlReader::open(path)?),
                None => Box::new(MemorySource::new(Vec::new())),
            };

            let compositor = Compositor::new(BlockVocabulary::new(), build.stamp);
            let grid = compositor.compose(
                build.bounds,
                &layers,
                source,
                &directives,
                island,
                &CancelToken::new(),
            )?;
            println!("Composed {} non-air blocks", grid.non_air_blocks());

            let mut store = FileStore::create(&output)?;
            store.save(&build.world, &grid)?;
            tracing::info!(path = %output.display(), "world store written");
            println!("Saved to {}", output.display());
        }
        Commands::Inspect { dir, verify } => {
            let store = FileStore::open(&dir)?;
            let meta = store.read_meta()?;
            println!("World: {}", meta.world.world_name);
            println!(
                "Generator: {:?}, mode: {:?}, structures: {}",
                meta.world.generator, meta.world.game_mode, meta.world.generate_structures
            );
            println!("Spawn: {}", meta.world.spawn_pos);
            println!("Bounds: {}", meta.bounds);
            println!("Non-air blocks: {}", meta.non_air_blocks);
            println!("Schema: v{}", meta.schema_version);
            if verify {
                store.verify_integrity()?;
                let (_, grid) = store.load()?;
                anyhow::ensure!(
                    grid.non_air_blocks() == meta.non_air_blocks,
                    "grid census does not match metadata"
                );
                let spawn = meta.world.spawn_pos;
                match grid.highest_block_y(spawn.x, spawn.z) {
                    Some(y) => println!("Highest block under spawn: y={y}"),
                    None => println!("Highest block under spawn: none"),
                }
                println!("Integrity: OK");
            }
        }
        Commands::Pack { input, output } => {
            let mut reader = JsonlReader::open(&input)?;
            let mut writer = JsonlWriter::create(&output)?;
            let mut count: u64 = 0;
            while let Some(entry) = reader.next_entry()? {
                writer.append(&entry)?;
                count += 1;
            }
            writer.finish()?;
            println!("Packed {count} override entries into {}", output.display());
        }
    }

    Ok(())
}
