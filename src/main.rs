use std::error::Error;
use std::fs;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use island_generator::export;
use island_generator::terrain::NoiseParams;
use island_generator::world::generate_world;

#[derive(Parser, Debug)]
#[command(name = "island_generator")]
#[command(about = "Generate procedural hex island worlds with sailing navigation")]
struct Args {
    /// Grid width in tiles
    #[arg(short = 'W', long, default_value = "50")]
    width: usize,

    /// Grid height in tiles
    #[arg(short = 'H', long, default_value = "50")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Noise feature scale (larger = broader islands)
    #[arg(long, default_value = "20.0")]
    scale: f32,

    /// Power-curve exponent applied to the noise value
    #[arg(long, default_value = "6")]
    octaves: u32,

    /// Amplitude lift on the raw noise sample
    #[arg(long, default_value = "0.5")]
    persistence: f32,

    /// Frequency multiplier on the sampling coordinates
    #[arg(long, default_value = "2.0")]
    lacunarity: f32,

    /// Export the terrain category map as PNG
    #[arg(long)]
    export_terrain: Option<String>,

    /// Export the raw elevation map as PNG
    #[arg(long)]
    export_height: Option<String>,

    /// Print an ASCII preview of the board
    #[arg(long)]
    ascii: bool,

    /// Write a JSON generation summary
    #[arg(long)]
    summary: Option<String>,

    /// Run a demo sailing query between two random water tiles
    #[arg(long)]
    demo_path: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let params = NoiseParams {
        scale: args.scale,
        octaves: args.octaves,
        persistence: args.persistence,
        lacunarity: args.lacunarity,
    };

    let world = generate_world(args.width, args.height, seed, &params)?;

    println!("Seed: {seed}");
    println!("Grid: {}x{} tiles", world.width, world.height);
    println!(
        "Islands: {} (largest: {} tiles)",
        world.islands.len(),
        world.largest_island().map_or(0, |i| i.len())
    );
    println!(
        "Rock clusters: {} (largest: {} tiles)",
        world.clusters.len(),
        world.clusters.last().map_or(0, |c| c.len())
    );
    println!(
        "Docks: {}",
        world.islands.iter().map(|i| i.dock_coords.len()).sum::<usize>()
    );
    println!("Sea tiles: {}", world.sea_tiles.len());

    if args.ascii {
        println!("{}", export::render_ascii(&world));
    }

    if let Some(path) = &args.export_terrain {
        export::export_terrain_map(&world, path)?;
        println!("Terrain map written to {path}");
    }

    if let Some(path) = &args.export_height {
        export::export_heightmap(&world.heightmap, path)?;
        println!("Heightmap written to {path}");
    }

    if let Some(path) = &args.summary {
        let summary = serde_json::json!({
            "seed": seed,
            "width": world.width,
            "height": world.height,
            "noise": world.noise_params,
            "islands": world.islands.len(),
            "clusters": world.clusters.len(),
            "sea_tiles": world.sea_tiles.len(),
            "docks": world.islands.iter().map(|i| i.dock_coords.len()).sum::<usize>(),
        });
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        println!("Summary written to {path}");
    }

    if args.demo_path {
        let mut rng = ChaCha8Rng::seed_from_u64(world.seeds.placement);
        match (
            world.random_water_cell(&mut rng),
            world.random_water_cell(&mut rng),
        ) {
            (Some(start), Some(goal)) => match world.find_path(start, goal)? {
                Some(path) => println!(
                    "Demo path {start} -> {goal}: {} steps (g = {})",
                    path.len() - 1,
                    path.g
                ),
                None => println!("Demo path {start} -> {goal}: unreachable"),
            },
            _ => println!("Demo path skipped: no water tiles"),
        }
    }

    Ok(())
}
