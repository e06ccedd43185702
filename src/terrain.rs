//! Terrain synthesis: Perlin elevation sampling and tile classification.
//!
//! One noise evaluation per cell produces two coupled outputs: a continuous
//! elevation used for mesh heights, and a discrete tile category cut from the
//! normalized (pre-power-curve) noise value by an ordered threshold table.

use log::debug;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::grid::{GridMap, HexCoord};

/// Multiplier turning a shaped noise value into a world-space height.
pub const HEIGHT_SCALE_FACTOR: f32 = 100.0;

/// Ceiling for tile surface heights.
pub const MAX_WORLD_HEIGHT: f32 = 120.0;

// =============================================================================
// TILE CATEGORIES
// =============================================================================

/// Discrete terrain category of a cell.
///
/// Declaration order is the elevation order (Water lowest, Rock highest) and
/// downstream passes rely on it: dock detection assumes Sand is the unique
/// band adjacent to Water, cluster finding assumes Rock is the top band.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TileType {
    #[default]
    Water,
    Sand,
    Grass,
    Ground,
    Rock,
}

impl TileType {
    pub fn display_name(&self) -> &'static str {
        match self {
            TileType::Water => "Water",
            TileType::Sand => "Sand",
            TileType::Grass => "Grass",
            TileType::Ground => "Ground",
            TileType::Rock => "Rock",
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, TileType::Water)
    }

    pub fn is_land(&self) -> bool {
        !self.is_water()
    }
}

// =============================================================================
// GENERATION PARAMETERS
// =============================================================================

/// Shape parameters for the elevation noise field.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Feature size divisor; larger values produce broader islands.
    pub scale: f32,
    /// Power-curve exponent applied to the sampled value.
    pub octaves: u32,
    /// Amplitude lift applied to the raw sample (`1 + persistence`).
    pub persistence: f32,
    /// Frequency multiplier on the sampling coordinates.
    pub lacunarity: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 20.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseParams {
    /// Reject parameter sets that would produce NaN or flat elevations.
    pub fn validate(&self) -> Result<(), WorldGenError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(WorldGenError::InvalidNoiseParams(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        if self.octaves == 0 {
            return Err(WorldGenError::InvalidNoiseParams(
                "octaves must be at least 1".into(),
            ));
        }
        if !self.persistence.is_finite() || self.persistence < 0.0 {
            return Err(WorldGenError::InvalidNoiseParams(format!(
                "persistence must be non-negative, got {}",
                self.persistence
            )));
        }
        if !self.lacunarity.is_finite() || self.lacunarity <= 0.0 {
            return Err(WorldGenError::InvalidNoiseParams(format!(
                "lacunarity must be positive, got {}",
                self.lacunarity
            )));
        }
        Ok(())
    }
}

/// Ordered terrain band cut points over the normalized noise value.
///
/// Everything below `water` is Water, below `sand` is Sand, and so on; values
/// at or above `ground` become Rock. The band order itself is fixed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TerrainThresholds {
    pub water: f32,
    pub sand: f32,
    pub grass: f32,
    pub ground: f32,
}

impl Default for TerrainThresholds {
    fn default() -> Self {
        Self {
            water: 0.15,
            sand: 0.25,
            grass: 0.40,
            ground: 0.75,
        }
    }
}

impl TerrainThresholds {
    pub fn validate(&self) -> Result<(), WorldGenError> {
        let bands = [self.water, self.sand, self.grass, self.ground];
        if bands.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(WorldGenError::InvalidThresholds(
                "thresholds must be positive and finite".into(),
            ));
        }
        if !bands.windows(2).all(|w| w[0] < w[1]) {
            return Err(WorldGenError::InvalidThresholds(format!(
                "thresholds must be strictly ascending, got {bands:?}"
            )));
        }
        Ok(())
    }

    pub fn classify(&self, normalized: f32) -> TileType {
        if normalized < self.water {
            TileType::Water
        } else if normalized < self.sand {
            TileType::Sand
        } else if normalized < self.grass {
            TileType::Grass
        } else if normalized < self.ground {
            TileType::Ground
        } else {
            TileType::Rock
        }
    }
}

// =============================================================================
// SYNTHESIS
// =============================================================================

/// Elevation and category maps produced by one synthesis pass.
#[derive(Debug)]
pub struct TerrainMaps {
    /// World-space surface height per cell, clamped to `MAX_WORLD_HEIGHT`.
    pub heightmap: GridMap<f32>,
    /// Tile category per cell.
    pub terrain: GridMap<TileType>,
}

/// Fill the height and terrain maps from seeded Perlin noise.
///
/// The sampling origin is jittered by a seed-derived offset so distinct seeds
/// land on distinct noise regions. The raw sample is lifted by
/// `1 + persistence` into the normalized value that the threshold table cuts
/// into bands; the power curve `normalized^octaves` then compresses low values
/// toward zero, which is what gives tiles their plateau-and-cliff height
/// profile.
pub fn generate_terrain(
    width: usize,
    height: usize,
    seed: u64,
    params: &NoiseParams,
    thresholds: &TerrainThresholds,
) -> Result<TerrainMaps, WorldGenError> {
    params.validate()?;
    thresholds.validate()?;
    if width == 0 || height == 0 {
        return Err(WorldGenError::EmptyGrid { width, height });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let offset_x: f64 = rng.gen_range(-100_000.0..100_000.0);
    let offset_y: f64 = rng.gen_range(-100_000.0..100_000.0);
    let perlin = Perlin::new(seed as u32);

    let mut heightmap = GridMap::new_with(width, height, 0.0f32);
    let mut terrain = GridMap::new_with(width, height, TileType::Water);

    for row in 0..height {
        for col in 0..width {
            let nx = (col as f64 + offset_x) / params.scale as f64;
            let ny = (row as f64 + offset_y) / params.scale as f64;
            let sample = perlin.get([nx * params.lacunarity as f64, ny * params.lacunarity as f64]);

            // Perlin output is [-1, 1]; remap to [0, 1] before shaping.
            let sample01 = (sample as f32 + 1.0) / 2.0;
            let normalized = sample01 * (1.0 + params.persistence);
            let shaped = normalized.powi(params.octaves as i32);

            let coord = HexCoord::new(col as i32, row as i32);
            let elevation = (HEIGHT_SCALE_FACTOR * shaped).min(MAX_WORLD_HEIGHT);
            heightmap.set(coord, elevation);
            terrain.set(coord, thresholds.classify(normalized));
        }
    }

    debug!(
        "terrain synthesis: {}x{} cells, offset ({:.1}, {:.1})",
        width, height, offset_x, offset_y
    );
    Ok(TerrainMaps { heightmap, terrain })
}
