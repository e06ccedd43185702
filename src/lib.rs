//! Hex island world generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod agent;
pub mod error;
pub mod export;
pub mod grid;
pub mod islands;
pub mod mesh;
pub mod navigation;
pub mod pathfinding;
pub mod search;
pub mod seeds;
pub mod terrain;
pub mod world;

pub use error::WorldGenError;
pub use grid::{GridMap, HexCoord};
pub use pathfinding::SailPath;
pub use terrain::{NoiseParams, TerrainThresholds, TileType};
pub use world::{generate_world, generate_world_configured, Cell, WorldGraph};
