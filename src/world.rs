//! World graph container and the generation pipeline.
//!
//! `generate_world` runs the whole synchronous pipeline — noise, adjacency,
//! islands, mesh blending, navigation graphs, clusters — and bundles the
//! results into one `WorldGraph` value that is passed to every consumer.
//! There is no global lookup: whoever needs the world holds a reference.
//! After generation the graph is immutable except for cell occupancy flags,
//! which follow a single-writer-per-cell contract enforced by `&mut` access.

use glam::Vec3;
use log::info;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::WorldGenError;
use crate::grid::{hex_world_position, AdjacencyTable, GridMap, HexCoord};
use crate::islands::{find_islands, find_rock_clusters, Island, RockCluster};
use crate::mesh::{blend_all_tiles, HexMeshPrototype, MeshParams, TileMesh};
use crate::navigation::{build_rock_graph, build_sailing_graph};
use crate::pathfinding::{self, SailPath};
use crate::search;
use crate::seeds::WorldSeeds;
use crate::terrain::{generate_terrain, NoiseParams, TerrainThresholds, TileType};

/// One hex cell of the generated world.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub coord: HexCoord,
    pub terrain: TileType,
    /// Raw height-map elevation, before blending.
    pub elevation: f32,
    /// World anchor; `y` is the blended centre height of the tile surface.
    pub world_point: Vec3,
    /// Exclusive occupancy marker for moving entities.
    pub occupied: bool,
    /// Index of the owning island, `None` for Water.
    pub island: Option<usize>,
    /// True for Sand cells bordering Water.
    pub dock: bool,
    /// Cost of stepping onto this cell in a sailing search.
    pub nav_weight: f32,
}

impl Cell {
    pub fn new(coord: HexCoord, terrain: TileType, elevation: f32) -> Self {
        Self {
            coord,
            terrain,
            elevation,
            world_point: Vec3::ZERO,
            occupied: false,
            island: None,
            dock: false,
            nav_weight: 1.0,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(HexCoord::new(0, 0), TileType::Water, 0.0)
    }
}

/// All generated world data bundled together.
pub struct WorldGraph {
    pub seeds: WorldSeeds,
    pub width: usize,
    pub height: usize,
    pub noise_params: NoiseParams,
    pub thresholds: TerrainThresholds,
    pub mesh_params: MeshParams,
    /// The one world-wide cell table.
    pub cells: GridMap<Cell>,
    /// Raw elevation map (pre-blending), kept for export and inspection.
    pub heightmap: GridMap<f32>,
    /// Full geometric adjacency, built once.
    pub adjacency: AdjacencyTable,
    /// Islands ascending by size; the largest is last.
    pub islands: Vec<Island>,
    /// Rock clusters ascending by size; the spawn pool is the tail.
    pub clusters: Vec<RockCluster>,
    /// Sailing-graph neighbour lists ({Water, dock Sand} nodes only).
    pub sailing: GridMap<Vec<HexCoord>>,
    /// Rock-restricted neighbour lists.
    pub rock_graph: GridMap<Vec<HexCoord>>,
    /// Blended tile meshes, one per cell, identical topology.
    pub meshes: GridMap<TileMesh>,
    /// Every Water cell, row-major.
    pub sea_tiles: Vec<HexCoord>,
    /// World-space distance between adjacent cell anchors.
    step_length: f32,
}

/// Generate a world with default thresholds and mesh parameters.
pub fn generate_world(
    width: usize,
    height: usize,
    seed: u64,
    noise_params: &NoiseParams,
) -> Result<WorldGraph, WorldGenError> {
    generate_world_configured(
        width,
        height,
        seed,
        noise_params,
        &TerrainThresholds::default(),
        MeshParams::default(),
    )
}

/// Generate a world with every policy surface explicit.
///
/// The pipeline is strictly sequential; each stage reads completed tables
/// from the previous ones. A failed stage aborts the whole run.
pub fn generate_world_configured(
    width: usize,
    height: usize,
    seed: u64,
    noise_params: &NoiseParams,
    thresholds: &TerrainThresholds,
    mesh_params: MeshParams,
) -> Result<WorldGraph, WorldGenError> {
    let seeds = WorldSeeds::from_master(seed);
    info!("generating {width}x{height} world, seed {seed}");

    let maps = generate_terrain(width, height, seeds.noise, noise_params, thresholds)?;
    let adjacency = AdjacencyTable::build(width, height)?;

    let (mut islands, island_map) = find_islands(&maps.terrain, &adjacency);

    let proto = HexMeshPrototype::build(mesh_params)?;
    let (meshes, center_heights) = blend_all_tiles(&proto, &maps.heightmap, &adjacency);

    let sailing_graph = build_sailing_graph(&maps.terrain, &adjacency, &mut islands, &island_map);
    let rock_graph = build_rock_graph(&maps.terrain, &adjacency);
    let clusters = find_rock_clusters(&mut islands, &maps.terrain, &rock_graph);

    for island in &mut islands {
        island.highest = highest_tile(&island.tile_coords, &center_heights);
    }

    let mut cells = GridMap::new_with(width, height, Cell::default());
    let mut sea_tiles = Vec::new();
    for coord in maps.terrain.coords().collect::<Vec<_>>() {
        let terrain = *maps.terrain.get(coord);
        let mut cell = Cell::new(coord, terrain, *maps.heightmap.get(coord));
        let mut anchor = hex_world_position(coord, mesh_params.outer_size);
        anchor.y = *center_heights.get(coord);
        cell.world_point = anchor;
        cell.island = *island_map.get(coord);
        cell.dock = *sailing_graph.docks.get(coord);
        if terrain.is_water() {
            sea_tiles.push(coord);
        }
        cells.set(coord, cell);
    }

    info!(
        "world ready: {} islands, {} rock clusters, {} sea tiles",
        islands.len(),
        clusters.len(),
        sea_tiles.len()
    );

    Ok(WorldGraph {
        seeds,
        width,
        height,
        noise_params: *noise_params,
        thresholds: *thresholds,
        mesh_params,
        cells,
        heightmap: maps.heightmap,
        adjacency,
        islands,
        clusters,
        sailing: sailing_graph.edges,
        rock_graph,
        meshes,
        sea_tiles,
        step_length: 3.0_f32.sqrt() * mesh_params.outer_size,
    })
}

/// First occurrence of the maximum blended centre height wins.
fn highest_tile(tiles: &[HexCoord], center_heights: &GridMap<f32>) -> Option<HexCoord> {
    let mut best: Option<(HexCoord, f32)> = None;
    for &coord in tiles {
        let height = *center_heights.get(coord);
        match best {
            Some((_, top)) if height <= top => {}
            _ => best = Some((coord, height)),
        }
    }
    best.map(|(coord, _)| coord)
}

impl WorldGraph {
    /// Checked cell lookup for externally supplied coordinates.
    pub fn try_cell(&self, coord: HexCoord) -> Result<&Cell, WorldGenError> {
        self.cells.try_get(coord)
    }

    /// Shortest sailing route, or `None` when the goal is unreachable.
    pub fn find_path(
        &self,
        start: HexCoord,
        goal: HexCoord,
    ) -> Result<Option<SailPath>, WorldGenError> {
        pathfinding::find_path(&self.cells, &self.sailing, self.step_length, start, goal)
    }

    /// Uniform-random Water cell, if the world has any.
    pub fn random_water_cell(&self, rng: &mut ChaCha8Rng) -> Option<HexCoord> {
        self.sea_tiles.choose(rng).copied()
    }

    /// Uniform-random unoccupied cell of a rock cluster.
    pub fn random_patrol_cell(&self, cluster: usize, rng: &mut ChaCha8Rng) -> Option<HexCoord> {
        let cluster = self.clusters.get(cluster)?;
        let free: Vec<HexCoord> = cluster
            .tiles
            .iter()
            .copied()
            .filter(|&coord| !self.cells.get(coord).occupied)
            .collect();
        free.choose(rng).copied()
    }

    /// Randomized bounded-depth Rock walk; see [`search::random_cell_at_depth`].
    pub fn random_cell_at_depth(
        &self,
        start: HexCoord,
        max_depth: usize,
        visited: &mut GridMap<bool>,
        rng: &mut ChaCha8Rng,
    ) -> HexCoord {
        search::random_cell_at_depth(&self.cells, &self.adjacency, start, max_depth, visited, rng)
    }

    /// Fresh all-clear visited mask sized for this world.
    pub fn visited_mask(&self) -> GridMap<bool> {
        GridMap::new_with(self.width, self.height, false)
    }

    /// First unoccupied land neighbour of `coord`, in direction order.
    pub fn free_land_neighbour(&self, coord: HexCoord) -> Option<HexCoord> {
        self.adjacency
            .neighbours(coord)
            .find(|&n| !self.cells.get(n).occupied && self.cells.get(n).terrain.is_land())
    }

    /// The biggest island (lists are ascending by size).
    pub fn largest_island(&self) -> Option<&Island> {
        self.islands.last()
    }

    /// Indices of the `n` biggest rock clusters, biggest first.
    pub fn largest_clusters(&self, n: usize) -> Vec<usize> {
        (0..self.clusters.len()).rev().take(n).collect()
    }

    pub fn is_occupied(&self, coord: HexCoord) -> Result<bool, WorldGenError> {
        Ok(self.cells.try_get(coord)?.occupied)
    }

    pub fn set_occupied(&mut self, coord: HexCoord, occupied: bool) -> Result<(), WorldGenError> {
        self.cells.try_get(coord)?;
        self.cells.get_mut(coord).occupied = occupied;
        Ok(())
    }

    /// Move an entity's occupancy from `from` to `to` in one logical step.
    /// `from == to` is a no-op; there is never a state where both or neither
    /// cell is marked.
    pub fn transfer_occupancy(&mut self, from: HexCoord, to: HexCoord) -> Result<(), WorldGenError> {
        self.cells.try_get(from)?;
        self.cells.try_get(to)?;
        if from == to {
            return Ok(());
        }
        self.cells.get_mut(to).occupied = true;
        self.cells.get_mut(from).occupied = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn small_world(seed: u64) -> WorldGraph {
        generate_world(10, 10, seed, &NoiseParams::default()).unwrap()
    }

    #[test]
    fn test_regeneration_is_identical() {
        // Fixed 10x10 grid, default scale 20 / octaves 6: the same seed must
        // reproduce the same terrain, adjacency and segmentation.
        let a = small_world(20260805);
        let b = small_world(20260805);

        assert_eq!(a.heightmap, b.heightmap);
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.adjacency, b.adjacency);
        assert_eq!(a.islands, b.islands);
        assert_eq!(a.clusters, b.clusters);
        assert_eq!(a.sailing, b.sailing);
        assert_eq!(a.sea_tiles, b.sea_tiles);
    }

    #[test]
    fn test_every_cell_labelled_consistently() {
        let world = small_world(7);
        for (coord, cell) in world.cells.iter() {
            assert_eq!(cell.coord, coord);
            match cell.island {
                Some(idx) => {
                    assert!(cell.terrain.is_land());
                    assert!(world.islands[idx].tile_coords.contains(&coord));
                }
                None => assert!(cell.terrain.is_water()),
            }
            if cell.dock {
                assert_eq!(cell.terrain, TileType::Sand);
            }
        }
    }

    #[test]
    fn test_anchor_height_is_blended_center() {
        let world = small_world(3);
        for (coord, cell) in world.cells.iter() {
            assert_eq!(cell.world_point.y, world.meshes.get(coord).center_height);
        }
    }

    #[test]
    fn test_occupancy_transfer_is_atomic() {
        let mut world = small_world(5);
        let a = HexCoord::new(1, 1);
        let b = HexCoord::new(2, 1);

        world.set_occupied(a, true).unwrap();
        world.transfer_occupancy(a, b).unwrap();
        assert!(!world.is_occupied(a).unwrap());
        assert!(world.is_occupied(b).unwrap());

        // Self-transfer keeps the mark in place.
        world.transfer_occupancy(b, b).unwrap();
        assert!(world.is_occupied(b).unwrap());
    }

    #[test]
    fn test_out_of_bounds_queries_fail() {
        let world = small_world(5);
        let outside = HexCoord::new(10, 0);
        assert!(matches!(
            world.try_cell(outside),
            Err(WorldGenError::OutOfBounds { .. })
        ));
        assert!(world.find_path(HexCoord::new(0, 0), outside).is_err());
    }

    #[test]
    fn test_random_water_cell_is_water() {
        let world = small_world(11);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        if let Some(coord) = world.random_water_cell(&mut rng) {
            assert!(world.cells.get(coord).terrain.is_water());
        } else {
            assert!(world.sea_tiles.is_empty());
        }
    }

    #[test]
    fn test_random_patrol_cell_is_free_cluster_member() {
        let world = small_world(13);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for idx in 0..world.clusters.len() {
            if let Some(coord) = world.random_patrol_cell(idx, &mut rng) {
                assert!(world.clusters[idx].tiles.contains(&coord));
                assert!(!world.cells.get(coord).occupied);
            }
        }
    }

    #[test]
    fn test_largest_accessors_respect_ordering() {
        let world = small_world(17);
        if let Some(largest) = world.largest_island() {
            for island in &world.islands {
                assert!(island.len() <= largest.len());
            }
        }
        let pool = world.largest_clusters(2);
        if pool.len() == 2 {
            assert!(world.clusters[pool[0]].len() >= world.clusters[pool[1]].len());
        }
    }

    #[test]
    fn test_island_highest_is_maximal() {
        let world = small_world(23);
        for island in &world.islands {
            let highest = island.highest.expect("non-empty island has a highest tile");
            let top = world.cells.get(highest).world_point.y;
            for &coord in &island.tile_coords {
                assert!(world.cells.get(coord).world_point.y <= top);
            }
        }
    }
}
