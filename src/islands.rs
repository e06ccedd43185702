//! Island and rock-cluster segmentation.
//!
//! Islands are maximal connected components of non-Water cells over the full
//! adjacency table, found by multi-source flood fill. Rock clusters are
//! connected components of Rock cells over the rock-filtered graph. Both
//! lists are re-sorted ascending by size once discovery finishes, so spawn
//! logic can index "largest" from the tail end.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::grid::{AdjacencyTable, GridMap, HexCoord};
use crate::terrain::TileType;

/// Reachable degree-6 cell count of a perfect depth-4 hex neighbourhood.
/// A cluster member that saturates this is as interior as a cell can be.
const FULL_NEIGHBOURHOOD: usize = 37;

/// Hop bound for the centre-selection walk.
const CENTER_SEARCH_DEPTH: usize = 4;

/// One maximal connected component of non-Water cells.
///
/// Immutable once generation completes; the dock list, cluster ids and
/// highest cell are filled in by later pipeline passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Island {
    /// Member coordinates in flood-fill discovery order.
    pub tile_coords: Vec<HexCoord>,
    /// Sand cells of this island bordering Water.
    pub dock_coords: Vec<HexCoord>,
    /// Indices into the world's cluster list.
    pub cluster_ids: Vec<usize>,
    /// Highest blended tile of the island.
    pub highest: Option<HexCoord>,
}

impl Island {
    pub fn len(&self) -> usize {
        self.tile_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_coords.is_empty()
    }
}

/// One maximal connected component of Rock cells inside a single island.
#[derive(Clone, Debug, PartialEq)]
pub struct RockCluster {
    /// Index of the owning island.
    pub island: usize,
    /// Member coordinates in BFS discovery order.
    pub tiles: Vec<HexCoord>,
    /// Most-interior member by the density heuristic; `None` when the
    /// cluster has no cell with a full rock neighbourhood.
    pub center: Option<HexCoord>,
}

impl RockCluster {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

// =============================================================================
// ISLAND FLOOD FILL
// =============================================================================

/// Find every island and label each cell with its owning island index.
///
/// Components come out of the scan in discovery order and are then re-sorted
/// ascending by cell count (stable), so the largest island is always last.
/// The returned label map reflects the post-sort indices.
pub fn find_islands(
    terrain: &GridMap<TileType>,
    adjacency: &AdjacencyTable,
) -> (Vec<Island>, GridMap<Option<usize>>) {
    let width = terrain.width();
    let height = terrain.height();
    let mut visited = GridMap::new_with(width, height, false);
    let mut islands: Vec<Island> = Vec::new();

    for coord in terrain.coords() {
        if terrain.get(coord).is_land() && !*visited.get(coord) {
            let mut island = Island::default();
            flood_fill(coord, terrain, adjacency, &mut island, &mut visited);
            islands.push(island);
        }
    }

    islands.sort_by_key(|island| island.len());

    let mut island_map = GridMap::new_with(width, height, None);
    for (idx, island) in islands.iter().enumerate() {
        for &coord in &island.tile_coords {
            island_map.set(coord, Some(idx));
        }
    }

    debug!("island fill: {} islands", islands.len());
    (islands, island_map)
}

fn flood_fill(
    start: HexCoord,
    terrain: &GridMap<TileType>,
    adjacency: &AdjacencyTable,
    island: &mut Island,
    visited: &mut GridMap<bool>,
) {
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        if *visited.get(coord) {
            continue;
        }
        visited.set(coord, true);
        island.tile_coords.push(coord);

        for neighbour in adjacency.neighbours(coord) {
            if !*visited.get(neighbour) && terrain.get(neighbour).is_land() {
                queue.push_back(neighbour);
            }
        }
    }
}

// =============================================================================
// ROCK CLUSTERS
// =============================================================================

/// Group the Rock cells of every island into connected clusters.
///
/// Connectivity is taken from the rock-filtered graph (an edge exists only if
/// both endpoints are Rock). Clusters are collected globally, sorted
/// ascending by size, cross-linked back onto their islands, and each gets a
/// centre picked by [`select_center`].
pub fn find_rock_clusters(
    islands: &mut [Island],
    terrain: &GridMap<TileType>,
    rock_graph: &GridMap<Vec<HexCoord>>,
) -> Vec<RockCluster> {
    let mut visited = GridMap::new_with(terrain.width(), terrain.height(), false);
    let mut clusters: Vec<RockCluster> = Vec::new();

    for (island_idx, island) in islands.iter().enumerate() {
        for &coord in &island.tile_coords {
            if *terrain.get(coord) != TileType::Rock || *visited.get(coord) {
                continue;
            }

            let mut cluster = RockCluster {
                island: island_idx,
                tiles: Vec::new(),
                center: None,
            };

            let mut queue = VecDeque::new();
            queue.push_back(coord);
            visited.set(coord, true);
            while let Some(rock) = queue.pop_front() {
                cluster.tiles.push(rock);
                for &neighbour in rock_graph.get(rock) {
                    if !*visited.get(neighbour) {
                        visited.set(neighbour, true);
                        queue.push_back(neighbour);
                    }
                }
            }

            clusters.push(cluster);
        }
    }

    clusters.sort_by_key(|cluster| cluster.len());

    for island in islands.iter_mut() {
        island.cluster_ids.clear();
    }
    for (idx, cluster) in clusters.iter_mut().enumerate() {
        cluster.center = select_center(&cluster.tiles, rock_graph);
        islands[cluster.island].cluster_ids.push(idx);
    }

    debug!("rock clusters: {} found", clusters.len());
    clusters
}

/// Pick the most-interior member of a cluster.
///
/// Candidates are members whose six neighbours are all Rock. From each, a
/// depth-bounded walk counts reachable cells that are themselves fully
/// surrounded; a candidate saturating a perfect depth-4 neighbourhood wins
/// outright, otherwise the best count wins. This is a density heuristic, not
/// a geometric centroid: it deliberately favours "deep inside the cluster"
/// over "average position".
fn select_center(tiles: &[HexCoord], rock_graph: &GridMap<Vec<HexCoord>>) -> Option<HexCoord> {
    let mut best: Option<(HexCoord, usize)> = None;

    for &tile in tiles {
        if rock_graph.get(tile).len() != 6 {
            continue;
        }
        let mut reached = HashSet::new();
        interior_walk(tile, rock_graph, &mut reached, 0);
        if reached.len() == FULL_NEIGHBOURHOOD {
            return Some(tile);
        }
        if best.map_or(true, |(_, count)| reached.len() > count) {
            best = Some((tile, reached.len()));
        }
    }

    best.map(|(tile, _)| tile)
}

fn interior_walk(
    node: HexCoord,
    rock_graph: &GridMap<Vec<HexCoord>>,
    reached: &mut HashSet<HexCoord>,
    depth: usize,
) {
    reached.insert(node);
    if depth >= CENTER_SEARCH_DEPTH {
        return;
    }
    for &neighbour in rock_graph.get(node) {
        if !reached.contains(&neighbour) && rock_graph.get(neighbour).len() == 6 {
            interior_walk(neighbour, rock_graph, reached, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::build_rock_graph;

    /// Terrain where columns 0..3 are one land strip, column 5.. another,
    /// separated by a full-height water column.
    fn split_terrain(width: usize, height: usize) -> GridMap<TileType> {
        let mut terrain = GridMap::new_with(width, height, TileType::Water);
        for coord in terrain.coords().collect::<Vec<_>>() {
            if coord.col < 3 {
                terrain.set(coord, TileType::Grass);
            } else if coord.col >= 5 {
                terrain.set(coord, TileType::Ground);
            }
        }
        terrain
    }

    #[test]
    fn test_islands_partition_land() {
        let terrain = split_terrain(8, 6);
        let adjacency = AdjacencyTable::build(8, 6).unwrap();
        let (islands, island_map) = find_islands(&terrain, &adjacency);

        assert_eq!(islands.len(), 2);

        // Every land cell is owned by exactly one island; water by none.
        let mut owned = HashSet::new();
        for (idx, island) in islands.iter().enumerate() {
            for &coord in &island.tile_coords {
                assert!(terrain.get(coord).is_land());
                assert!(owned.insert(coord), "{coord} appears in two islands");
                assert_eq!(*island_map.get(coord), Some(idx));
            }
        }
        for (coord, tile) in terrain.iter() {
            if tile.is_land() {
                assert!(owned.contains(&coord), "{coord} missing from all islands");
            } else {
                assert_eq!(*island_map.get(coord), None);
            }
        }
    }

    #[test]
    fn test_islands_sorted_ascending() {
        let terrain = split_terrain(9, 6);
        let adjacency = AdjacencyTable::build(9, 6).unwrap();
        let (islands, _) = find_islands(&terrain, &adjacency);
        assert!(islands.windows(2).all(|w| w[0].len() <= w[1].len()));
    }

    #[test]
    fn test_rock_clusters_partition_rock() {
        let mut terrain = split_terrain(8, 6);
        // Two separated rock patches on the right-hand island.
        terrain.set(HexCoord::new(5, 0), TileType::Rock);
        terrain.set(HexCoord::new(5, 1), TileType::Rock);
        terrain.set(HexCoord::new(7, 4), TileType::Rock);

        let adjacency = AdjacencyTable::build(8, 6).unwrap();
        let (mut islands, _) = find_islands(&terrain, &adjacency);
        let rock_graph = build_rock_graph(&terrain, &adjacency);
        let clusters = find_rock_clusters(&mut islands, &terrain, &rock_graph);

        assert_eq!(clusters.len(), 2);
        assert!(clusters.windows(2).all(|w| w[0].len() <= w[1].len()));

        let mut seen = HashSet::new();
        for cluster in &clusters {
            for &coord in &cluster.tiles {
                assert_eq!(*terrain.get(coord), TileType::Rock);
                assert!(seen.insert(coord), "{coord} appears in two clusters");
            }
        }
        for (coord, tile) in terrain.iter() {
            if *tile == TileType::Rock {
                assert!(seen.contains(&coord));
            }
        }

        // Cluster ids on the owning island point back at the right clusters.
        for (idx, cluster) in clusters.iter().enumerate() {
            assert!(islands[cluster.island].cluster_ids.contains(&idx));
        }
    }

    #[test]
    fn test_center_is_the_only_interior_cell() {
        // A seven-cell rock flower on a grass board: only the middle cell
        // has six Rock neighbours, so it must be chosen as the centre.
        let mut terrain = GridMap::new_with(9, 9, TileType::Grass);
        let adjacency = AdjacencyTable::build(9, 9).unwrap();
        let middle = HexCoord::new(4, 4);
        terrain.set(middle, TileType::Rock);
        for petal in adjacency.neighbours(middle).collect::<Vec<_>>() {
            terrain.set(petal, TileType::Rock);
        }

        let (mut islands, _) = find_islands(&terrain, &adjacency);
        let rock_graph = build_rock_graph(&terrain, &adjacency);
        let clusters = find_rock_clusters(&mut islands, &terrain, &rock_graph);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 7);
        assert_eq!(clusters[0].center, Some(middle));
    }

    #[test]
    fn test_tiny_cluster_has_no_center() {
        let mut terrain = GridMap::new_with(6, 6, TileType::Grass);
        terrain.set(HexCoord::new(2, 2), TileType::Rock);
        terrain.set(HexCoord::new(3, 2), TileType::Rock);

        let adjacency = AdjacencyTable::build(6, 6).unwrap();
        let (mut islands, _) = find_islands(&terrain, &adjacency);
        let rock_graph = build_rock_graph(&terrain, &adjacency);
        let clusters = find_rock_clusters(&mut islands, &terrain, &rock_graph);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].center, None);
    }
}
