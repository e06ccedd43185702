//! Dock detection and the restricted navigation graphs.
//!
//! Both graphs are filtered views of the one adjacency table: the sailing
//! graph keeps Water cells plus the Sand cells that border them (docks), the
//! rock graph keeps edges whose endpoints are both Rock. Neither pass touches
//! geometry again.

use log::debug;

use crate::grid::{AdjacencyTable, GridMap, HexCoord};
use crate::islands::Island;
use crate::terrain::TileType;

/// Sailing-graph edges plus the dock markers produced alongside them.
pub struct SailingGraph {
    /// Neighbour list per cell; empty for cells outside the sailing graph.
    pub edges: GridMap<Vec<HexCoord>>,
    /// True for Sand cells with at least one Water neighbour.
    pub docks: GridMap<bool>,
}

/// Build the sailing graph and register dock cells on their islands.
///
/// A Water cell connects to every adjacent Water or Sand cell. A Sand cell
/// with a Water neighbour becomes a dock: it is registered on its owning
/// island and connects to each of its Water neighbours, which makes every
/// dock edge bidirectional. Grass, Ground and Rock never receive sailing
/// edges, so a path can only touch land at a dock.
pub fn build_sailing_graph(
    terrain: &GridMap<TileType>,
    adjacency: &AdjacencyTable,
    islands: &mut [Island],
    island_map: &GridMap<Option<usize>>,
) -> SailingGraph {
    let width = terrain.width();
    let height = terrain.height();
    let mut edges: GridMap<Vec<HexCoord>> = GridMap::new(width, height);
    let mut docks = GridMap::new_with(width, height, false);
    let mut dock_count = 0usize;

    for coord in terrain.coords() {
        match terrain.get(coord) {
            TileType::Grass | TileType::Ground | TileType::Rock => continue,
            TileType::Water => {
                let neighbours = adjacency
                    .neighbours(coord)
                    .filter(|&n| matches!(terrain.get(n), TileType::Water | TileType::Sand))
                    .collect();
                edges.set(coord, neighbours);
            }
            TileType::Sand => {
                let mut neighbours = Vec::new();
                for n in adjacency.neighbours(coord) {
                    if terrain.get(n).is_water() {
                        if !*docks.get(coord) {
                            docks.set(coord, true);
                            dock_count += 1;
                            if let Some(island_idx) = island_map.get(coord) {
                                islands[*island_idx].dock_coords.push(coord);
                            }
                        }
                        neighbours.push(n);
                    }
                }
                edges.set(coord, neighbours);
            }
        }
    }

    debug!("sailing graph: {dock_count} dock cells");
    SailingGraph { edges, docks }
}

/// Build the Rock-restricted neighbour lists used by cluster finding and the
/// placement search. An edge exists only if both endpoints are Rock.
pub fn build_rock_graph(
    terrain: &GridMap<TileType>,
    adjacency: &AdjacencyTable,
) -> GridMap<Vec<HexCoord>> {
    let mut edges: GridMap<Vec<HexCoord>> = GridMap::new(terrain.width(), terrain.height());

    for coord in terrain.coords() {
        if *terrain.get(coord) != TileType::Rock {
            continue;
        }
        let neighbours = adjacency
            .neighbours(coord)
            .filter(|&n| *terrain.get(n) == TileType::Rock)
            .collect();
        edges.set(coord, neighbours);
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::islands::find_islands;

    /// A 6x6 board: left half water, a sand bar at column 3, land beyond.
    fn coastal_terrain() -> GridMap<TileType> {
        let mut terrain = GridMap::new_with(6, 6, TileType::Water);
        for coord in terrain.coords().collect::<Vec<_>>() {
            if coord.col == 3 {
                terrain.set(coord, TileType::Sand);
            } else if coord.col > 3 {
                terrain.set(coord, TileType::Grass);
            }
        }
        terrain
    }

    fn build(terrain: &GridMap<TileType>) -> (SailingGraph, Vec<Island>) {
        let adjacency = AdjacencyTable::build(terrain.width(), terrain.height()).unwrap();
        let (mut islands, island_map) = find_islands(terrain, &adjacency);
        let graph = build_sailing_graph(terrain, &adjacency, &mut islands, &island_map);
        (graph, islands)
    }

    #[test]
    fn test_dock_iff_sand_with_water_neighbour() {
        let terrain = coastal_terrain();
        let adjacency = AdjacencyTable::build(6, 6).unwrap();
        let (graph, _) = build(&terrain);

        for coord in terrain.coords() {
            let expected = *terrain.get(coord) == TileType::Sand
                && adjacency.neighbours(coord).any(|n| terrain.get(n).is_water());
            assert_eq!(*graph.docks.get(coord), expected, "dock mismatch at {coord}");
        }
    }

    #[test]
    fn test_landlocked_sand_is_not_a_dock() {
        // Sand cell enclosed by rock on all sides: no dock, no sailing edges.
        let mut terrain = GridMap::new_with(5, 5, TileType::Rock);
        terrain.set(HexCoord::new(2, 2), TileType::Sand);
        let (graph, _) = build(&terrain);

        assert!(!*graph.docks.get(HexCoord::new(2, 2)));
        assert!(graph.edges.get(HexCoord::new(2, 2)).is_empty());
    }

    #[test]
    fn test_land_never_gets_sailing_edges() {
        let terrain = coastal_terrain();
        let (graph, _) = build(&terrain);

        for (coord, tile) in terrain.iter() {
            if matches!(tile, TileType::Grass | TileType::Ground | TileType::Rock) {
                assert!(graph.edges.get(coord).is_empty());
            }
        }
    }

    #[test]
    fn test_sailing_edges_are_symmetric() {
        let terrain = coastal_terrain();
        let (graph, _) = build(&terrain);

        for coord in terrain.coords() {
            for &n in graph.edges.get(coord) {
                assert!(
                    graph.edges.get(n).contains(&coord),
                    "edge {coord} -> {n} has no reverse"
                );
            }
        }
    }

    #[test]
    fn test_docks_registered_on_owning_island() {
        let terrain = coastal_terrain();
        let (graph, islands) = build(&terrain);

        let registered: usize = islands.iter().map(|i| i.dock_coords.len()).sum();
        let marked = terrain.coords().filter(|&c| *graph.docks.get(c)).count();
        assert_eq!(registered, marked);
        assert!(marked > 0);

        for island in &islands {
            for &dock in &island.dock_coords {
                assert!(island.tile_coords.contains(&dock));
            }
        }
    }

    #[test]
    fn test_rock_graph_filters_both_endpoints() {
        let mut terrain = GridMap::new_with(5, 5, TileType::Grass);
        terrain.set(HexCoord::new(1, 2), TileType::Rock);
        terrain.set(HexCoord::new(2, 2), TileType::Rock);
        terrain.set(HexCoord::new(3, 2), TileType::Rock);
        let adjacency = AdjacencyTable::build(5, 5).unwrap();
        let rock = build_rock_graph(&terrain, &adjacency);

        assert_eq!(rock.get(HexCoord::new(2, 2)).len(), 2);
        assert!(rock.get(HexCoord::new(2, 3)).is_empty());
        for coord in terrain.coords() {
            for &n in rock.get(coord) {
                assert_eq!(*terrain.get(n), TileType::Rock);
                assert!(rock.get(n).contains(&coord));
            }
        }
    }
}
