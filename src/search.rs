//! Randomized bounded-depth placement search over Rock cells.
//!
//! Used to pick a spawn or scatter destination "a few tiles away" from a
//! reference cell without landing on an occupied tile. The walk descends
//! through unvisited Rock neighbours in randomized order, pre-marking the two
//! slot-adjacent directions of every chosen step in a forked mask — a
//! keep-away buffer that stops the walk from threading back through a
//! two-wide corridor it just squeezed past.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::grid::{AdjacencyTable, GridMap, HexCoord};
use crate::terrain::TileType;
use crate::world::Cell;

/// Walk up to `max_depth` randomized hops through Rock cells from `start`.
///
/// Returns the deepest chosen cell that is unoccupied. When every branch
/// ends occupied the last candidate visited comes back anyway: callers must
/// re-check occupancy before committing a placement. The caller's mask
/// accumulates only the start cell; each descent works on a fork.
pub fn random_cell_at_depth(
    cells: &GridMap<Cell>,
    adjacency: &AdjacencyTable,
    start: HexCoord,
    max_depth: usize,
    visited: &mut GridMap<bool>,
    rng: &mut ChaCha8Rng,
) -> HexCoord {
    descend(cells, adjacency, start, 0, max_depth, visited, rng)
}

fn descend(
    cells: &GridMap<Cell>,
    adjacency: &AdjacencyTable,
    current: HexCoord,
    depth: usize,
    max_depth: usize,
    visited: &mut GridMap<bool>,
    rng: &mut ChaCha8Rng,
) -> HexCoord {
    visited.set(current, true);
    if depth >= max_depth {
        return current;
    }

    let slots = *adjacency.slots(current);
    let mut order: Vec<usize> = (0..6).collect();
    order.shuffle(rng);

    let mut chosen = current;
    for slot in order {
        let candidate = match slots[slot] {
            Some(c) => c,
            None => continue,
        };
        if cells.get(candidate).terrain != TileType::Rock || *visited.get(candidate) {
            continue;
        }

        // Fork the mask and seal off the two directions flanking the chosen
        // slot before descending.
        let mut fork = visited.clone();
        for flank in [(slot + 1) % 6, (slot + 5) % 6] {
            if let Some(side) = slots[flank] {
                fork.set(side, true);
            }
        }

        chosen = descend(cells, adjacency, candidate, depth + 1, max_depth, &mut fork, rng);
        if !cells.get(chosen).occupied {
            break;
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::{HashMap, VecDeque};

    fn rock_world(width: usize, height: usize) -> (GridMap<Cell>, AdjacencyTable) {
        let adjacency = AdjacencyTable::build(width, height).unwrap();
        let mut cells = GridMap::new_with(width, height, Cell::default());
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let coord = HexCoord::new(col, row);
                cells.set(coord, Cell::new(coord, TileType::Rock, 0.0));
            }
        }
        (cells, adjacency)
    }

    fn hop_distance(adjacency: &AdjacencyTable, from: HexCoord, to: HexCoord) -> usize {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(from, 0usize);
        queue.push_back(from);
        while let Some(coord) = queue.pop_front() {
            if coord == to {
                return dist[&coord];
            }
            let next = dist[&coord] + 1;
            for n in adjacency.neighbours(coord) {
                if !dist.contains_key(&n) {
                    dist.insert(n, next);
                    queue.push_back(n);
                }
            }
        }
        usize::MAX
    }

    #[test]
    fn test_zero_depth_returns_start() {
        let (cells, adjacency) = rock_world(6, 6);
        let mut visited = GridMap::new_with(6, 6, false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let start = HexCoord::new(3, 3);
        let result = random_cell_at_depth(&cells, &adjacency, start, 0, &mut visited, &mut rng);
        assert_eq!(result, start);
        assert!(*visited.get(start));
    }

    #[test]
    fn test_result_within_depth_bound() {
        let (cells, adjacency) = rock_world(9, 9);
        let start = HexCoord::new(4, 4);
        for max_depth in 1..=3 {
            for seed in 0..20 {
                let mut visited = GridMap::new_with(9, 9, false);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let result = random_cell_at_depth(
                    &cells,
                    &adjacency,
                    start,
                    max_depth,
                    &mut visited,
                    &mut rng,
                );
                assert!(hop_distance(&adjacency, start, result) <= max_depth);
                assert_eq!(cells.get(result).terrain, TileType::Rock);
            }
        }
    }

    #[test]
    fn test_no_rock_neighbours_returns_start() {
        let (mut cells, adjacency) = rock_world(5, 5);
        let start = HexCoord::new(2, 2);
        for n in adjacency.neighbours(start).collect::<Vec<_>>() {
            cells.get_mut(n).terrain = TileType::Water;
        }
        let mut visited = GridMap::new_with(5, 5, false);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let result = random_cell_at_depth(&cells, &adjacency, start, 3, &mut visited, &mut rng);
        assert_eq!(result, start);
    }

    #[test]
    fn test_fully_occupied_still_returns_candidate() {
        // Everything but the start is occupied: the walk must come back with
        // some cell rather than fail, and the caller re-checks occupancy.
        let (mut cells, adjacency) = rock_world(5, 5);
        let start = HexCoord::new(2, 2);
        for row in 0..5 {
            for col in 0..5 {
                let c = HexCoord::new(col, row);
                if c != start {
                    cells.get_mut(c).occupied = true;
                }
            }
        }
        let mut visited = GridMap::new_with(5, 5, false);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let result = random_cell_at_depth(&cells, &adjacency, start, 2, &mut visited, &mut rng);
        assert!(result == start || cells.get(result).occupied);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let (cells, adjacency) = rock_world(8, 8);
        let start = HexCoord::new(3, 3);

        let mut visited_a = GridMap::new_with(8, 8, false);
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let a = random_cell_at_depth(&cells, &adjacency, start, 3, &mut visited_a, &mut rng_a);

        let mut visited_b = GridMap::new_with(8, 8, false);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let b = random_cell_at_depth(&cells, &adjacency, start, 3, &mut visited_b, &mut rng_b);

        assert_eq!(a, b);
    }
}
