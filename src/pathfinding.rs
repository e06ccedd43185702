//! A* search over the sailing graph.
//!
//! The search is a pure function: open/closed maps and the heap live in the
//! invocation, so concurrent searches over the same world are safe as long
//! as nobody is mutating occupancy underneath them.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::WorldGenError;
use crate::grid::{GridMap, HexCoord};
use crate::terrain::TileType;
use crate::world::Cell;

/// An ordered cell sequence from start to goal inclusive, with its
/// accumulated real cost and the final heap estimate. Owned by the caller;
/// a later world change does not update it.
#[derive(Clone, Debug, PartialEq)]
pub struct SailPath {
    pub cells: Vec<HexCoord>,
    /// Real cost: sum of per-step weights along the path.
    pub g: f32,
    /// Estimated total cost at the moment the goal was popped (`g + h`,
    /// where `h` is zero at the goal).
    pub f: f32,
}

impl SailPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first(&self) -> Option<HexCoord> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<HexCoord> {
        self.cells.last().copied()
    }
}

/// Heap entry keyed by estimated total cost. `BinaryHeap` is a max-heap, so
/// the ordering is inverted to pop the cheapest estimate first. Ties in `f`
/// fall back to heap order: deliberately unstable, not a guarantee.
struct FringeNode {
    f: f32,
    g: f32,
    coord: HexCoord,
}

impl PartialEq for FringeNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for FringeNode {}

impl PartialOrd for FringeNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FringeNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f)
    }
}

/// Euclidean distance in the ground plane between two cell anchors,
/// expressed in hop units (divided by the anchor spacing) so it never
/// overestimates a unit-weight hop count.
fn heuristic(cells: &GridMap<Cell>, from: HexCoord, to: HexCoord, step_length: f32) -> f32 {
    let a = cells.get(from).world_point;
    let b = cells.get(to).world_point;
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt() / step_length
}

/// Shortest sailing path from `start` to `goal`.
///
/// `step_length` is the world-space distance between adjacent cell anchors;
/// it converts the Euclidean heuristic into the same unit as the per-step
/// weights. Both endpoints must lie inside the grid; an unreachable goal is
/// not an error but an ordinary `None` ("stay idle"). Sand cells are
/// impassable as intermediate hops: a boat may only dock at Sand when it is
/// the goal itself. Step costs come from the destination cell's
/// `nav_weight` (uniform 1 by default).
pub fn find_path(
    cells: &GridMap<Cell>,
    sailing: &GridMap<Vec<HexCoord>>,
    step_length: f32,
    start: HexCoord,
    goal: HexCoord,
) -> Result<Option<SailPath>, WorldGenError> {
    cells.try_get(start)?;
    cells.try_get(goal)?;
    debug_assert!(step_length > 0.0, "anchor spacing must be positive");

    let mut fringe = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut open: HashMap<HexCoord, f32> = HashMap::new();
    let mut closed: HashMap<HexCoord, f32> = HashMap::new();

    fringe.push(FringeNode {
        f: heuristic(cells, start, goal, step_length),
        g: 0.0,
        coord: start,
    });
    open.insert(start, 0.0);

    while let Some(FringeNode { g, coord, .. }) = fringe.pop() {
        if coord == goal {
            return Ok(Some(reconstruct(&came_from, start, goal, g)));
        }

        if closed.contains_key(&coord) {
            continue;
        }
        closed.insert(coord, g);

        for &neighbour in sailing.get(coord) {
            // Docking is terminal: Sand never serves as a waypoint.
            if cells.get(neighbour).terrain == TileType::Sand && neighbour != goal {
                continue;
            }

            let tentative_g = g + cells.get(neighbour).nav_weight;

            if let Some(&closed_cost) = closed.get(&neighbour) {
                if tentative_g >= closed_cost {
                    continue;
                }
            }

            let improves = open
                .get(&neighbour)
                .map_or(true, |&known| tentative_g < known);
            if improves {
                open.insert(neighbour, tentative_g);
                came_from.insert(neighbour, coord);
                fringe.push(FringeNode {
                    f: tentative_g + heuristic(cells, neighbour, goal, step_length),
                    g: tentative_g,
                    coord: neighbour,
                });
            }
        }
    }

    Ok(None)
}

fn reconstruct(
    came_from: &HashMap<HexCoord, HexCoord>,
    start: HexCoord,
    goal: HexCoord,
    g: f32,
) -> SailPath {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        cells.push(current);
    }
    cells.reverse();
    SailPath { cells, g, f: g }
}
