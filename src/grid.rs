//! Hex grid substrate: coordinates, parity neighbour tables, flat arenas.
//!
//! Tiles live in offset coordinates (column, row) on a pointy-top hex grid
//! where even rows are shifted half a tile to the right. Every later pass
//! (island fill, sailing graph, mesh blending) works against the adjacency
//! table built here; none of them recompute geometry.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;

/// Distance from a hex centre to any of its six corners, in world units.
pub const HEX_OUTER_SIZE: f32 = 120.0;

/// Neighbour offsets for cells on even rows, ordered by direction angle:
/// east, north-east, north-west, west, south-west, south-east.
pub const EVEN_ROW_NEIGHBOURS: [(i32, i32); 6] =
    [(1, 0), (1, 1), (0, 1), (-1, 0), (0, -1), (1, -1)];

/// Neighbour offsets for cells on odd rows, same direction order.
pub const ODD_ROW_NEIGHBOURS: [(i32, i32); 6] =
    [(1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1)];

/// Offset-coordinate key of one hex cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The six direction offsets that apply to this cell's row parity.
    pub fn direction_offsets(&self) -> &'static [(i32, i32); 6] {
        if self.row % 2 == 0 {
            &EVEN_ROW_NEIGHBOURS
        } else {
            &ODD_ROW_NEIGHBOURS
        }
    }

    /// Neighbouring coordinate in direction `slot` (0..6), ignoring bounds.
    pub fn neighbour(&self, slot: usize) -> HexCoord {
        let (dc, dr) = self.direction_offsets()[slot];
        HexCoord::new(self.col + dc, self.row + dr)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// World-space anchor of a hex cell at ground level (y = 0).
///
/// Pointy-top layout: tiles are `sqrt(3) * size` wide, rows advance by
/// `1.5 * size`, and even rows are shifted right by half a tile width.
pub fn hex_world_position(coord: HexCoord, size: f32) -> Vec3 {
    let width = 3.0_f32.sqrt() * size;
    let vertical = 2.0 * size * (3.0 / 4.0);
    let offset = if coord.row % 2 == 0 { width / 2.0 } else { 0.0 };
    Vec3::new(
        coord.col as f32 * width + offset,
        0.0,
        coord.row as f32 * vertical,
    )
}

/// A flat arena addressed by `HexCoord`, one slot per grid cell.
///
/// This is the only cell storage in the crate: all neighbour relations are
/// coordinate keys into arenas like this one, never owning links.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> GridMap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> GridMap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> GridMap<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.col >= 0
            && (coord.col as usize) < self.width
            && coord.row >= 0
            && (coord.row as usize) < self.height
    }

    fn index(&self, coord: HexCoord) -> usize {
        debug_assert!(self.contains(coord), "coordinate {coord} out of bounds");
        coord.row as usize * self.width + coord.col as usize
    }

    /// Direct access for coordinates already known to be in bounds (anything
    /// taken from an adjacency list or a prior pass). Feeding an out-of-range
    /// coordinate here is a programming error, not a runtime condition.
    pub fn get(&self, coord: HexCoord) -> &T {
        &self.data[self.index(coord)]
    }

    pub fn get_mut(&mut self, coord: HexCoord) -> &mut T {
        let idx = self.index(coord);
        &mut self.data[idx]
    }

    pub fn set(&mut self, coord: HexCoord, value: T) {
        let idx = self.index(coord);
        self.data[idx] = value;
    }

    /// Checked lookup for externally supplied coordinates.
    pub fn try_get(&self, coord: HexCoord) -> Result<&T, WorldGenError> {
        if self.contains(coord) {
            Ok(&self.data[coord.row as usize * self.width + coord.col as usize])
        } else {
            Err(WorldGenError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Iterate over all cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (HexCoord, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let coord = HexCoord::new((idx % self.width) as i32, (idx / self.width) as i32);
            (coord, val)
        })
    }

    /// All coordinates of the grid, row-major.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| HexCoord::new(col as i32, row as i32))
        })
    }
}

/// Per-cell neighbour table, computed exactly once per generation pass.
///
/// Each cell keeps its six direction slots (`None` where the grid ends) so
/// that geometry-sensitive passes (mesh blending, the keep-away buffer of the
/// placement search) can ask "who is in direction `i`", while graph passes
/// iterate the compact in-bounds list.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyTable {
    slots: GridMap<[Option<HexCoord>; 6]>,
}

impl AdjacencyTable {
    pub fn build(width: usize, height: usize) -> Result<Self, WorldGenError> {
        if width == 0 || height == 0 {
            return Err(WorldGenError::EmptyGrid { width, height });
        }

        let mut slots = GridMap::new_with(width, height, [None; 6]);
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let coord = HexCoord::new(col, row);
                let mut entry = [None; 6];
                for (slot, candidate) in (0..6).map(|s| (s, coord.neighbour(s))) {
                    if slots.contains(candidate) {
                        entry[slot] = Some(candidate);
                    }
                }
                slots.set(coord, entry);
            }
        }
        Ok(Self { slots })
    }

    pub fn width(&self) -> usize {
        self.slots.width()
    }

    pub fn height(&self) -> usize {
        self.slots.height()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.slots.contains(coord)
    }

    /// The six direction slots of `coord`; `None` marks the grid border.
    pub fn slots(&self, coord: HexCoord) -> &[Option<HexCoord>; 6] {
        self.slots.get(coord)
    }

    /// In-bounds neighbours of `coord` in direction order.
    pub fn neighbours(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        self.slots.get(coord).iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_symmetry() {
        let table = AdjacencyTable::build(9, 7).unwrap();
        for coord in table.slots.coords() {
            for neighbour in table.neighbours(coord) {
                assert!(
                    table.neighbours(neighbour).any(|back| back == coord),
                    "{neighbour} does not link back to {coord}"
                );
            }
        }
    }

    #[test]
    fn test_interior_cell_has_six_neighbours() {
        let table = AdjacencyTable::build(10, 10).unwrap();
        assert_eq!(table.neighbours(HexCoord::new(4, 5)).count(), 6);
    }

    #[test]
    fn test_border_cells_are_trimmed() {
        let table = AdjacencyTable::build(10, 10).unwrap();
        assert!(table.neighbours(HexCoord::new(0, 0)).count() < 6);
        assert!(table.neighbours(HexCoord::new(9, 9)).count() < 6);
        for coord in table.slots.coords() {
            for neighbour in table.neighbours(coord) {
                assert!(table.contains(neighbour));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_lookup_is_an_error() {
        let map: GridMap<u8> = GridMap::new(4, 4);
        let err = map.try_get(HexCoord::new(4, 0)).unwrap_err();
        assert!(matches!(err, WorldGenError::OutOfBounds { .. }));
        let err = map.try_get(HexCoord::new(0, -1)).unwrap_err();
        assert!(matches!(err, WorldGenError::OutOfBounds { .. }));
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(
            AdjacencyTable::build(0, 5),
            Err(WorldGenError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_world_position_row_offset() {
        let size = HEX_OUTER_SIZE;
        let width = 3.0_f32.sqrt() * size;

        // Even rows shift right by half a tile, odd rows do not.
        let even = hex_world_position(HexCoord::new(0, 0), size);
        let odd = hex_world_position(HexCoord::new(0, 1), size);
        assert!((even.x - width / 2.0).abs() < 1e-3);
        assert!(odd.x.abs() < 1e-3);
        assert!((odd.z - 1.5 * size).abs() < 1e-3);
    }

    #[test]
    fn test_direction_slots_are_opposite_pairs() {
        // Direction d seen from a cell matches direction (d + 3) % 6 coming back.
        let table = AdjacencyTable::build(8, 8).unwrap();
        let coord = HexCoord::new(3, 3);
        for slot in 0..6 {
            let neighbour = table.slots(coord)[slot].unwrap();
            assert_eq!(table.slots(neighbour)[(slot + 3) % 6], Some(coord));
        }
    }
}
