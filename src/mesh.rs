//! Hex prism tile meshes and boundary-consistent height blending.
//!
//! Every tile shares one prototype mesh (same vertex layout, same triangle
//! indices); only vertex heights differ per tile. The top surface is a fan of
//! six triangles around the centre, optionally subdivided, plus side walls
//! and a bottom cap. Blending assigns each top-surface vertex a height that
//! adjacent tiles agree on exactly: corner heights average the elevations of
//! the tiles meeting at that corner, so both sides of a shared edge compute
//! the same number from the same inputs.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::grid::{AdjacencyTable, GridMap, HexCoord, HEX_OUTER_SIZE};

/// Geometry parameters for the tile prototype.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MeshParams {
    /// Centre-to-corner radius of the hex top face.
    pub outer_size: f32,
    /// Prism thickness before blending; the top ring sits at `+height/2`.
    pub initial_height: f32,
    /// Times each top fan triangle is split four-ways.
    pub subdivisions: u32,
    /// Planar projection divisor for UVs.
    pub uv_scale: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            outer_size: HEX_OUTER_SIZE,
            initial_height: 5.0,
            subdivisions: 1,
            uv_scale: 85.0,
        }
    }
}

impl MeshParams {
    pub fn validate(&self) -> Result<(), WorldGenError> {
        if !self.outer_size.is_finite() || self.outer_size <= 0.0 {
            return Err(WorldGenError::InvalidMeshParams(format!(
                "outer_size must be positive, got {}",
                self.outer_size
            )));
        }
        if !self.initial_height.is_finite() || self.initial_height <= 0.0 {
            return Err(WorldGenError::InvalidMeshParams(format!(
                "initial_height must be positive, got {}",
                self.initial_height
            )));
        }
        if self.subdivisions > 5 {
            return Err(WorldGenError::InvalidMeshParams(format!(
                "subdivisions capped at 5, got {}",
                self.subdivisions
            )));
        }
        Ok(())
    }
}

// =============================================================================
// PROTOTYPE
// =============================================================================

/// How a logical top-surface point gets its blended height.
#[derive(Clone, Copy, Debug, PartialEq)]
enum SurfaceKind {
    /// Perimeter corner `i`, shared with the tiles at direction slots `i`
    /// and `i + 1`.
    Corner(usize),
    /// The fan centre.
    Center,
    /// Exact midpoint of two adjacent corners; stays on the straight
    /// perimeter edge between them.
    MidEdge(usize, usize),
    /// Anything else on the top face; lies on the plane of its fan sector
    /// (bounded by the two corners named here and the centre).
    FaceInterior(usize, usize),
}

/// One logical top-surface point and the duplicated mesh vertices at it.
#[derive(Clone, Debug)]
struct SurfaceGroup {
    point: Vec3,
    vertex_ids: Vec<u32>,
    kind: SurfaceKind,
}

/// The shared tile mesh: positions/indices/uvs plus the surface-point groups
/// the blender moves. Built once per generation run.
#[derive(Clone, Debug)]
pub struct HexMeshPrototype {
    params: MeshParams,
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    uvs: Vec<Vec2>,
    corners: [Vec3; 6],
    groups: Vec<SurfaceGroup>,
}

/// Per-face planar projection axis for UVs.
#[derive(Clone, Copy)]
enum Projection {
    Up,
    Forward,
    Right,
}

/// Mesh vertices collected for one face, deduplicated within the face only.
/// Duplicates across faces are intentional: they give each triangle fan its
/// own normals and let the blender treat a logical point as a group.
struct FaceData {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    uvs: Vec<Vec2>,
    interned: HashMap<(i64, i64, i64), u32>,
    projection: Projection,
    uv_scale: f32,
}

impl FaceData {
    fn new(projection: Projection, uv_scale: f32) -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            uvs: Vec::new(),
            interned: HashMap::new(),
            projection,
            uv_scale,
        }
    }

    fn intern(&mut self, p: Vec3) -> u32 {
        let key = quantize3(p);
        if let Some(&idx) = self.interned.get(&key) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(p);
        self.uvs.push(match self.projection {
            Projection::Up => Vec2::new(p.x, p.z) / self.uv_scale,
            Projection::Forward => Vec2::new(p.x, p.y) / self.uv_scale,
            Projection::Right => Vec2::new(p.y, p.z) / self.uv_scale,
        });
        self.interned.insert(key, idx);
        idx
    }

    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let ia = self.intern(a);
        let ib = self.intern(b);
        let ic = self.intern(c);
        self.indices.extend([ia, ib, ic]);
    }

    /// Split a triangle four-ways `depth` times, interning midpoints.
    fn push_subdivided(&mut self, a: Vec3, b: Vec3, c: Vec3, depth: u32) {
        if depth == 0 {
            self.push_triangle(a, b, c);
            return;
        }
        let ab = round3((a + b) / 2.0);
        let bc = round3((b + c) / 2.0);
        let ca = round3((c + a) / 2.0);
        self.push_subdivided(a, ab, ca, depth - 1);
        self.push_subdivided(ab, b, bc, depth - 1);
        self.push_subdivided(ca, bc, c, depth - 1);
        self.push_subdivided(ab, bc, ca, depth - 1);
    }
}

fn round3(v: Vec3) -> Vec3 {
    Vec3::new(
        (v.x * 1000.0).round() / 1000.0,
        (v.y * 1000.0).round() / 1000.0,
        (v.z * 1000.0).round() / 1000.0,
    )
}

fn quantize3(v: Vec3) -> (i64, i64, i64) {
    (
        (v.x * 1000.0).round() as i64,
        (v.y * 1000.0).round() as i64,
        (v.z * 1000.0).round() as i64,
    )
}

fn quantize2(x: f32, z: f32) -> (i64, i64) {
    ((x * 1000.0).round() as i64, (z * 1000.0).round() as i64)
}

/// Corner `i` of the top face, between direction slots `i` and `i + 1`.
/// Corners sit at angles `30 + 60 * i` degrees, counter-clockwise from east.
fn corner_point(index: usize, size: f32, y: f32) -> Vec3 {
    let angle = (30.0 + 60.0 * index as f32).to_radians();
    round3(Vec3::new(size * angle.cos(), y, size * angle.sin()))
}

impl HexMeshPrototype {
    pub fn build(params: MeshParams) -> Result<Self, WorldGenError> {
        params.validate()?;

        let half = params.initial_height / 2.0;
        let top_center = Vec3::new(0.0, half, 0.0);
        let bottom_center = Vec3::new(0.0, -half, 0.0);
        let corners: [Vec3; 6] =
            std::array::from_fn(|i| corner_point(i, params.outer_size, half));

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut uvs = Vec::new();
        let mut append = |face: FaceData| {
            let offset = positions.len() as u32;
            positions.extend(face.positions);
            uvs.extend(face.uvs);
            indices.extend(face.indices.into_iter().map(|i| i + offset));
        };

        // Top surface: one subdividable fan triangle per sector, wound for
        // an upward normal.
        for i in 0..6 {
            let mut face = FaceData::new(Projection::Up, params.uv_scale);
            face.push_subdivided(
                top_center,
                corners[(i + 1) % 6],
                corners[i],
                params.subdivisions,
            );
            append(face);
        }

        // Side walls: flat quads between the top and bottom rings, facing
        // outward. The top ring vertices share surface groups with the fan
        // corners so walls follow the blended heights.
        for i in 0..6 {
            let top_a = corners[i];
            let top_b = corners[(i + 1) % 6];
            let bot_a = Vec3::new(top_a.x, -half, top_a.z);
            let bot_b = Vec3::new(top_b.x, -half, top_b.z);
            let wall = (top_b - top_a).cross(bot_b - top_a);
            let projection = if wall.x.abs() >= wall.z.abs() {
                Projection::Right
            } else {
                Projection::Forward
            };
            let mut face = FaceData::new(projection, params.uv_scale);
            face.push_triangle(top_a, top_b, bot_b);
            face.push_triangle(top_a, bot_b, bot_a);
            append(face);
        }

        // Bottom cap, wound downward.
        for i in 0..6 {
            let mut face = FaceData::new(Projection::Up, params.uv_scale);
            face.push_triangle(
                bottom_center,
                corner_point(i, params.outer_size, -half),
                corner_point((i + 1) % 6, params.outer_size, -half),
            );
            append(face);
        }

        let groups = classify_surface_groups(&positions, &corners);
        Ok(Self {
            params,
            positions,
            indices,
            uvs,
            corners,
            groups,
        })
    }

    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Group every top-surface vertex (y > 0) by its horizontal position and
/// decide how the blender will treat the group.
fn classify_surface_groups(positions: &[Vec3], corners: &[Vec3; 6]) -> Vec<SurfaceGroup> {
    let mut by_point: HashMap<(i64, i64), (Vec3, Vec<u32>)> = HashMap::new();
    for (idx, p) in positions.iter().enumerate() {
        if p.y > 0.0 {
            by_point
                .entry(quantize2(p.x, p.z))
                .or_insert_with(|| (*p, Vec::new()))
                .1
                .push(idx as u32);
        }
    }

    let corner_keys: [(i64, i64); 6] =
        std::array::from_fn(|i| quantize2(corners[i].x, corners[i].z));

    let mut groups: Vec<SurfaceGroup> = by_point
        .into_iter()
        .map(|(key, (point, vertex_ids))| {
            let kind = if key == (0, 0) {
                SurfaceKind::Center
            } else if let Some(i) = corner_keys.iter().position(|&ck| ck == key) {
                SurfaceKind::Corner(i)
            } else {
                classify_interior(point, corners)
            };
            SurfaceGroup {
                point,
                vertex_ids,
                kind,
            }
        })
        .collect();

    // Deterministic group order regardless of hash-map iteration.
    groups.sort_by_key(|g| quantize2(g.point.x, g.point.z));
    groups
}

/// Sector lookup plus the coordinate-symmetry midpoint test.
fn classify_interior(point: Vec3, corners: &[Vec3; 6]) -> SurfaceKind {
    let angle = point.z.atan2(point.x).to_degrees();
    let sector = (((angle - 30.0) / 60.0).floor() as i64).rem_euclid(6) as usize;
    let a = sector;
    let b = (sector + 1) % 6;

    let mid = (corners[a] + corners[b]) / 2.0;
    if (point.x - mid.x).abs() < 1e-3 && (point.z - mid.z).abs() < 1e-3 {
        SurfaceKind::MidEdge(a, b)
    } else {
        SurfaceKind::FaceInterior(a, b)
    }
}

// =============================================================================
// BLENDING
// =============================================================================

/// One tile's blended mesh buffers, ready for an external renderer or
/// collision registrar. Index topology is identical across all tiles.
#[derive(Clone, Debug, Default)]
pub struct TileMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    /// Blended height of each perimeter corner.
    pub edge_heights: [f32; 6],
    /// Blended height of the fan centre; the tile's surface anchor height.
    pub center_height: f32,
}

/// Blend one tile's surface against its neighbours' elevations.
///
/// Corner `i` averages the elevations of this tile and the neighbours at
/// direction slots `i` and `i + 1` (however many of the three exist). The
/// participants are summed in coordinate order so the adjacent tiles, which
/// see the same set, produce the identical float. The centre is the mean of
/// the six corner heights; midpoints sit on their perimeter edge; everything
/// else is dropped onto its fan-sector plane.
pub fn blend_tile_mesh(
    proto: &HexMeshPrototype,
    coord: HexCoord,
    heightmap: &GridMap<f32>,
    adjacency: &AdjacencyTable,
) -> TileMesh {
    let slots = adjacency.slots(coord);
    let own = *heightmap.get(coord);

    let mut edge_heights = [0.0f32; 6];
    for (i, height) in edge_heights.iter_mut().enumerate() {
        let mut participants: Vec<(HexCoord, f32)> = vec![(coord, own)];
        for slot in [i, (i + 1) % 6] {
            if let Some(neighbour) = slots[slot] {
                participants.push((neighbour, *heightmap.get(neighbour)));
            }
        }
        participants.sort_by_key(|(c, _)| *c);
        let sum: f32 = participants.iter().map(|(_, h)| h).sum();
        *height = sum / participants.len() as f32;
    }
    let center_height = edge_heights.iter().sum::<f32>() / 6.0;

    let mut positions = proto.positions.clone();
    for group in &proto.groups {
        let target = match group.kind {
            SurfaceKind::Corner(i) => edge_heights[i],
            SurfaceKind::Center => center_height,
            SurfaceKind::MidEdge(a, b) => (edge_heights[a] + edge_heights[b]) / 2.0,
            SurfaceKind::FaceInterior(a, b) => sector_plane_height(
                group.point,
                proto.corners[a],
                edge_heights[a],
                proto.corners[b],
                edge_heights[b],
                center_height,
            ),
        };
        for &id in &group.vertex_ids {
            positions[id as usize].y = target;
        }
    }

    let normals = recompute_normals(&positions, &proto.indices);
    let (bounds_min, bounds_max) = recompute_bounds(&positions);

    TileMesh {
        positions,
        indices: proto.indices.clone(),
        uvs: proto.uvs.clone(),
        normals,
        bounds_min,
        bounds_max,
        edge_heights,
        center_height,
    }
}

/// Height of `point` on the plane through the two blended corners and the
/// blended centre of its fan sector.
fn sector_plane_height(
    point: Vec3,
    corner_a: Vec3,
    height_a: f32,
    corner_b: Vec3,
    height_b: f32,
    center_height: f32,
) -> f32 {
    let a = Vec3::new(corner_a.x, height_a, corner_a.z);
    let b = Vec3::new(corner_b.x, height_b, corner_b.z);
    let c = Vec3::new(0.0, center_height, 0.0);

    let normal = (a - c).cross(b - c);
    if normal.y.abs() < f32::EPSILON {
        return point.y;
    }
    let d = -normal.dot(c);
    -(normal.x * point.x + normal.z * point.z + d) / normal.y
}

fn recompute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let a = positions[tri[0] as usize];
        let b = positions[tri[1] as usize];
        let c = positions[tri[2] as usize];
        let face = (b - a).cross(c - a);
        for &idx in tri {
            normals[idx as usize] += face;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

fn recompute_bounds(positions: &[Vec3]) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for p in positions {
        min = min.min(*p);
        max = max.max(*p);
    }
    (min, max)
}

/// Blend every tile in the grid. Returns the mesh arena and the blended
/// centre heights used for world anchors and island highest-tile tracking.
pub fn blend_all_tiles(
    proto: &HexMeshPrototype,
    heightmap: &GridMap<f32>,
    adjacency: &AdjacencyTable,
) -> (GridMap<TileMesh>, GridMap<f32>) {
    let width = heightmap.width();
    let height = heightmap.height();
    let mut meshes = GridMap::new_with(width, height, TileMesh::default());
    let mut center_heights = GridMap::new_with(width, height, 0.0f32);

    for coord in heightmap.coords() {
        let mesh = blend_tile_mesh(proto, coord, heightmap, adjacency);
        center_heights.set(coord, mesh.center_height);
        meshes.set(coord, mesh);
    }
    (meshes, center_heights)
}
