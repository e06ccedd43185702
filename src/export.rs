//! Debug exports: PNG maps and an ASCII terrain preview.
//!
//! One pixel (or character) per cell. These are inspection aids for the CLI;
//! the real mesh output goes to the renderer through `WorldGraph::meshes`.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::grid::GridMap;
use crate::terrain::{TileType, MAX_WORLD_HEIGHT};
use crate::world::WorldGraph;

/// Export the tile category map as a colored PNG.
pub fn export_terrain_map(world: &WorldGraph, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(world.width as u32, world.height as u32);

    for (coord, cell) in world.cells.iter() {
        img.put_pixel(
            coord.col as u32,
            coord.row as u32,
            Rgb(terrain_color(cell.terrain)),
        );
    }
    img.save(path)
}

/// Export the raw elevation map as a grayscale ramp PNG.
pub fn export_heightmap(heightmap: &GridMap<f32>, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(heightmap.width() as u32, heightmap.height() as u32);

    for (coord, height) in heightmap.iter() {
        let t = (height / MAX_WORLD_HEIGHT).clamp(0.0, 1.0);
        let v = (t * 255.0) as u8;
        img.put_pixel(coord.col as u32, coord.row as u32, Rgb([v, v, v]));
    }
    img.save(path)
}

fn terrain_color(tile: TileType) -> [u8; 3] {
    match tile {
        TileType::Water => [52, 107, 168],
        TileType::Sand => [222, 206, 144],
        TileType::Grass => [106, 162, 82],
        TileType::Ground => [136, 112, 82],
        TileType::Rock => [126, 126, 130],
    }
}

/// Render the terrain map as ASCII, one character per cell, row 0 at the top.
pub fn render_ascii(world: &WorldGraph) -> String {
    let mut out = String::with_capacity((world.width + 1) * world.height);
    for row in (0..world.height).rev() {
        for col in 0..world.width {
            let coord = crate::grid::HexCoord::new(col as i32, row as i32);
            out.push(match world.cells.get(coord).terrain {
                TileType::Water => '~',
                TileType::Sand => '.',
                TileType::Grass => '"',
                TileType::Ground => '+',
                TileType::Rock => '^',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::NoiseParams;
    use crate::world::generate_world;

    #[test]
    fn test_ascii_preview_shape() {
        let world = generate_world(8, 5, 3, &NoiseParams::default()).unwrap();
        let ascii = render_ascii(&world);
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == 8));
    }
}
