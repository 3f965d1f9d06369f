use crate::{heightmap::Heightmap, tile::TileScale};
use bevy::{
    math::{Vec2, Vec3},
    render::{
        mesh::{Indices, Mesh},
        render_asset::RenderAssetUsages,
        render_resource::PrimitiveTopology,
    },
};
use itertools::iproduct;

/// Vertices per terrain mesh edge. The sampling resolution is fixed and
/// never derived from the raster size.
pub const GRID_RESOLUTION: u32 = 256;

/// A fully displaced terrain surface.
///
/// The grid spans the scaled tile size on the ground plane (x east, z south)
/// and carries the decoded elevations on the y axis. Built once per tile,
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Converts the surface into a renderable mesh.
    pub fn into_mesh(self) -> Mesh {
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs)
        .with_inserted_indices(Indices::U32(self.indices))
    }
}

/// Displaces a fixed-resolution grid by the elevations of a heightmap.
///
/// Vertex (col, row) samples pixel (col, row) directly, without
/// interpolation; rasters smaller than the grid clamp to their border.
pub struct TerrainMeshBuilder<'a> {
    heightmap: &'a Heightmap,
    scale: TileScale,
}

impl<'a> TerrainMeshBuilder<'a> {
    pub fn new(heightmap: &'a Heightmap, scale: TileScale) -> Self {
        Self { heightmap, scale }
    }

    /// Builds the displaced surface. Pure function of the heightmap and the
    /// scale: identical inputs yield an identical mesh.
    pub fn build(&self) -> TerrainMesh {
        let size = self.scale.scaled_size() as f32;
        let step = size / (GRID_RESOLUTION - 1) as f32;

        let positions = iproduct!(0..GRID_RESOLUTION, 0..GRID_RESOLUTION)
            .map(|(row, col)| {
                let elevation = self.scale.scale_height(self.heightmap.sample(col, row));

                Vec3::new(
                    col as f32 * step - 0.5 * size,
                    elevation,
                    row as f32 * step - 0.5 * size,
                )
            })
            .collect::<Vec<_>>();

        let normals = vertex_normals(&positions, step);

        let uvs = iproduct!(0..GRID_RESOLUTION, 0..GRID_RESOLUTION)
            .map(|(row, col)| {
                Vec2::new(
                    col as f32 / (GRID_RESOLUTION - 1) as f32,
                    row as f32 / (GRID_RESOLUTION - 1) as f32,
                )
            })
            .collect();

        let indices = iproduct!(0..GRID_RESOLUTION - 1, 0..GRID_RESOLUTION - 1)
            .flat_map(|(row, col)| {
                let a = row * GRID_RESOLUTION + col;
                let b = a + 1;
                let c = a + GRID_RESOLUTION;
                let d = c + 1;

                // Two triangles per cell, counter-clockwise seen from above.
                [a, c, b, b, c, d]
            })
            .collect();

        TerrainMesh {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}

/// Per-vertex normals of the displaced grid via central differences,
/// one-sided at the borders.
fn vertex_normals(positions: &[Vec3], step: f32) -> Vec<Vec3> {
    let last = GRID_RESOLUTION - 1;
    let elevation =
        |row: u32, col: u32| positions[(row * GRID_RESOLUTION + col) as usize].y;

    iproduct!(0..GRID_RESOLUTION, 0..GRID_RESOLUTION)
        .map(|(row, col)| {
            let left = elevation(row, col.saturating_sub(1));
            let right = elevation(row, (col + 1).min(last));
            let up = elevation(row.saturating_sub(1), col);
            let down = elevation((row + 1).min(last), col);

            Vec3::new(left - right, 2.0 * step, up - down).normalize()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::Heightmap;
    use image::{Rgba, RgbaImage};
    use rand::Rng;

    fn scale(tile_size: f64, scale_factor: f64) -> TileScale {
        TileScale {
            tile_size,
            scale_factor,
        }
    }

    fn uniform_raster(size: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(pixel))
    }

    #[test]
    fn vertex_count_is_independent_of_raster_size() {
        for raster_size in [16, 256, 512] {
            let raster = uniform_raster(raster_size, [128, 0, 0, 255]);
            let heightmap = Heightmap::decode(&raster).unwrap();

            let mesh = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0)).build();

            assert_eq!(mesh.vertex_count(), 256 * 256);
            assert_eq!(mesh.indices.len(), 255 * 255 * 6);
        }
    }

    #[test]
    fn all_black_raster_is_a_uniformly_lowered_plane() {
        let raster = uniform_raster(256, [0, 0, 0, 255]);
        let heightmap = Heightmap::decode(&raster).unwrap();

        let mesh = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0)).build();

        for position in &mesh.positions {
            assert!((position.y + 3276.8).abs() < 1e-3);
        }
        for normal in &mesh.normals {
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn grid_spans_the_scaled_tile_size() {
        let raster = uniform_raster(256, [128, 0, 0, 255]);
        let heightmap = Heightmap::decode(&raster).unwrap();

        let mesh = TerrainMeshBuilder::new(&heightmap, scale(1200.0, 10.0)).build();

        let first = mesh.positions[0];
        let last = mesh.positions[mesh.positions.len() - 1];
        assert!(first.abs_diff_eq(Vec3::new(-60.0, 0.0, -60.0), 1e-3));
        assert!(last.abs_diff_eq(Vec3::new(60.0, 0.0, 60.0), 1e-3));
    }

    #[test]
    fn displacement_scales_linearly_with_the_inverse_scale_factor() {
        let raster = uniform_raster(256, [129, 10, 0, 255]);
        let heightmap = Heightmap::decode(&raster).unwrap();

        let coarse = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0)).build();
        let fine = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 5.0)).build();

        for (a, b) in coarse.positions.iter().zip(&fine.positions) {
            assert!((b.y - 2.0 * a.y).abs() < 1e-3);
        }
    }

    #[test]
    fn construction_is_idempotent() {
        let mut rng = rand::rng();
        let raster = RgbaImage::from_fn(256, 256, |_, _| {
            Rgba([rng.random(), rng.random(), rng.random(), 255])
        });
        let heightmap = Heightmap::decode(&raster).unwrap();

        let first = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0)).build();
        let second = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0)).build();

        assert_eq!(first, second);
    }

    #[test]
    fn conversion_keeps_every_vertex() {
        let raster = uniform_raster(16, [128, 0, 0, 255]);
        let heightmap = Heightmap::decode(&raster).unwrap();

        let mesh = TerrainMeshBuilder::new(&heightmap, scale(1000.0, 10.0))
            .build()
            .into_mesh();

        assert_eq!(mesh.count_vertices(), 256 * 256);
    }
}
