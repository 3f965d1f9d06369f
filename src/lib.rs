//! This crate provides a small interactive viewer for a single web-map
//! terrain tile.
//!
//! A tile is addressed by its (zoom, x, y) coordinate in the power-of-two
//! map pyramid and served as a PNG raster whose pixels carry
//! Terrarium-encoded elevations (meters = r * 256 + g + b / 256 - 32768).
//! The viewer decodes the raster into an elevation grid, displaces a fixed
//! 256x256 vertex grid sized to the tile's real-world ground extent, and
//! renders the resulting surface under an orbital camera, next to a ground
//! reference grid.
//!
//! The raster is read and decoded asynchronously on the IO task pool; the
//! mesh is constructed completely before it is published to the scene, so
//! the frame loop never observes a partial surface. A missing or malformed
//! tile leaves the viewer running with the reference grid only.

use bevy::prelude::*;

use crate::config::ViewerConfig;

pub mod camera;
pub mod config;
pub mod heightmap;
pub mod loader;
pub mod mesh;
pub mod result;
pub mod tile;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        camera::{OrbitalCamera, OrbitalCameraPlugin},
        config::{ViewerConfig, DEFAULT_CONFIG_PATH},
        heightmap::{decode_height, Heightmap},
        loader::TerrainSurface,
        mesh::{TerrainMesh, TerrainMeshBuilder, GRID_RESOLUTION},
        result::{TileError, TileResult},
        tile::{TileCoordinate, TileScale, EARTH_CIRCUMFERENCE},
        TerrainTilePlugin,
    };
}

/// Loads the configured tile asynchronously and publishes the finished
/// terrain surface into the scene.
pub struct TerrainTilePlugin;

impl Plugin for TerrainTilePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewerConfig>()
            .add_systems(Startup, loader::start_tile_load)
            .add_systems(
                Update,
                loader::finish_tile_load.run_if(resource_exists::<loader::TileLoad>),
            );
    }
}
