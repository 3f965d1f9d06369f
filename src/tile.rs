use crate::result::{TileError, TileResult};
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    str::FromStr,
};

/// Mean circumference of the earth at the equator in meters.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Zoom levels beyond this are rejected eagerly, well above anything a tile
/// pyramid serves in practice.
pub const MAX_ZOOM: u32 = 30;

/// The global coordinate and identifier of a tile in the power-of-two
/// web-map pyramid.
#[derive(Copy, Clone, Default, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TileCoordinate {
    /// The zoom level of the tile, where 0 is the single root tile covering
    /// the whole map.
    pub zoom: u32,
    /// The x position (column) of the tile in tile sizes.
    pub x: u32,
    /// The y position (row) of the tile in tile sizes.
    pub y: u32,
}

impl TileCoordinate {
    pub fn new(zoom: u32, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// The number of tiles along one edge of the pyramid level.
    pub fn count(zoom: u32) -> u32 {
        1 << zoom
    }

    /// Location of the tile raster below the pyramid root directory.
    pub fn path(self, root: &str, extension: &str) -> String {
        format!("{root}/{}/{}/{}.{extension}", self.zoom, self.x, self.y)
    }

    /// Latitude of the tile row in radians.
    ///
    /// This is the simplified row-to-latitude mapping of the tiling scheme:
    /// rows near the top and bottom of the pyramid fall outside the
    /// renderable band and are rejected by [`validate`](Self::validate).
    pub fn latitude(self) -> f64 {
        (1.0 - 2.0 * self.y as f64 / Self::count(self.zoom) as f64) * PI
    }

    /// Ground size of the tile in meters, along one edge.
    pub fn size_meters(self) -> f64 {
        EARTH_CIRCUMFERENCE * self.latitude().cos() / Self::count(self.zoom) as f64
    }

    /// Checks that the tile exists on its zoom level and has a positive
    /// ground size.
    pub fn validate(self) -> TileResult<()> {
        if self.zoom > MAX_ZOOM
            || self.x >= Self::count(self.zoom)
            || self.y >= Self::count(self.zoom)
        {
            return Err(TileError::OutOfRange(self));
        }

        let latitude = self.latitude();

        if latitude <= -FRAC_PI_2 || latitude >= FRAC_PI_2 {
            return Err(TileError::DegenerateLatitude(self, latitude));
        }

        Ok(())
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for TileCoordinate {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');

        Ok(Self {
            zoom: parts.next().unwrap().parse()?,
            x: parts.next().unwrap().parse()?,
            y: parts.next().unwrap().parse()?,
        })
    }
}

/// Ground size of a tile together with the display scale applied to it.
///
/// Both the horizontal extent and the decoded elevations are divided by the
/// same scale factor, so the terrain keeps its real-world proportions.
#[derive(Copy, Clone, Debug)]
pub struct TileScale {
    /// Edge length of the tile in meters.
    pub tile_size: f64,
    /// Divisor shrinking meters to display units.
    pub scale_factor: f64,
}

impl TileScale {
    pub fn new(tile: TileCoordinate, scale_factor: f64) -> TileResult<Self> {
        tile.validate()?;

        if scale_factor <= 0.0 {
            return Err(TileError::InvalidScale(scale_factor));
        }

        Ok(Self {
            tile_size: tile.size_meters(),
            scale_factor,
        })
    }

    /// Edge length of the tile in display units.
    pub fn scaled_size(self) -> f64 {
        self.tile_size / self.scale_factor
    }

    /// Converts an elevation in meters to display units.
    pub fn scale_height(self, height: f32) -> f32 {
        (height as f64 / self.scale_factor) as f32
    }
}
