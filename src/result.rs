use crate::tile::TileCoordinate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("tile {0} does not exist on zoom level {zoom}", zoom = .0.zoom)]
    OutOfRange(TileCoordinate),
    #[error("tile {0} maps to latitude {1:.3} rad, outside the renderable band")]
    DegenerateLatitude(TileCoordinate, f64),
    #[error("scale factor must be positive, got {0}")]
    InvalidScale(f64),
    #[error("failed to load tile image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("tile raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
}

pub type TileResult<T> = Result<T, TileError>;
