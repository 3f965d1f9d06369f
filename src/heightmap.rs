use crate::result::{TileError, TileResult};
use image::RgbaImage;
use ndarray::Array2;

/// Offset of the Terrarium elevation encoding in meters.
const TERRARIUM_OFFSET: f32 = 32768.0;

/// Decodes a Terrarium RGB triple to an elevation in meters.
///
/// Total over all byte values: the result lies in [-32768, 32768).
#[inline]
pub fn decode_height(r: u8, g: u8, b: u8) -> f32 {
    r as f32 * 256.0 + g as f32 + b as f32 / 256.0 - TERRARIUM_OFFSET
}

/// The decoded elevations of one tile raster, in meters.
///
/// Samples outside the raster clamp to the border pixel, so any vertex grid
/// can be displaced from any raster size without reading out of range.
#[derive(Clone, Debug)]
pub struct Heightmap {
    data: Array2<f32>,
}

impl Heightmap {
    /// Decodes every pixel of the raster once, ignoring the alpha channel.
    pub fn decode(raster: &RgbaImage) -> TileResult<Self> {
        let (width, height) = raster.dimensions();

        if width == 0 || height == 0 {
            return Err(TileError::EmptyRaster { width, height });
        }

        let pixels: &[[u8; 4]] = bytemuck::cast_slice(raster.as_raw());
        let heights = pixels
            .iter()
            .map(|&[r, g, b, _]| decode_height(r, g, b))
            .collect();

        let data = Array2::from_shape_vec((height as usize, width as usize), heights)
            .expect("pixel count matches the raster dimensions");

        Ok(Self { data })
    }

    pub fn width(&self) -> u32 {
        self.data.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.data.nrows() as u32
    }

    /// Samples the elevation at the given pixel, clamping to the border.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        let x = (x as usize).min(self.data.ncols() - 1);
        let y = (y as usize).min(self.data.nrows() - 1);

        self.data[[y, x]]
    }
}
