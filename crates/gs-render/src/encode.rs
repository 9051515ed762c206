//! Colorized images as 8-bit GeoTIFFs carrying the source georeferencing.

use gs_raster::{write_rgb8_geotiff, write_rgba8_geotiff};

use crate::{ColorizedRaster, RenderResult};

/// Three-band RGB GeoTIFF.
pub fn encode_rgb_geotiff(img: &ColorizedRaster) -> RenderResult<Vec<u8>> {
    Ok(write_rgb8_geotiff(&img.rgb, img.cols, img.rows, &img.transform, img.spatial_ref)?)
}

/// Four-band RGBA GeoTIFF; undefined cells have alpha 0.
pub fn encode_rgba_geotiff(img: &ColorizedRaster) -> RenderResult<Vec<u8>> {
    Ok(write_rgba8_geotiff(&img.rgba, img.cols, img.rows, &img.transform, img.spatial_ref)?)
}
