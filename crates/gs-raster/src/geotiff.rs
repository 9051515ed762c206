//! Minimal GeoTIFF codec.
//!
//! Georeferencing is carried by four tags:
//!
//! | Tag                  | Content                                         |
//! |----------------------|-------------------------------------------------|
//! | `ModelPixelScale`    | `[pixel_width, pixel_height, 0]`                |
//! | `ModelTiepoint`      | `[0, 0, 0, origin_x, origin_y, 0]`              |
//! | `GeoKeyDirectory`    | model type, raster-is-area, EPSG code           |
//! | `GDAL_NODATA`        | no-data sentinel as ASCII (single band only)    |
//!
//! All geometry is stored as `f64`, so bounds and resolution read back
//! bit-for-bit.  Pixel data is deflate-compressed.

use std::io::{Cursor, Seek, Write};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::compression::Deflate;
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

use crate::grid::{GeoTransform, RasterGrid, SpatialRef};
use crate::{RasterError, RasterResult};

// GeoKey ids and values (GeoTIFF 1.0).
const GT_MODEL_TYPE:        u16 = 1024;
const GT_RASTER_TYPE:       u16 = 1025;
const GEOGRAPHIC_TYPE:      u16 = 2048;
const PROJECTED_CS_TYPE:    u16 = 3072;
const MODEL_PROJECTED:      u16 = 1;
const MODEL_GEOGRAPHIC:     u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

fn geo_keys(srs: SpatialRef) -> [u16; 16] {
    let (model, crs_key) = if srs.geographic {
        (MODEL_GEOGRAPHIC, GEOGRAPHIC_TYPE)
    } else {
        (MODEL_PROJECTED, PROJECTED_CS_TYPE)
    };
    [
        1, 1, 0, 3, // version 1.1.0, three keys
        GT_MODEL_TYPE, 0, 1, model,
        GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key, 0, 1, srs.epsg,
    ]
}

fn encode<C, W>(
    sink:      W,
    cols:      usize,
    rows:      usize,
    transform: &GeoTransform,
    srs:       SpatialRef,
    no_data:   Option<f64>,
    data:      &[C::Inner],
) -> RasterResult<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    W: Write + Seek,
{
    let width = u32::try_from(cols).map_err(|_| RasterError::Format(format!("{cols} columns")))?;
    let height = u32::try_from(rows).map_err(|_| RasterError::Format(format!("{rows} rows")))?;

    let mut tiff = TiffEncoder::new(sink)?;
    let mut image = tiff.new_image_with_compression::<C, _>(width, height, Deflate::default())?;
    {
        let dir = image.encoder();
        let scale = [transform.pixel_width, transform.pixel_height, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0];
        dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
        dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
        dir.write_tag(Tag::GeoKeyDirectoryTag, &geo_keys(srs)[..])?;
        if let Some(nd) = no_data {
            dir.write_tag(Tag::GdalNodata, nd.to_string().as_str())?;
        }
    }
    image.write_data(data)?;
    Ok(())
}

/// Encode a single-band `f32` raster.
pub fn write_geotiff(grid: &RasterGrid) -> RasterResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    encode::<colortype::Gray32Float, _>(
        &mut buf,
        grid.cols,
        grid.rows,
        &grid.transform,
        grid.spatial_ref,
        Some(grid.no_data),
        &grid.cells,
    )?;
    Ok(buf.into_inner())
}

/// Encode interleaved 8-bit RGB pixels with the given georeferencing.
pub fn write_rgb8_geotiff(
    rgb:       &[u8],
    cols:      usize,
    rows:      usize,
    transform: &GeoTransform,
    srs:       SpatialRef,
) -> RasterResult<Vec<u8>> {
    check_len(rgb.len(), cols, rows, 3)?;
    let mut buf = Cursor::new(Vec::new());
    encode::<colortype::RGB8, _>(&mut buf, cols, rows, transform, srs, None, rgb)?;
    Ok(buf.into_inner())
}

/// Encode interleaved 8-bit RGBA pixels with the given georeferencing.
pub fn write_rgba8_geotiff(
    rgba:      &[u8],
    cols:      usize,
    rows:      usize,
    transform: &GeoTransform,
    srs:       SpatialRef,
) -> RasterResult<Vec<u8>> {
    check_len(rgba.len(), cols, rows, 4)?;
    let mut buf = Cursor::new(Vec::new());
    encode::<colortype::RGBA8, _>(&mut buf, cols, rows, transform, srs, None, rgba)?;
    Ok(buf.into_inner())
}

fn check_len(len: usize, cols: usize, rows: usize, bands: usize) -> RasterResult<()> {
    if len == cols * rows * bands {
        Ok(())
    } else {
        Err(RasterError::Format(format!(
            "{len} bytes for a {cols}x{rows} image with {bands} bands"
        )))
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode a single-band `f32` GeoTIFF produced by [`write_geotiff`].
pub fn read_geotiff(bytes: &[u8]) -> RasterResult<RasterGrid> {
    let mut dec = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = dec.dimensions()?;

    let scale = dec.get_tag_f64_vec(Tag::ModelPixelScaleTag)?;
    let tiepoint = dec.get_tag_f64_vec(Tag::ModelTiepointTag)?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(RasterError::Format("short georeferencing tags".to_owned()));
    }
    let transform = GeoTransform {
        origin_x:     tiepoint[3] - tiepoint[0] * scale[0],
        origin_y:     tiepoint[4] + tiepoint[1] * scale[1],
        pixel_width:  scale[0],
        pixel_height: scale[1],
    };

    let keys = dec.get_tag_u16_vec(Tag::GeoKeyDirectoryTag)?;
    let spatial_ref = parse_geo_keys(&keys)?;

    let no_data = match dec.find_tag(Tag::GdalNodata)? {
        None => f64::NAN,
        Some(v) => {
            let text = v.into_string()?;
            let text = text.trim_end_matches('\0').trim();
            text.parse::<f64>()
                .map_err(|_| RasterError::Format(format!("GDAL_NODATA {text:?}")))?
        }
    };

    let cells = match dec.read_image()? {
        DecodingResult::F32(v) => v,
        _ => return Err(RasterError::Format("expected a single f32 band".to_owned())),
    };
    let (cols, rows) = (width as usize, height as usize);
    if cells.len() != cols * rows {
        return Err(RasterError::Format(format!(
            "{} cells for a {cols}x{rows} grid",
            cells.len()
        )));
    }

    Ok(RasterGrid { cols, rows, cells, transform, spatial_ref, no_data })
}

fn parse_geo_keys(keys: &[u16]) -> RasterResult<SpatialRef> {
    if keys.len() < 4 {
        return Err(RasterError::Format("empty GeoKeyDirectory".to_owned()));
    }
    let count = keys[3] as usize;
    let mut geographic = None;
    let mut epsg = None;
    for entry in keys[4..].chunks_exact(4).take(count) {
        match entry[0] {
            GT_MODEL_TYPE => geographic = Some(entry[3] == MODEL_GEOGRAPHIC),
            GEOGRAPHIC_TYPE | PROJECTED_CS_TYPE => epsg = Some(entry[3]),
            _ => {}
        }
    }
    match (epsg, geographic) {
        (Some(epsg), Some(geographic)) => Ok(SpatialRef { epsg, geographic }),
        _ => Err(RasterError::Format("GeoKeyDirectory lacks model type or EPSG code".to_owned())),
    }
}
