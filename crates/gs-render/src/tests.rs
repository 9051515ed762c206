//! Unit tests for gs-render.

use gs_core::ColorScaleId;
use gs_raster::{GeoTransform, RasterGrid, SpatialRef};

use crate::{colorize, ColorizeOptions};

/// 3×2 grid, no-data 0.0: (1, 0) is empty and (2, 1) is NaN.
fn grid() -> RasterGrid {
    let mut g = RasterGrid::filled(3, 2, GeoTransform::from_origin(-3.7, 40.5, 0.01), SpatialRef::WGS84, 0.0);
    g.set(0, 0, 13.0);
    g.set(2, 0, 6.5);
    g.set(0, 1, -4.0);
    g.set(1, 1, 99.0);
    g.set(2, 1, f32::NAN);
    g
}

fn opts() -> ColorizeOptions {
    ColorizeOptions::new(0.0, 13.0, ColorScaleId::RdYlGn)
}

// ── Scales ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scale {
    use super::*;
    use crate::ColorScale;

    #[test]
    fn endpoints_and_midpoint_hit_anchors() {
        let s = ColorScale::new(ColorScaleId::RdYlGn);
        assert_eq!(s.at(0.0), [0xa5, 0x00, 0x26]);
        assert_eq!(s.at(0.5), [0xff, 0xff, 0xbf]);
        assert_eq!(s.at(1.0), [0x00, 0x68, 0x37]);
    }

    #[test]
    fn interpolates_between_anchors() {
        let s = ColorScale::new(ColorScaleId::Reds);
        // Halfway between fff5f0 and fee0d2.
        assert_eq!(s.at(0.0625), [0xff, 0xeb, 0xe1]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let s = ColorScale::new(ColorScaleId::Greens);
        assert_eq!(s.at(-1.0), s.at(0.0));
        assert_eq!(s.at(2.0), s.at(1.0));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(ColorScale::by_name("coolwarm").unwrap().id(), ColorScaleId::Coolwarm);
        assert_eq!(ColorScale::by_name("rdylgn").unwrap().id(), ColorScaleId::RdYlGn);
        assert!(ColorScale::by_name("viridis").is_err());
    }
}

// ── Colorization ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod colorizing {
    use super::*;
    use crate::RenderError;

    #[test]
    fn no_data_is_transparent() {
        let img = colorize(&grid(), &opts()).unwrap();
        assert_eq!(img.rgba_at(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(img.rgba_at(2, 1), Some([0, 0, 0, 0]));
        assert_eq!(&img.rgb[3..6], &[0, 0, 0]);
        assert_eq!(img.opaque_count(), 4);
    }

    #[test]
    fn values_are_clipped_to_the_range() {
        let img = colorize(&grid(), &opts()).unwrap();
        // -4 clips to vmin, 99 clips to vmax.
        assert_eq!(img.rgba_at(0, 1), Some([0xa5, 0x00, 0x26, 255]));
        assert_eq!(img.rgba_at(1, 1), Some([0x00, 0x68, 0x37, 255]));
        assert_eq!(img.rgba_at(0, 0), img.rgba_at(1, 1));
        assert_eq!(img.rgba_at(2, 0), Some([0xff, 0xff, 0xbf, 255]));
    }

    #[test]
    fn rgb_and_rgba_agree_on_defined_cells() {
        let img = colorize(&grid(), &opts()).unwrap();
        for (rgb, rgba) in img.rgb.chunks_exact(3).zip(img.rgba.chunks_exact(4)) {
            assert_eq!(rgb, &rgba[..3]);
        }
        assert_eq!(img.rgb.len(), 3 * 2 * 3);
        assert_eq!(img.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn option_no_data_is_honoured() {
        let mut g = grid();
        g.set(1, 0, -9999.0);
        let with = ColorizeOptions { no_data: -9999.0, ..opts() };
        assert_eq!(colorize(&g, &with).unwrap().rgba_at(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(colorize(&g, &opts()).unwrap().rgba_at(1, 0), Some([0xa5, 0x00, 0x26, 255]));
    }

    #[test]
    fn deterministic() {
        let a = colorize(&grid(), &opts()).unwrap();
        let b = colorize(&grid(), &opts()).unwrap();
        assert_eq!(a.rgb, b.rgb);
        assert_eq!(a.rgba, b.rgba);
        assert_eq!(a.legend, b.legend);
    }

    #[test]
    fn invalid_range_rejected() {
        for (vmin, vmax) in [(1.0, 1.0), (2.0, 1.0), (f64::NAN, 1.0), (0.0, f64::INFINITY)] {
            let o = ColorizeOptions { vmin, vmax, ..opts() };
            assert!(matches!(colorize(&grid(), &o), Err(RenderError::InvalidRange { .. })));
        }
    }

    #[test]
    fn geometry_is_carried_over() {
        let g = grid();
        let img = colorize(&g, &opts()).unwrap();
        assert_eq!(img.bounds, g.bounds());
        assert_eq!(img.transform, g.transform);
        assert_eq!(img.spatial_ref, SpatialRef::WGS84);
    }

    #[test]
    fn options_from_profile() {
        let p = gs_core::KpiKind::ChurnProbability.profile();
        let o = ColorizeOptions::from_profile(&p);
        assert_eq!((o.vmin, o.vmax, o.no_data), (0.01, 0.5, 0.01));
        assert_eq!(o.scale.id(), ColorScaleId::Reds);
    }
}

// ── Legends ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod legend {
    use std::sync::Arc;

    use super::*;
    use crate::{build_legend, legend_for_scale_name, ColorScale, LegendCache};

    #[test]
    fn six_entries_over_zero_to_ten() {
        let l = build_legend(ColorScale::new(ColorScaleId::RdYlGn), 0.0, 10.0, 6).unwrap();
        let labels: Vec<&str> = l.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["0.00", "2.00", "4.00", "6.00", "8.00", "10.00"]);
        for (e, want) in l.entries.iter().zip([0.0, 2.0, 4.0, 6.0, 8.0, 10.0]) {
            assert!((e.value - want).abs() < 1e-12);
        }
        assert_eq!(l.entries[0].hex(), "a50026");
        assert_eq!(l.entries[5].hex(), "006837");
    }

    #[test]
    fn degenerate_sizes() {
        let s = ColorScale::new(ColorScaleId::Greens);
        let one = build_legend(s, 3.0, 7.0, 1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.entries[0].value, 3.0);
        assert!(build_legend(s, 3.0, 7.0, 0).unwrap().is_empty());
    }

    #[test]
    fn label_hex_pairs_in_order() {
        let l = build_legend(ColorScale::new(ColorScaleId::Reds), -1.0, 1.0, 2).unwrap();
        assert_eq!(
            l.label_hex_pairs(),
            vec![("-1.00".to_owned(), "fff5f0".to_owned()), ("1.00".to_owned(), "67000d".to_owned())]
        );
    }

    #[test]
    fn legend_only_path_fails_fast_on_unknown_scale() {
        assert!(legend_for_scale_name("Reds", 0.0, 1.0, 3).is_ok());
        assert!(matches!(
            legend_for_scale_name("jet", 0.0, 1.0, 3),
            Err(crate::RenderError::Core(gs_core::CoreError::InvalidSelection { .. }))
        ));
    }

    #[test]
    fn cache_reuses_legends() {
        let cache = LegendCache::new();
        let s = ColorScale::new(ColorScaleId::Coolwarm);
        let a = cache.get_or_build(s, -0.3, 0.3, 6).unwrap();
        let b = cache.get_or_build(s, -0.3, 0.3, 6).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let _ = cache.get_or_build(s, -0.3, 0.3, 5).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get_or_build(s, 1.0, 0.0, 6).is_err());
        assert_eq!(cache.len(), 2);
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod encode {
    use std::io::Cursor;

    use tiff::decoder::{Decoder, DecodingResult};
    use tiff::ColorType;

    use super::*;
    use crate::{encode_rgb_geotiff, encode_rgba_geotiff};

    #[test]
    fn rgba_keeps_alpha() {
        let img = colorize(&grid(), &opts()).unwrap();
        let bytes = encode_rgba_geotiff(&img).unwrap();
        let mut dec = Decoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(dec.dimensions().unwrap(), (3, 2));
        assert_eq!(dec.colortype().unwrap(), ColorType::RGBA(8));
        match dec.read_image().unwrap() {
            DecodingResult::U8(px) => assert_eq!(px, img.rgba),
            _ => panic!("expected 8-bit samples"),
        }
    }

    #[test]
    fn rgb_has_three_bands() {
        let img = colorize(&grid(), &opts()).unwrap();
        let bytes = encode_rgb_geotiff(&img).unwrap();
        let mut dec = Decoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(dec.colortype().unwrap(), ColorType::RGB(8));
    }
}
