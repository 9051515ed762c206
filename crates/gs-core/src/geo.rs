//! Geographic coordinate types.
//!
//! Coordinates are WGS-84 degrees stored as `f64`.  Raster georeferencing
//! has to round-trip bit-exactly through the GeoTIFF tags, so unlike a pure
//! simulation model there is no room for single precision here.

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// One geo-tagged KPI sample as fed to the rasterizer.
///
/// `value` is `None` for pixels whose KPI is undefined (e.g. coverage loss
/// after a switch-off); such samples never reach the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoSample {
    pub lon:   f64,
    pub lat:   f64,
    pub value: Option<f64>,
}

impl GeoSample {
    #[inline]
    pub fn new(lon: f64, lat: f64, value: Option<f64>) -> Self {
        Self { lon, lat, value }
    }
}

/// Axis-aligned box in degrees: `x` is longitude, `y` is latitude.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Smallest box containing every `(lon, lat)` pair, or `None` for an
    /// empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bbox = BoundingBox { xmin: x0, ymin: y0, xmax: x0, ymax: y0 };
        for (x, y) in iter {
            bbox.xmin = bbox.xmin.min(x);
            bbox.xmax = bbox.xmax.max(x);
            bbox.ymin = bbox.ymin.min(y);
            bbox.ymax = bbox.ymax.max(y);
        }
        Some(bbox)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// `true` if the box has zero (or negative) extent along either axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Leaflet-style corner pair `[[south, west], [north, east]]`.
    pub fn corners_lat_lon(&self) -> [[f64; 2]; 2] {
        [[self.ymin, self.xmin], [self.ymax, self.xmax]]
    }
}
