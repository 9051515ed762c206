//! Continuous color scales.
//!
//! Each scale is a short table of anchor colors spaced evenly over
//! `[0, 1]`; intermediate positions are linearly interpolated per channel.
//! The sequential and red-yellow-green tables are the ColorBrewer anchors;
//! `Coolwarm` is a seven-stop approximation of the diverging blue-red map.

use std::str::FromStr;

use gs_core::{ColorScaleId, CoreResult};

const RD_YL_GN: [[u8; 3]; 11] = [
    [0xa5, 0x00, 0x26],
    [0xd7, 0x30, 0x27],
    [0xf4, 0x6d, 0x43],
    [0xfd, 0xae, 0x61],
    [0xfe, 0xe0, 0x8b],
    [0xff, 0xff, 0xbf],
    [0xd9, 0xef, 0x8b],
    [0xa6, 0xd9, 0x6a],
    [0x66, 0xbd, 0x63],
    [0x1a, 0x98, 0x50],
    [0x00, 0x68, 0x37],
];

const REDS: [[u8; 3]; 9] = [
    [0xff, 0xf5, 0xf0],
    [0xfe, 0xe0, 0xd2],
    [0xfc, 0xbb, 0xa1],
    [0xfc, 0x92, 0x72],
    [0xfb, 0x6a, 0x4a],
    [0xef, 0x3b, 0x2c],
    [0xcb, 0x18, 0x1d],
    [0xa5, 0x0f, 0x15],
    [0x67, 0x00, 0x0d],
];

const GREENS: [[u8; 3]; 9] = [
    [0xf7, 0xfc, 0xf5],
    [0xe5, 0xf5, 0xe0],
    [0xc7, 0xe9, 0xc0],
    [0xa1, 0xd9, 0x9b],
    [0x74, 0xc4, 0x76],
    [0x41, 0xab, 0x5d],
    [0x23, 0x8b, 0x45],
    [0x00, 0x6d, 0x2c],
    [0x00, 0x44, 0x1b],
];

const COOLWARM: [[u8; 3]; 7] = [
    [0x3b, 0x4c, 0xc0],
    [0x6b, 0x8b, 0xd4],
    [0xb2, 0xc8, 0xdf],
    [0xf0, 0xf0, 0xf0],
    [0xfb, 0xb6, 0xac],
    [0xe6, 0x7f, 0x83],
    [0xb4, 0x04, 0x26],
];

/// A resolved color scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColorScale {
    id:      ColorScaleId,
    anchors: &'static [[u8; 3]],
}

impl ColorScale {
    pub fn new(id: ColorScaleId) -> Self {
        let anchors: &'static [[u8; 3]] = match id {
            ColorScaleId::RdYlGn   => &RD_YL_GN,
            ColorScaleId::Reds     => &REDS,
            ColorScaleId::Greens   => &GREENS,
            ColorScaleId::Coolwarm => &COOLWARM,
        };
        Self { id, anchors }
    }

    /// Resolve a scale by name (case-insensitive).  Unknown names are an
    /// error; there is no default scale to fall back to.
    pub fn by_name(name: &str) -> CoreResult<Self> {
        ColorScaleId::from_str(name).map(Self::new)
    }

    pub fn id(&self) -> ColorScaleId {
        self.id
    }

    pub fn anchors(&self) -> &'static [[u8; 3]] {
        self.anchors
    }

    /// Color at `t ∈ [0, 1]`; `t` outside is clamped.
    pub fn at(&self, t: f64) -> [u8; 3] {
        let n = self.anchors.len();
        let pos = t.clamp(0.0, 1.0) * (n - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = pos - lo as f64;
        let (a, b) = (self.anchors[lo], self.anchors[hi]);
        let mix = |i: usize| (a[i] as f64 * (1.0 - frac) + b[i] as f64 * frac).round() as u8;
        [mix(0), mix(1), mix(2)]
    }
}

impl From<ColorScaleId> for ColorScale {
    fn from(id: ColorScaleId) -> Self {
        Self::new(id)
    }
}
