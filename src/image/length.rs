//! English Metric Units, the length unit of DrawingML extents.

use std::fmt;

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;
/// EMUs per centimeter.
pub const EMU_PER_CM: i64 = 360_000;
/// EMUs per typographic point.
pub const EMU_PER_PT: i64 = 12_700;

/// A length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Emu(pub i64);

impl Emu {
    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn from_cm(cm: f64) -> Self {
        Emu((cm * EMU_PER_CM as f64).round() as i64)
    }

    pub fn from_pt(pt: f64) -> Self {
        Emu((pt * EMU_PER_PT as f64).round() as i64)
    }

    /// Physical length of `px` pixels at `dpi`; a zero dpi counts as 72.
    pub fn from_px(px: u32, dpi: u32) -> Self {
        let dpi = if dpi == 0 { 72 } else { dpi };
        Emu(i64::from(px) * EMU_PER_INCH / i64::from(dpi))
    }

    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    pub fn cm(self) -> f64 {
        self.0 as f64 / EMU_PER_CM as f64
    }

    pub fn pt(self) -> f64 {
        self.0 as f64 / EMU_PER_PT as f64
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} EMU", self.0)
    }
}

impl From<i64> for Emu {
    fn from(value: i64) -> Self {
        Emu(value)
    }
}
