use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// An angle stored in degrees.
///
/// KiCAD files store rotations in degrees, so degrees are the canonical
/// representation and radians are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { degrees: 0.0 };

    pub fn from_degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    pub fn from_radians(radians: f64) -> Self {
        Self {
            degrees: radians.to_degrees(),
        }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Normalizes into the range `[0, 360)`.
    pub fn normalized(&self) -> Angle {
        let mut d = self.degrees % 360.0;
        if d < 0.0 {
            d += 360.0;
        }
        Angle::from_degrees(d)
    }

    /// Normalizes into the range `(-180, 180]`.
    pub fn normalized_180(&self) -> Angle {
        let mut d = self.normalized().degrees;
        if d > 180.0 {
            d -= 360.0;
        }
        Angle::from_degrees(d)
    }

    /// Snaps to the nearest multiple of 90 degrees, returned as one of
    /// 0, 90, 180 or 270.
    ///
    /// Label and pin layout only distinguishes the four cardinal
    /// orientations; anything else in a document is rounded.
    pub fn quantized_quadrant(&self) -> u16 {
        let d = self.normalized().degrees;
        (((d / 90.0).round() as i32 % 4 + 4) % 4 * 90) as u16
    }

    pub fn sin(&self) -> f64 {
        self.radians().sin()
    }

    pub fn cos(&self) -> f64 {
        self.radians().cos()
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees + rhs.degrees)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.degrees - rhs.degrees)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle::from_degrees(-self.degrees)
    }
}
