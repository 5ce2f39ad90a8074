//! Unit conversion between document-internal units and millimeters.
//!
//! The document models in this workspace are millimeter-native; nothing
//! downstream of the parser converts. These helpers exist for the parser
//! boundary, where board files carry coordinates scaled by 1e4 into
//! integer-friendly internal units and legacy schematic fields carry
//! mils.

/// Internal units per millimeter on board-side paths.
pub const IU_PER_MM: f64 = 10_000.0;

/// Converts board internal units to millimeters.
pub fn iu_to_mm(iu: f64) -> f64 {
    iu / IU_PER_MM
}

/// Converts millimeters to board internal units.
pub fn mm_to_iu(mm: f64) -> f64 {
    mm * IU_PER_MM
}

/// Converts a mil (1/1000 inch) value to millimeters. Legacy schematic
/// fields occasionally carry mils.
pub fn mil_to_mm(mil: f64) -> f64 {
    mil * 0.0254
}
