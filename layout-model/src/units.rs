//! Length-unit conversions between the formats the pipeline touches.

/// Twentieths of a point per centimeter (1440 twips to the inch).
pub const TWIPS_PER_CM: f64 = 1440.0 / 2.54;

/// Twips to centimeters, rounded to two decimals the way the template
/// snapshot stores them.
pub fn twips_to_cm(twips: f64) -> f64 {
    round2(twips / TWIPS_PER_CM)
}

pub fn cm_to_twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

/// Run sizes are stored as half-points in the package.
pub fn half_points_to_pt(half: f64) -> f32 {
    (half / 2.0) as f32
}

pub fn pt_to_half_points(pt: f32) -> i64 {
    (f64::from(pt) * 2.0).round() as i64
}

/// Dxa (twentieths of a point) to points.
pub fn dxa_to_pt(dxa: f64) -> f64 {
    dxa / 20.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
