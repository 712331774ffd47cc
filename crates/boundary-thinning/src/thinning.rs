//! Text in, text out entry point

use crate::{Result, ThinParams, WindowedSmoother};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of thinning one coordinate string
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Thinned {
    /// Remaining coordinates in the input convention
    pub coordinates: String,
    /// Points left after the distance run, relative to the input
    pub distance_retained_pct: f64,
    /// Points left after the bearing run, relative to the distance run's output
    pub bearing_retained_pct: f64,
    /// Number of parsed input points
    pub original_points: usize,
    /// Number of points written back
    pub retained_points: usize,
}

/// Thin a coordinate string: distance-based passes first, then bearing-based passes
///
/// # Errors
/// Returns a parse error if any coordinate token is malformed; nothing is thinned then.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn thin(coordinate_text: &str, params: &ThinParams) -> Result<Thinned> {
    let mut smoother = WindowedSmoother::parse(coordinate_text, params.clone())?;
    let original_points = smoother.sequence().len();

    let distance_retained_pct = smoother.distance_smoothing();
    let bearing_retained_pct = smoother.bearing_smoothing();

    let sequence = smoother.into_sequence();
    Ok(Thinned {
        coordinates: sequence.to_kml_string(),
        distance_retained_pct,
        bearing_retained_pct,
        original_points,
        retained_points: sequence.len(),
    })
}
