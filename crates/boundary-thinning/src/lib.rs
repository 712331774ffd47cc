//! Boundary Thinning - Vertex reduction for geographic outlines
//!
//! This library reduces the number of vertices in polygon and polyline boundaries given as
//! KML-style coordinate strings while keeping their visual shape. It works directly on
//! latitude/longitude degrees over a spherical Earth model.
//!
//! # Architecture
//!
//! - **[`geodesy`]**: Haversine distance, forward azimuth and destination projection
//! - **[`GeoPoint`]**: Latitude/longitude point with radian accessors
//! - **[`CoordinateSequence`]**: Arena-backed point list parsed from and written to text
//! - **[`WindowedSmoother`]**: Circular 3-point window removal with a [`Strategy`] per run
//! - **[`thin`]**: Parse, run distance then bearing passes, serialize
//!
//! # Example
//!
//! ```rust
//! use boundary_thinning::{ThinParams, thin};
//!
//! let result = thin("5.1,52.1 5.2,52.2 5.3,52.1", &ThinParams::default())?;
//! // Too short to thin
//! assert_eq!(result.retained_points, 3);
//! # Ok::<(), boundary_thinning::ThinError>(())
//! ```

pub mod geodesy;
mod point;
mod sequence;
mod smoother;
mod thinning;

// Public API exports
pub use point::GeoPoint;
pub use sequence::{CoordinateSequence, Iter, OUTPUT_DECIMALS};
pub use smoother::{
    MIN_POINT_COUNT, Strategy, ThinParams, WINDOW_SIZE, WindowedSmoother, bearing_difference,
    is_bearing_redundant, is_distance_redundant, retained_percent,
};
pub use thinning::{Thinned, thin};

/// Error types for coordinate parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThinError {
    #[error("coordinate token #{index} {token:?} has no ',' between longitude and latitude")]
    MissingSeparator { index: usize, token: String },

    #[error("coordinate token #{index} {token:?} has an invalid number: {value:?}")]
    InvalidNumber {
        index: usize,
        token: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, ThinError>;
