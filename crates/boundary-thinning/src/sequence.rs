//! Coordinate sequence storage and its textual form
//!
//! The textual form is the KML convention: whitespace separated `lon,lat[,alt...]` tokens
//! with a decimal point and no digit grouping. Only the first two components are read.
//!
//! Points live in an arena that is never shifted. A circular successor table links the live
//! points in order, so removing the point after a given node is O(1) regardless of
//! sequence length.

use crate::{GeoPoint, Result, ThinError};
use std::fmt;
use std::str::FromStr;

/// Fractional digits kept when writing coordinates
pub const OUTPUT_DECIMALS: usize = 14;

/// Ordered, mutable list of points describing one boundary
#[derive(Clone, Debug, Default)]
pub struct CoordinateSequence {
    /// Every point ever parsed, in input order
    points: Vec<GeoPoint>,
    /// Arena index of the live successor of each live point (circular)
    next: Vec<usize>,
    /// Arena index of the first live point
    head: usize,
    /// Number of live points
    len: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl CoordinateSequence {
    /// Parse a coordinate string
    ///
    /// Fails on the first token that lacks a comma or whose longitude/latitude is not a
    /// finite decimal number. Bad tokens are never skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let points = text
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| parse_token(index, token))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from(points))
    }

    /// Number of live points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live points in boundary order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            node: self.head,
            remaining: self.len,
        }
    }

    /// Copy the live points into a vector
    pub fn to_vec(&self) -> Vec<GeoPoint> {
        self.iter().collect()
    }

    /// Serialize back to the coordinate string convention, rounded to 14 decimals
    pub fn to_kml_string(&self) -> String {
        self.to_string()
    }

    /// Arena index of the first live point. Meaningless when empty.
    #[inline]
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    /// Arena index of the live point following `node`, wrapping at the end
    #[inline]
    pub(crate) fn next(&self, node: usize) -> usize {
        self.next[node]
    }

    #[inline]
    pub(crate) fn point(&self, node: usize) -> GeoPoint {
        self.points[node]
    }

    /// Unlink the live point following `node` and return it
    pub(crate) fn remove_after(&mut self, node: usize) -> GeoPoint {
        debug_assert!(self.len > 0);

        let removed = self.next[node];
        self.next[node] = self.next[removed];
        if removed == self.head {
            self.head = self.next[removed];
        }
        self.len -= 1;

        self.points[removed]
    }
}

impl From<Vec<GeoPoint>> for CoordinateSequence {
    fn from(points: Vec<GeoPoint>) -> Self {
        let len = points.len();
        let next = (0..len).map(|i| (i + 1) % len).collect();
        Self {
            points,
            next,
            head: 0,
            len,
        }
    }
}

impl FromStr for CoordinateSequence {
    type Err = ThinError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CoordinateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(
                f,
                "{},{}",
                format_coordinate(point.lon()),
                format_coordinate(point.lat())
            )?;
        }
        Ok(())
    }
}

/// Iterator over the live points of a [`CoordinateSequence`]
pub struct Iter<'a> {
    sequence: &'a CoordinateSequence,
    node: usize,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = GeoPoint;

    fn next(&mut self) -> Option<GeoPoint> {
        if self.remaining == 0 {
            return None;
        }
        let point = self.sequence.points[self.node];
        self.node = self.sequence.next[self.node];
        self.remaining -= 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

fn parse_token(index: usize, token: &str) -> Result<GeoPoint> {
    let mut parts = token.split(',');
    let lon = parts.next().unwrap_or_default();
    let lat = parts.next().ok_or_else(|| ThinError::MissingSeparator {
        index,
        token: token.to_string(),
    })?;

    let lon = parse_number(index, token, lon)?;
    let lat = parse_number(index, token, lat)?;
    Ok(GeoPoint::new(lat, lon))
}

fn parse_number(index: usize, token: &str, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ThinError::InvalidNumber {
            index,
            token: token.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Round to [`OUTPUT_DECIMALS`] and write the shortest text that reads back the same
fn format_coordinate(value: f64) -> String {
    let rounded = format!("{value:.prec$}", prec = OUTPUT_DECIMALS)
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 {
        // Also covers -0
        return "0".to_string();
    }
    rounded.to_string()
}
