//! Windowed vertex removal
//!
//! A cursor walks the sequence and looks at a circular window of three consecutive points
//! `(p1, p2, p3)`. When the active [`Strategy`] decides that `p2` is redundant it is
//! removed in place and the cursor stays put, so the point that slides into the middle slot
//! is tested against the same `p1`. Otherwise the cursor advances. A sweep ends when the
//! cursor reaches the live (shrinking) length, or as soon as the sequence is down to
//! [`MIN_POINT_COUNT`] points.

use crate::{CoordinateSequence, GeoPoint, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sequences at or below this length are never thinned further
pub const MIN_POINT_COUNT: usize = 10;

/// Number of points examined per window: previous, candidate, next
pub const WINDOW_SIZE: usize = 3;

/// Thresholds and pass counts for a thinning run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThinParams {
    /// Points closer than this (meters) to both neighbours, with the neighbours also this
    /// close to each other, are dropped.
    /// Default: 300
    pub distance_threshold_m: f64,
    /// Points that change the heading from the previous point by less than this many
    /// degrees are dropped.
    /// Default: 3
    pub bearing_threshold_deg: f64,
    /// Number of distance-based sweeps (default 5)
    pub distance_passes: usize,
    /// Number of bearing-based sweeps (default 5)
    pub bearing_passes: usize,
}

impl Default for ThinParams {
    fn default() -> Self {
        Self {
            distance_threshold_m: 300.0,
            bearing_threshold_deg: 3.0,
            distance_passes: 5,
            bearing_passes: 5,
        }
    }
}

/// Removal policy applied to each window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Collapse clusters of mutually close points
    Distance,
    /// Collapse points that do not meaningfully change direction
    Bearing,
}

impl Strategy {
    /// Whether the middle point of `window` should be removed
    #[inline]
    pub fn should_remove(self, window: [GeoPoint; WINDOW_SIZE], params: &ThinParams) -> bool {
        let [p1, p2, p3] = window;
        match self {
            Strategy::Distance => is_distance_redundant(p1, p2, p3, params.distance_threshold_m),
            Strategy::Bearing => is_bearing_redundant(p1, p2, p3, params.bearing_threshold_deg),
        }
    }
}

/// Three-way proximity test: all pairwise distances must be below the threshold
pub fn is_distance_redundant(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint, threshold_m: f64) -> bool {
    // Outer points first, it rejects most windows on long runs
    if p1.distance_to(p3) >= threshold_m {
        return false;
    }
    p1.distance_to(p2) < threshold_m && p3.distance_to(p2) < threshold_m
}

/// Heading from `p1` barely changes whether `p2` is visited or skipped
pub fn is_bearing_redundant(p1: GeoPoint, p2: GeoPoint, p3: GeoPoint, threshold_deg: f64) -> bool {
    let to_p3 = p1.bearing_to(p3);
    let to_p2 = p1.bearing_to(p2);
    bearing_difference(to_p2, to_p3) < threshold_deg
}

/// Absolute difference of two bearings, folded into [0, 180]
pub fn bearing_difference(bearing1: f64, bearing2: f64) -> f64 {
    let mut difference = bearing1 - bearing2;
    while difference < -180.0 {
        difference += 360.0;
    }
    while difference > 180.0 {
        difference -= 360.0;
    }
    difference.abs()
}

/// `end / start` as a percentage, 100 when nothing was there to begin with
#[inline]
pub fn retained_percent(start_len: usize, end_len: usize) -> f64 {
    if start_len == 0 {
        return 100.0;
    }
    end_len as f64 / start_len as f64 * 100.0
}

/// Thins one coordinate sequence it exclusively owns
#[derive(Debug, Clone)]
pub struct WindowedSmoother {
    sequence: CoordinateSequence,
    params: ThinParams,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl WindowedSmoother {
    pub fn new(sequence: CoordinateSequence, params: ThinParams) -> Self {
        Self { sequence, params }
    }

    /// Parse a coordinate string and wrap it in a smoother
    pub fn parse(text: &str, params: ThinParams) -> Result<Self> {
        Ok(Self::new(CoordinateSequence::parse(text)?, params))
    }

    #[inline]
    pub fn params(&self) -> &ThinParams {
        &self.params
    }

    #[inline]
    pub fn sequence(&self) -> &CoordinateSequence {
        &self.sequence
    }

    pub fn into_sequence(self) -> CoordinateSequence {
        self.sequence
    }

    /// Run the configured number of distance-based passes
    ///
    /// # Returns
    /// The percentage of points left relative to the start of the run
    pub fn distance_smoothing(&mut self) -> f64 {
        self.smooth(Strategy::Distance, self.params.distance_passes)
    }

    /// Run the configured number of bearing-based passes
    ///
    /// # Returns
    /// The percentage of points left relative to the start of the run
    pub fn bearing_smoothing(&mut self) -> f64 {
        self.smooth(Strategy::Bearing, self.params.bearing_passes)
    }

    /// Run `passes` independent sweeps of one strategy
    ///
    /// Every pass restarts at the first point. Extra passes can still remove points because
    /// earlier removals change which triplets end up side by side.
    pub fn smooth(&mut self, strategy: Strategy, passes: usize) -> f64 {
        let run_start_len = self.sequence.len();

        for pass in 0..passes {
            let pass_start_len = self.sequence.len();
            let removed = self.sweep(strategy);
            tracing::debug!(
                "{:?} smoothing pass #{}: removed {} points, {:.0}% left",
                strategy,
                pass,
                removed,
                retained_percent(pass_start_len, self.sequence.len())
            );
        }

        let left = retained_percent(run_start_len, self.sequence.len());
        tracing::trace!(
            "{:?} smoothing: {} -> {} points ({:.1}% left)",
            strategy,
            run_start_len,
            self.sequence.len(),
            left
        );
        left
    }

    /// One sweep over the sequence, returns the number of removed points
    pub fn sweep(&mut self, strategy: Strategy) -> usize {
        let mut removed = 0;
        // `index` mirrors the cursor position in the live sequence, `node` is its arena slot
        let mut index = 0;
        let mut node = self.sequence.head();

        while index < self.sequence.len() {
            if self.sequence.len() <= MIN_POINT_COUNT {
                break;
            }

            let middle = self.sequence.next(node);
            let last = self.sequence.next(middle);
            let window = [
                self.sequence.point(node),
                self.sequence.point(middle),
                self.sequence.point(last),
            ];

            if strategy.should_remove(window, &self.params) {
                // Removing the wrapped-around head only happens at the final index, after
                // which `index == len` and the sweep ends
                self.sequence.remove_after(node);
                removed += 1;
            } else {
                index += 1;
                node = middle;
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points spaced `step_m` meters apart heading east along the equator
    fn line_east(count: usize, step_m: f64) -> CoordinateSequence {
        let start = GeoPoint::new(0.0, 0.0);
        (0..count)
            .map(|i| start.destination(90.0, i as f64 * step_m))
            .collect::<Vec<_>>()
            .into()
    }

    /// A closed ring of `count` points around a center at `radius_m`
    fn ring(count: usize, radius_m: f64) -> CoordinateSequence {
        let center = GeoPoint::new(52.0, 5.0);
        (0..count)
            .map(|i| center.destination(i as f64 * 360.0 / count as f64, radius_m))
            .collect::<Vec<_>>()
            .into()
    }

    fn params(distance_m: f64, bearing_deg: f64, passes: usize) -> ThinParams {
        ThinParams {
            distance_threshold_m: distance_m,
            bearing_threshold_deg: bearing_deg,
            distance_passes: passes,
            bearing_passes: passes,
        }
    }

    #[test]
    fn test_bearing_difference_wraps() {
        assert_eq!(bearing_difference(10.0, 350.0), 20.0);
        assert_eq!(bearing_difference(350.0, 10.0), 20.0);
        assert_eq!(bearing_difference(90.0, 90.0), 0.0);
        assert_eq!(bearing_difference(0.0, 180.0), 180.0);
        assert_eq!(bearing_difference(45.0, 30.0), 15.0);
    }

    #[test]
    fn test_distance_predicate_needs_all_three_close() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = a.destination(90.0, 20.0);
        let c = a.destination(90.0, 40.0);
        assert!(is_distance_redundant(a, b, c, 50.0));
        assert!(!is_distance_redundant(a, b, c, 30.0));

        // Outer points close, middle point far away
        let far = a.destination(0.0, 500.0);
        assert!(!is_distance_redundant(a, far, c, 50.0));
    }

    #[test]
    fn test_bearing_predicate() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = a.destination(90.0, 1_000.0);
        let c = b.destination(91.0, 1_000.0);
        let sharp = b.destination(150.0, 1_000.0);
        assert!(is_bearing_redundant(a, b, c, 3.0));
        assert!(!is_bearing_redundant(a, b, sharp, 3.0));
    }

    #[test]
    fn test_retained_percent() {
        assert_eq!(retained_percent(0, 0), 100.0);
        assert_eq!(retained_percent(20, 10), 50.0);
        assert_eq!(retained_percent(7, 7), 100.0);
    }

    #[test]
    fn test_short_sequence_untouched() {
        let mut smoother = WindowedSmoother::new(line_east(10, 1.0), params(1e9, 360.0, 5));
        assert_eq!(smoother.distance_smoothing(), 100.0);
        assert_eq!(smoother.bearing_smoothing(), 100.0);
        assert_eq!(smoother.sequence().len(), 10);
    }

    #[test]
    fn test_empty_sequence() {
        let mut smoother = WindowedSmoother::parse("", ThinParams::default()).unwrap();
        assert_eq!(smoother.distance_smoothing(), 100.0);
        assert_eq!(smoother.bearing_smoothing(), 100.0);
        assert!(smoother.sequence().is_empty());
    }

    #[test]
    fn test_zero_threshold_removes_nothing() {
        let mut smoother = WindowedSmoother::new(line_east(50, 10.0), params(0.0, 0.0, 5));
        assert_eq!(smoother.distance_smoothing(), 100.0);
        assert_eq!(smoother.bearing_smoothing(), 100.0);
        assert_eq!(smoother.sequence().len(), 50);
    }

    #[test]
    fn test_infinite_threshold_stops_at_floor() {
        let original = line_east(100, 10.0);
        let mut smoother = WindowedSmoother::new(original.clone(), params(f64::INFINITY, 0.0, 1));
        let left = smoother.distance_smoothing();

        assert_eq!(smoother.sequence().len(), MIN_POINT_COUNT);
        assert_eq!(left, 10.0);

        // The cursor never advances, so the first point is kept and the tail survives
        let kept = smoother.sequence().to_vec();
        let all = original.to_vec();
        assert_eq!(kept[0], all[0]);
        assert_eq!(kept[1..], all[91..]);
    }

    #[test]
    fn test_floor_invariant_across_configurations() {
        for count in [11, 12, 25, 200] {
            for distance in [1.0, 50.0, 1e7] {
                for passes in [1, 3, 10] {
                    let mut smoother =
                        WindowedSmoother::new(ring(count, 200.0), params(distance, 45.0, passes));
                    smoother.distance_smoothing();
                    smoother.bearing_smoothing();
                    assert!(smoother.sequence().len() >= MIN_POINT_COUNT);
                }
            }
        }
    }

    #[test]
    fn test_bearing_smoothing_collapses_straight_runs() {
        // Three long straight edges; only the corners change direction
        let start = GeoPoint::new(10.0, 10.0);
        let mut points = Vec::new();
        let mut current = start;
        for heading in [90.0, 210.0, 330.0] {
            for _ in 0..20 {
                points.push(current);
                current = current.destination(heading, 500.0);
            }
        }

        let mut smoother = WindowedSmoother::new(points.into(), params(0.0, 3.0, 5));
        let left = smoother.bearing_smoothing();
        assert!(left < 100.0);
        assert!(smoother.sequence().len() >= MIN_POINT_COUNT);
        assert!(smoother.sequence().len() < 60);
    }

    #[test]
    fn test_extra_pass_after_convergence_is_noop() {
        let mut smoother = WindowedSmoother::new(ring(120, 100.0), params(30.0, 10.0, 1));

        // Sweep until nothing changes
        while smoother.sweep(Strategy::Distance) > 0 {}
        let converged = smoother.sequence().to_vec();

        assert_eq!(smoother.sweep(Strategy::Distance), 0);
        assert_eq!(smoother.smooth(Strategy::Distance, 3), 100.0);
        assert_eq!(smoother.sequence().to_vec(), converged);
    }

    #[test]
    fn test_cluster_collapses_far_point_survives() {
        let mut text = (0..12)
            .map(|i| format!("{},0", i as f64 * 0.0001))
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(" 1,1");

        let mut smoother = WindowedSmoother::parse(&text, params(50.0, 0.0, 1)).unwrap();
        assert_eq!(smoother.sequence().len(), 13);
        smoother.distance_smoothing();

        let points = smoother.sequence().to_vec();
        assert_eq!(points.len(), MIN_POINT_COUNT);
        assert_eq!(points[0], GeoPoint::new(0.0, 0.0));
        assert_eq!(*points.last().unwrap(), GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn test_removal_does_not_advance_cursor() {
        // p0 p1 p2 clustered, then widely spaced points: both p1 and p2 get removed while
        // the cursor stays on p0
        let start = GeoPoint::new(0.0, 0.0);
        let mut points = vec![
            start,
            start.destination(90.0, 5.0),
            start.destination(90.0, 10.0),
            start.destination(90.0, 15.0),
        ];
        for i in 1..=10 {
            points.push(start.destination(90.0, 15.0 + i as f64 * 1_000.0));
        }

        let mut smoother = WindowedSmoother::new(points.clone().into(), params(40.0, 0.0, 1));
        let removed = smoother.sweep(Strategy::Distance);

        assert_eq!(removed, 2);
        let kept = smoother.sequence().to_vec();
        assert_eq!(kept[0], points[0]);
        assert_eq!(kept[1], points[3]);
    }

    #[test]
    fn test_sweep_wraps_around_closed_ring() {
        // p0 p1 and the last two points form one cluster across the ring seam, p2..p10 are
        // far apart. Only the windows at the end of the sweep see the cluster.
        let start = GeoPoint::new(0.0, 0.0);
        let mut points = vec![start, start.destination(90.0, 20.0)];
        for i in 1..=9 {
            points.push(start.destination(90.0, i as f64 * 5_000.0));
        }
        points.push(start.destination(270.0, 40.0));
        points.push(start.destination(270.0, 20.0));
        assert_eq!(points.len(), 13);

        let mut smoother = WindowedSmoother::new(points.clone().into(), params(300.0, 0.0, 1));
        let removed = smoother.sweep(Strategy::Distance);

        // At index 11 the window (p11, p12, p0) drops the last point, then (p11, p0, p1)
        // drops the head and the cursor is past the end
        assert_eq!(removed, 2);
        let kept = smoother.sequence().to_vec();
        assert_eq!(kept.len(), 11);
        assert!(kept.len() > MIN_POINT_COUNT);
        assert_eq!(kept[0], points[1]);
        assert_eq!(kept[..10], points[1..11]);
        assert_eq!(kept[10], points[11]);
        assert!(!kept.contains(&points[0]));
        assert!(!kept.contains(&points[12]));
    }
}
