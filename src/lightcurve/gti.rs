//! lightcurve::gti — good-time intervals as an explicit interval-set type.
//!
//! Purpose
//! -------
//! Model Good Time Intervals (GTIs) — the time ranges during which a
//! detector was actually collecting valid data — as a validated, sorted,
//! disjoint set of half-open `[start, end)` intervals, with the small
//! algebra the binned-series layer needs: bin-validity masking, interval
//! intersection and union, and GTI-aware chunk-window generation.
//!
//! Key behaviors
//! -------------
//! - [`GoodTimeIntervals::new`] validates ordering and disjointness once;
//!   every other operation can then assume a canonical interval set.
//! - [`GoodTimeIntervals::mask`] decides, per time bin, whether the whole
//!   bin (midpoint ± dt/2) lies inside some interval.
//! - [`GoodTimeIntervals::intersect`] and [`GoodTimeIntervals::union`]
//!   implement the interval-set algebra used by series arithmetic and
//!   joining.
//! - [`GoodTimeIntervals::bin_intervals`] produces index windows of a
//!   fixed duration that fit entirely inside a single interval, for
//!   chunk-by-chunk analysis.
//!
//! Invariants & assumptions
//! ------------------------
//! - Intervals are finite, satisfy `start < end`, are sorted by `start`,
//!   and are pairwise disjoint. The set is never empty.
//! - All operations are pure; none mutate `self`.
//!
//! Conventions
//! -----------
//! - Intervals are half-open `[start, end)`. Masking uses a relative
//!   epsilon of `dt * 1e-9` so that bins flush against an interval edge
//!   are not lost to floating-point noise.
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation, edge semantics of `mask`, intersection
//!   and union on overlapping and disjoint inputs, and chunk-window
//!   generation with full and fractional steps.

use crate::lightcurve::errors::{LcError, LcResult};

/// Relative tolerance applied at interval edges during masking.
const EDGE_EPS: f64 = 1e-9;

/// GoodTimeIntervals — sorted, disjoint set of `[start, end)` intervals.
///
/// Purpose
/// -------
/// Own the validity intervals of a binned series and expose containment,
/// intersection, union, and windowing operations over them.
///
/// Invariants
/// ----------
/// - At least one interval; all bounds finite.
/// - `start < end` for every interval.
/// - Intervals sorted by `start` and pairwise disjoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodTimeIntervals {
    intervals: Vec<(f64, f64)>,
}

impl GoodTimeIntervals {
    /// Construct a validated interval set.
    ///
    /// Parameters
    /// ----------
    /// - `intervals`: `Vec<(f64, f64)>`
    ///   Candidate `[start, end)` pairs. Must be non-empty, finite,
    ///   individually non-empty (`start < end`), sorted by `start`, and
    ///   pairwise disjoint.
    ///
    /// Returns
    /// -------
    /// `LcResult<GoodTimeIntervals>`
    ///   - `Ok` with the canonical interval set.
    ///   - `Err(LcError::InvalidGti)` identifying the first offending
    ///     interval (or `(NaN, NaN)` for an empty list).
    pub fn new(intervals: Vec<(f64, f64)>) -> LcResult<Self> {
        if intervals.is_empty() {
            return Err(LcError::InvalidGti { start: f64::NAN, end: f64::NAN });
        }

        for &(start, end) in &intervals {
            if !start.is_finite() || !end.is_finite() || start >= end {
                return Err(LcError::InvalidGti { start, end });
            }
        }

        for window in intervals.windows(2) {
            let (_, prev_end) = window[0];
            let (next_start, next_end) = window[1];
            if next_start < prev_end {
                return Err(LcError::InvalidGti { start: next_start, end: next_end });
            }
        }

        Ok(GoodTimeIntervals { intervals })
    }

    /// Convenience constructor for a single `[start, end)` interval.
    pub fn from_span(start: f64, end: f64) -> LcResult<Self> {
        GoodTimeIntervals::new(vec![(start, end)])
    }

    /// The underlying intervals, sorted and disjoint.
    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    /// Start of the earliest interval.
    pub fn start(&self) -> f64 {
        self.intervals[0].0
    }

    /// End of the latest interval.
    pub fn end(&self) -> f64 {
        self.intervals[self.intervals.len() - 1].1
    }

    /// Total extent `end() - start()`, gaps included.
    pub fn span(&self) -> f64 {
        self.end() - self.start()
    }

    /// Per-bin validity mask.
    ///
    /// Parameters
    /// ----------
    /// - `times`: `&[f64]`
    ///   Bin midpoints.
    /// - `dt`: `f64`
    ///   Bin width; each bin extends `dt / 2` on either side of its
    ///   midpoint.
    ///
    /// Returns
    /// -------
    /// `Vec<bool>`
    ///   `true` where the whole bin `[t - dt/2, t + dt/2]` lies inside
    ///   some interval, up to an epsilon of `dt * 1e-9` at the edges.
    pub fn mask(&self, times: &[f64], dt: f64) -> Vec<bool> {
        let half = dt / 2.0;
        let eps = dt.abs() * EDGE_EPS;
        times
            .iter()
            .map(|&t| {
                self.intervals
                    .iter()
                    .any(|&(s, e)| s - eps <= t - half && t + half <= e + eps)
            })
            .collect()
    }

    /// Intersection of two interval sets.
    ///
    /// Returns
    /// -------
    /// `LcResult<GoodTimeIntervals>`
    ///   - `Ok` with the (non-empty) set of overlaps.
    ///   - `Err(LcError::EmptySelection)` when the sets do not overlap at
    ///     all, since an empty interval set cannot validate a series.
    pub fn intersect(&self, other: &GoodTimeIntervals) -> LcResult<Self> {
        let mut crossed: Vec<(f64, f64)> = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < self.intervals.len() && j < other.intervals.len() {
            let (a_start, a_end) = self.intervals[i];
            let (b_start, b_end) = other.intervals[j];
            let lo = a_start.max(b_start);
            let hi = a_end.min(b_end);
            if lo < hi {
                crossed.push((lo, hi));
            }
            if a_end <= b_end {
                i += 1;
            } else {
                j += 1;
            }
        }

        if crossed.is_empty() {
            return Err(LcError::EmptySelection);
        }
        GoodTimeIntervals::new(crossed)
    }

    /// Union of two interval sets, merging overlapping or touching
    /// intervals into maximal ones.
    pub fn union(&self, other: &GoodTimeIntervals) -> Self {
        let mut all: Vec<(f64, f64)> =
            self.intervals.iter().chain(other.intervals.iter()).copied().collect();
        all.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(all.len());
        for (start, end) in all {
            match merged.last_mut() {
                Some((_, prev_end)) if start <= *prev_end => {
                    *prev_end = prev_end.max(end);
                }
                _ => merged.push((start, end)),
            }
        }

        GoodTimeIntervals { intervals: merged }
    }

    /// Index windows of duration `chunk_length` fitting inside the
    /// intervals.
    ///
    /// Parameters
    /// ----------
    /// - `times`: `&[f64]`
    ///   Sorted bin midpoints of the series being chunked.
    /// - `dt`: `f64`
    ///   Bin width of the series (used only for edge tolerance).
    /// - `chunk_length`: `f64`
    ///   Window duration. Windows that would cross an interval boundary
    ///   are dropped, as are trailing remainders.
    /// - `fraction_step`: `f64`
    ///   Step between consecutive window starts as a fraction of
    ///   `chunk_length` (1.0 for contiguous windows, 0.5 for half-
    ///   overlapping ones).
    ///
    /// Returns
    /// -------
    /// `LcResult<(Vec<usize>, Vec<usize>)>`
    ///   Parallel start (inclusive) and stop (exclusive) indices into
    ///   `times` for every window holding at least two bins.
    ///
    /// Errors
    /// ------
    /// - `LcError::InvalidResolution` when `chunk_length` is non-positive
    ///   or non-finite.
    /// - `LcError::InvalidChunkStep` when `fraction_step` is non-positive
    ///   or non-finite; either condition would stall the window walk.
    pub fn bin_intervals(
        &self, times: &[f64], dt: f64, chunk_length: f64, fraction_step: f64,
    ) -> LcResult<(Vec<usize>, Vec<usize>)> {
        if !chunk_length.is_finite() || chunk_length <= 0.0 {
            return Err(LcError::InvalidResolution(chunk_length));
        }
        if !fraction_step.is_finite() || fraction_step <= 0.0 {
            return Err(LcError::InvalidChunkStep(fraction_step));
        }

        let eps = dt.abs() * EDGE_EPS;
        let step = chunk_length * fraction_step;
        let mut starts: Vec<usize> = Vec::new();
        let mut stops: Vec<usize> = Vec::new();

        for &(seg_start, seg_end) in &self.intervals {
            let mut window_start = seg_start;
            while window_start + chunk_length <= seg_end + eps {
                let window_end = window_start + chunk_length;
                let lo = times.partition_point(|&t| t < window_start - eps);
                let hi = times.partition_point(|&t| t < window_end - eps);
                // Windows with fewer than two bins cannot form a series.
                if hi - lo >= 2 {
                    starts.push(lo);
                    stops.push(hi);
                }
                window_start += step;
            }
        }

        Ok((starts, stops))
    }

    /// The same intervals shifted rigidly by `delta`.
    pub fn shifted(&self, delta: f64) -> Self {
        GoodTimeIntervals {
            intervals: self.intervals.iter().map(|&(s, e)| (s + delta, e + delta)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation of ordering, disjointness, and emptiness in `new`.
    // - Edge semantics of `mask` (bins flush with interval edges, bins
    //   straddling a gap).
    // - Intersection and union on overlapping, nested, and disjoint sets.
    // - Chunk-window generation with full and fractional steps.
    //
    // They intentionally DO NOT cover:
    // - Interaction with `BinnedSeries`; that lives in series tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `new` accepts a sorted disjoint set and rejects
    // inverted, overlapping, and empty inputs.
    //
    // Given
    // -----
    // - A valid set [[0, 10], [20, 30]].
    // - An inverted interval [5, 1].
    // - An overlapping pair [[0, 10], [5, 15]].
    // - An empty list.
    //
    // Expect
    // ------
    // - `Ok` for the valid set, `Err(InvalidGti)` otherwise.
    fn good_time_intervals_new_validates_ordering_and_disjointness() {
        // Arrange & Act & Assert
        assert!(GoodTimeIntervals::new(vec![(0.0, 10.0), (20.0, 30.0)]).is_ok());

        match GoodTimeIntervals::new(vec![(5.0, 1.0)]) {
            Err(LcError::InvalidGti { start, end }) => assert_eq!((start, end), (5.0, 1.0)),
            other => panic!("expected InvalidGti for inverted interval, got {other:?}"),
        }

        assert!(GoodTimeIntervals::new(vec![(0.0, 10.0), (5.0, 15.0)]).is_err());
        assert!(GoodTimeIntervals::new(Vec::new()).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Check that `mask` keeps bins fully inside an interval, keeps bins
    // flush with its edges, and drops bins straddling a gap.
    //
    // Given
    // -----
    // - Intervals [[0, 10], [20, 30]], dt = 2.
    // - Midpoints 1 (flush with the left edge), 5 (interior), 9 (flush
    //   with the right edge), 15 (in the gap), 19.5 (straddles 20), and
    //   21 (flush inside the second interval).
    //
    // Expect
    // ------
    // - [true, true, true, false, false, true].
    fn good_time_intervals_mask_respects_bin_extent() {
        // Arrange
        let gti = GoodTimeIntervals::new(vec![(0.0, 10.0), (20.0, 30.0)]).unwrap();
        let times = [1.0, 5.0, 9.0, 15.0, 19.5, 21.0];

        // Act
        let mask = gti.mask(&times, 2.0);

        // Assert
        assert_eq!(mask, vec![true, true, true, false, false, true]);
    }

    #[test]
    // Purpose
    // -------
    // Verify intersection of overlapping sets and the error on disjoint
    // sets.
    //
    // Given
    // -----
    // - A = [[0, 10], [20, 30]], B = [[5, 25]].
    // - C = [[100, 200]] disjoint from A.
    //
    // Expect
    // ------
    // - A ∩ B = [[5, 10], [20, 25]].
    // - A ∩ C = `Err(EmptySelection)`.
    fn good_time_intervals_intersect_crosses_interval_sets() {
        // Arrange
        let a = GoodTimeIntervals::new(vec![(0.0, 10.0), (20.0, 30.0)]).unwrap();
        let b = GoodTimeIntervals::from_span(5.0, 25.0).unwrap();
        let c = GoodTimeIntervals::from_span(100.0, 200.0).unwrap();

        // Act
        let crossed = a.intersect(&b).expect("overlapping sets should intersect");

        // Assert
        assert_eq!(crossed.intervals(), &[(5.0, 10.0), (20.0, 25.0)]);
        match a.intersect(&c) {
            Err(LcError::EmptySelection) => (),
            other => panic!("expected EmptySelection for disjoint sets, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that union merges overlapping intervals and keeps disjoint
    // ones separate.
    //
    // Given
    // -----
    // - A = [[0, 10]], B = [[5, 15], [40, 50]].
    //
    // Expect
    // ------
    // - A ∪ B = [[0, 15], [40, 50]].
    fn good_time_intervals_union_merges_overlaps() {
        // Arrange
        let a = GoodTimeIntervals::from_span(0.0, 10.0).unwrap();
        let b = GoodTimeIntervals::new(vec![(5.0, 15.0), (40.0, 50.0)]).unwrap();

        // Act
        let joined = a.union(&b);

        // Assert
        assert_eq!(joined.intervals(), &[(0.0, 15.0), (40.0, 50.0)]);
    }

    #[test]
    // Purpose
    // -------
    // Check chunk-window generation: contiguous windows tile an interval,
    // the trailing remainder is dropped, and a fractional step yields
    // overlapping windows.
    //
    // Given
    // -----
    // - Interval [-0.5, 9.5], midpoints 0..=9 (dt = 1).
    // - chunk_length = 4, fraction_step = 1.0, then 0.5.
    //
    // Expect
    // ------
    // - Full step: windows [0, 4) and [4, 8); the 2-bin remainder is
    //   dropped.
    // - Half step: window starts advance by 2 bins.
    fn good_time_intervals_bin_intervals_tiles_and_drops_remainder() {
        // Arrange
        let gti = GoodTimeIntervals::from_span(-0.5, 9.5).unwrap();
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();

        // Act
        let (starts, stops) =
            gti.bin_intervals(&times, 1.0, 4.0, 1.0).expect("valid windowing parameters");
        let (half_starts, _) =
            gti.bin_intervals(&times, 1.0, 4.0, 0.5).expect("valid windowing parameters");

        // Assert
        assert_eq!(starts, vec![0, 4]);
        assert_eq!(stops, vec![4, 8]);
        assert_eq!(half_starts, vec![0, 2, 4, 6]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that degenerate windowing parameters are rejected up front
    // instead of stalling the window walk: a non-positive chunk duration
    // or step fraction would leave `window_start` fixed forever.
    //
    // Given
    // -----
    // - Interval [-0.5, 9.5], midpoints 0..=9 (dt = 1).
    // - chunk_length ∈ {0, -4, NaN} with fraction_step = 1, and
    //   chunk_length = 4 with fraction_step ∈ {0, -0.5}.
    //
    // Expect
    // ------
    // - `Err(InvalidResolution)` for the bad durations and
    //   `Err(InvalidChunkStep)` for the bad step fractions, all returned
    //   immediately.
    fn good_time_intervals_bin_intervals_rejects_degenerate_parameters() {
        // Arrange
        let gti = GoodTimeIntervals::from_span(-0.5, 9.5).unwrap();
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();

        // Act & Assert
        for bad_length in [0.0, -4.0, f64::NAN] {
            match gti.bin_intervals(&times, 1.0, bad_length, 1.0) {
                Err(LcError::InvalidResolution(_)) => (),
                other => panic!("expected InvalidResolution for chunk_length {bad_length}, got {other:?}"),
            }
        }
        for bad_step in [0.0, -0.5] {
            match gti.bin_intervals(&times, 1.0, 4.0, bad_step) {
                Err(LcError::InvalidChunkStep(fraction)) => assert_eq!(fraction, bad_step),
                other => panic!("expected InvalidChunkStep for fraction {bad_step}, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `shifted` translates every interval rigidly.
    //
    // Given
    // -----
    // - Intervals [[0, 10], [20, 30]] shifted by +5.
    //
    // Expect
    // ------
    // - [[5, 15], [25, 35]].
    fn good_time_intervals_shifted_translates_all_intervals() {
        // Arrange
        let gti = GoodTimeIntervals::new(vec![(0.0, 10.0), (20.0, 30.0)]).unwrap();

        // Act
        let moved = gti.shifted(5.0);

        // Assert
        assert_eq!(moved.intervals(), &[(5.0, 15.0), (25.0, 35.0)]);
    }
}
