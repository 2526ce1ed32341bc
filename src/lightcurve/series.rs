//! lightcurve::series — binned light curves from counts or event times.
//!
//! Purpose
//! -------
//! Implement [`BinnedSeries`], the fixed-resolution count/rate series at
//! the heart of the crate: construction from per-bin values or from raw
//! photon arrival times, GTI-aware filtering, Poisson error derivation,
//! and the transformation algebra (arithmetic, truncation, joining,
//! splitting, rebinning, sorting, chunked analysis).
//!
//! Key behaviors
//! -------------
//! - [`BinnedSeries::new`] validates raw inputs, derives `dt`, bin edges,
//!   `tstart`/`tseg`, per-bin errors, and applies the good-time-interval
//!   mask before the series is ever exposed: a constructed series only
//!   contains GTI-valid bins.
//! - [`BinnedSeries::from_arrival_times`] bins an unordered sequence of
//!   arrival times into half-open `[tstart, tend)` bins at resolution
//!   `dt`, discarding overflow beyond the last whole bin.
//! - Every transformation returns a new instance; nothing mutates in
//!   place.
//! - Non-fatal conditions (unordered input, non-uniform bin widths,
//!   mismatched error distributions, overlapping joins) are reported via
//!   `log::warn!` and processing continues with the documented fallback.
//!
//! Invariants & assumptions
//! ------------------------
//! - `time`, `counts`, and `counts_err` are parallel, finite, and at
//!   least two bins long.
//! - `counts = countrate × dt` exactly for count-valued construction.
//! - Every bin midpoint ± `dt/2` lies inside some good-time interval.
//!
//! Conventions
//! -----------
//! - `time` holds bin midpoints; `bin_lo`/`bin_hi` the edges.
//! - Bin membership for event binning is half-open `[lo, hi)`.
//! - Error distributions follow [`ErrorDistribution`]; only Poisson
//!   carries derived uncertainties, the others zero them with a warning.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction invariants, the error-distribution
//!   branches, the arithmetic identities, truncation/join/split/rebin
//!   semantics, both event-binning strategies, and chunked analysis.

use std::collections::HashMap;
use std::str::FromStr;

use log::warn;
use ndarray::Array1;

use crate::lightcurve::errors::{LcError, LcResult};
use crate::lightcurve::gti::GoodTimeIntervals;
use crate::lightcurve::poisson::poisson_symmetrical_errors;
use crate::lightcurve::validation::validate_series;

/// Relative tolerance for approximate array equality (`allclose`).
const REL_TOL: f64 = 1e-5;
/// Absolute tolerance for approximate array equality (`allclose`).
const ABS_TOL: f64 = 1e-8;

/// ErrorDistribution — statistical model for per-bin uncertainties.
///
/// Purpose
/// -------
/// Select how uncertainties are derived when none are supplied and how
/// they are combined when two series are composed.
///
/// Variants
/// --------
/// - `Poisson`
///   Derive symmetric Poisson confidence-interval errors from the
///   counts; combine in quadrature.
/// - `Gauss`
///   Recognized but not yet backed by a derivation: errors are zeroed
///   with a warning when none are supplied.
/// - `None`
///   No statistical assumption; errors are zeroed with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDistribution {
    Poisson,
    Gauss,
    None,
}

impl ErrorDistribution {
    /// Keyword form of the distribution, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorDistribution::Poisson => "poisson",
            ErrorDistribution::Gauss => "gauss",
            ErrorDistribution::None => "none",
        }
    }
}

impl FromStr for ErrorDistribution {
    type Err = LcError;

    fn from_str(s: &str) -> LcResult<Self> {
        match s.to_lowercase().as_str() {
            "poisson" => Ok(ErrorDistribution::Poisson),
            "gauss" => Ok(ErrorDistribution::Gauss),
            "none" => Ok(ErrorDistribution::None),
            other => Err(LcError::UnknownErrDist(other.to_string())),
        }
    }
}

/// BinningStrategy — how arrival times are aggregated into bins.
///
/// Both strategies produce identical counts; index arithmetic avoids the
/// edge array and is preferred for large series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinningStrategy {
    #[default]
    IndexArithmetic,
    Histogram,
}

/// RebinMethod — aggregation rule when coarsening the time resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebinMethod {
    #[default]
    Sum,
    Mean,
}

/// SeriesOptions — optional construction parameters for [`BinnedSeries`].
///
/// Fields
/// ------
/// - `err`: `Option<Array1<f64>>`
///   Explicit per-bin uncertainties; when absent they are derived from
///   `err_dist`.
/// - `input_is_counts`: `bool`
///   `true` when the value array holds counts per bin, `false` for
///   counts per second.
/// - `gti`: `Option<GoodTimeIntervals>`
///   Validity intervals; defaults to the full span of the time array.
/// - `err_dist`: [`ErrorDistribution`]
///   Statistical model for derived/combined uncertainties.
/// - `mjdref`: `f64`
///   MJD reference epoch of the time stamps.
/// - `dt`: `Option<f64>`
///   Bin width; defaults to the median of consecutive time differences.
#[derive(Debug, Clone)]
pub struct SeriesOptions {
    pub err: Option<Array1<f64>>,
    pub input_is_counts: bool,
    pub gti: Option<GoodTimeIntervals>,
    pub err_dist: ErrorDistribution,
    pub mjdref: f64,
    pub dt: Option<f64>,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        SeriesOptions {
            err: None,
            input_is_counts: true,
            gti: None,
            err_dist: ErrorDistribution::Poisson,
            mjdref: 0.0,
            dt: None,
        }
    }
}

/// BinningOptions — optional parameters for event-time binning.
///
/// Fields
/// ------
/// - `tseg`: `Option<f64>`
///   Total duration to bin; defaults to last minus first arrival. When
///   not divisible by `dt`, the trailing fractional bin is dropped.
/// - `tstart`: `Option<f64>`
///   Start of the first bin; defaults to the first arrival.
/// - `gti`: `Option<GoodTimeIntervals>`
///   Validity intervals forwarded to the series constructor.
/// - `mjdref`: `f64`
///   MJD reference epoch.
/// - `strategy`: [`BinningStrategy`]
///   Aggregation strategy; both yield identical counts.
#[derive(Debug, Clone, Default)]
pub struct BinningOptions {
    pub tseg: Option<f64>,
    pub tstart: Option<f64>,
    pub gti: Option<GoodTimeIntervals>,
    pub mjdref: f64,
    pub strategy: BinningStrategy,
}

/// BinnedSeries — a fixed-resolution, GTI-filtered light curve.
///
/// Purpose
/// -------
/// Own the binned representation of a photon counting series: midpoints,
/// counts and rates with uncertainties, bin edges, validity intervals,
/// and derived scalar statistics. All transformations return new
/// instances.
///
/// Fields (via accessors)
/// ----------------------
/// - `time`: bin midpoints with uniform spacing `dt`.
/// - `counts` / `countrate`: parallel values, `counts = countrate × dt`.
/// - `counts_err` / `countrate_err`: per-bin uncertainties.
/// - `bin_lo` / `bin_hi`: bin edges `time ∓ dt/2`.
/// - `gti`: the validity intervals the series was filtered with.
/// - `tstart`, `tseg`, `mjdref`, `meancounts`, `meanrate`, `n`.
///
/// Invariants
/// ----------
/// - `time.len() == counts.len() == counts_err.len() == n >= 2`.
/// - All stored values finite.
/// - Every bin lies inside some good-time interval.
#[derive(Debug, Clone)]
pub struct BinnedSeries {
    time: Array1<f64>,
    counts: Array1<f64>,
    counts_err: Array1<f64>,
    countrate: Array1<f64>,
    countrate_err: Array1<f64>,
    bin_lo: Array1<f64>,
    bin_hi: Array1<f64>,
    dt: f64,
    mjdref: f64,
    tstart: f64,
    tseg: f64,
    gti: GoodTimeIntervals,
    err_dist: ErrorDistribution,
    meancounts: f64,
    meanrate: f64,
    n: usize,
}

impl BinnedSeries {
    /// Construct a validated, GTI-filtered series from per-bin values.
    ///
    /// Parameters
    /// ----------
    /// - `time`: `Array1<f64>`
    ///   Bin midpoints. Finite; ordering is recommended but not required
    ///   (unordered input triggers a warning, since `dt` estimation and
    ///   all interval logic assume ordering).
    /// - `values`: `Array1<f64>`
    ///   Counts per bin (`input_is_counts = true`) or counts per second,
    ///   parallel to `time`.
    /// - `opts`: [`SeriesOptions`]
    ///   Optional error array, GTIs, error distribution, `mjdref`, `dt`.
    ///
    /// Returns
    /// -------
    /// `LcResult<BinnedSeries>`
    ///   The filtered series, or the first violated constraint.
    ///
    /// Errors
    /// ------
    /// - `LcError::NonFiniteTime` / `NonFiniteCounts` / `NonFiniteErr`,
    ///   `LengthMismatch`, `TooFewBins` from input validation.
    /// - `LcError::InvalidResolution` when a supplied `dt` is not a
    ///   positive finite number.
    /// - `LcError::InvalidGti` from GTI validation.
    /// - `LcError::EmptySelection` when fewer than two bins survive the
    ///   GTI mask.
    ///
    /// Notes
    /// -----
    /// - When `err` is omitted and `err_dist` is `Poisson`, symmetric
    ///   Poisson confidence-interval errors are derived from `values`;
    ///   `Gauss` and `None` zero the errors with a warning.
    /// - Two further warnings may fire: unordered time input (only when
    ///   `dt` must be estimated) and non-uniform bin widths inside a GTI
    ///   segment.
    pub fn new(time: Array1<f64>, values: Array1<f64>, opts: SeriesOptions) -> LcResult<Self> {
        validate_series(&time, &values, opts.err.as_ref())?;

        let err_dist = opts.err_dist;
        let raw_err = match opts.err {
            Some(err) => err,
            None => match err_dist {
                ErrorDistribution::Poisson => poisson_symmetrical_errors(&values),
                ErrorDistribution::Gauss | ErrorDistribution::None => {
                    warn!(
                        "only the poisson error distribution carries derived uncertainties; \
                         setting errors to zero for '{}'",
                        err_dist.as_str()
                    );
                    Array1::zeros(values.len())
                }
            },
        };

        let unsorted = time.windows(2).into_iter().any(|w| w[1] < w[0]);

        let dt = match opts.dt {
            Some(dt) => {
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(LcError::InvalidResolution(dt));
                }
                dt
            }
            None => {
                if unsorted {
                    warn!(
                        "the light curve is unordered; this may cause unexpected behaviour in \
                         some methods. Sort the series and check that the estimated time \
                         resolution is correct"
                    );
                }
                let mut sorted: Vec<f64> = time.to_vec();
                sorted.sort_by(f64::total_cmp);
                let diffs: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
                median(diffs)
            }
        };

        let (tmin, tmax) = if unsorted {
            let tmin = time.iter().copied().fold(f64::INFINITY, f64::min);
            let tmax = time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (tmin, tmax)
        } else {
            (time[0], time[time.len() - 1])
        };
        let tstart = tmin - 0.5 * dt;
        let tseg = tmax - tmin + dt;

        let gti = match opts.gti {
            Some(gti) => gti,
            None => GoodTimeIntervals::from_span(tstart, tstart + tseg)?,
        };

        let time_slice: Vec<f64> = time.to_vec();
        let good = gti.mask(&time_slice, dt);
        if good.iter().filter(|&&g| g).count() < 2 {
            return Err(LcError::EmptySelection);
        }

        let time = filter_by_mask(&time, &good);
        let values = filter_by_mask(&values, &good);
        let raw_err = filter_by_mask(&raw_err, &good);

        let (counts, countrate, counts_err, countrate_err) = if opts.input_is_counts {
            let countrate = &values / dt;
            let countrate_err = &raw_err / dt;
            (values, countrate, raw_err, countrate_err)
        } else {
            let counts = &values * dt;
            let counts_err = &raw_err * dt;
            (counts, values, counts_err, raw_err)
        };

        let bin_lo = &time - 0.5 * dt;
        let bin_hi = &time + 0.5 * dt;
        let n = counts.len();
        let meancounts = counts.sum() / n as f64;
        let meanrate = countrate.sum() / n as f64;

        let series = BinnedSeries {
            time,
            counts,
            counts_err,
            countrate,
            countrate_err,
            bin_lo,
            bin_hi,
            dt,
            mjdref: opts.mjdref,
            tstart,
            tseg,
            gti,
            err_dist,
            meancounts,
            meanrate,
            n,
        };

        series.warn_if_nonuniform();
        Ok(series)
    }

    /// Bin photon arrival times into a series at resolution `dt`.
    ///
    /// Parameters
    /// ----------
    /// - `toa`: `&[f64]`
    ///   Arrival times; order does not matter. Must be non-empty.
    /// - `dt`: `f64`
    ///   Bin width; must be positive and finite.
    /// - `opts`: [`BinningOptions`]
    ///   Optional duration, start time, GTIs, `mjdref`, and strategy.
    ///
    /// Returns
    /// -------
    /// `LcResult<BinnedSeries>`
    ///   Series with half-open bins `[tstart + k·dt, tstart + (k+1)·dt)`
    ///   covering `floor(tseg/dt)` whole bins; arrivals beyond the last
    ///   whole bin are discarded, as is any trailing fraction of `tseg`.
    ///
    /// Errors
    /// ------
    /// - `LcError::EmptyArrivalTimes` for an empty `toa`.
    /// - `LcError::InvalidResolution` for a non-positive or non-finite
    ///   `dt`.
    /// - `LcError::TooFewBins` when the requested span holds fewer than
    ///   two whole bins.
    pub fn from_arrival_times(toa: &[f64], dt: f64, opts: BinningOptions) -> LcResult<Self> {
        if toa.is_empty() {
            return Err(LcError::EmptyArrivalTimes);
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(LcError::InvalidResolution(dt));
        }

        let mut sorted: Vec<f64> = toa.to_vec();
        sorted.sort_by(f64::total_cmp);

        let tstart = opts.tstart.unwrap_or(sorted[0]);
        let tseg = opts.tseg.unwrap_or(sorted[sorted.len() - 1] - tstart);

        let nbins = (tseg / dt) as i64;
        if nbins < 2 {
            return Err(LcError::TooFewBins(nbins.max(0) as usize));
        }
        let nbins = nbins as usize;
        let tend = tstart + nbins as f64 * dt;

        let counts = match opts.strategy {
            BinningStrategy::IndexArithmetic => {
                let mut counts = vec![0.0_f64; nbins];
                for &t in sorted.iter().filter(|&&t| tstart <= t && t < tend) {
                    let idx = (((t - tstart) / dt) as usize).min(nbins - 1);
                    counts[idx] += 1.0;
                }
                counts
            }
            BinningStrategy::Histogram => {
                let edges: Vec<f64> = (0..=nbins).map(|k| tstart + k as f64 * dt).collect();
                let mut counts = vec![0.0_f64; nbins];
                for &t in sorted.iter().filter(|&&t| tstart <= t && t < tend) {
                    let idx = edges.partition_point(|&e| e <= t).saturating_sub(1).min(nbins - 1);
                    counts[idx] += 1.0;
                }
                counts
            }
        };

        let time: Array1<f64> =
            Array1::from_iter((0..nbins).map(|k| tstart + (k as f64 + 0.5) * dt));

        BinnedSeries::new(
            time,
            Array1::from(counts),
            SeriesOptions { gti: opts.gti, mjdref: opts.mjdref, dt: Some(dt), ..Default::default() },
        )
    }

    // ---- Accessors --------------------------------------------------------

    /// Bin midpoints.
    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    /// Counts per bin.
    pub fn counts(&self) -> &Array1<f64> {
        &self.counts
    }

    /// Uncertainties on [`counts`](Self::counts).
    pub fn counts_err(&self) -> &Array1<f64> {
        &self.counts_err
    }

    /// Counts per second.
    pub fn countrate(&self) -> &Array1<f64> {
        &self.countrate
    }

    /// Uncertainties on [`countrate`](Self::countrate).
    pub fn countrate_err(&self) -> &Array1<f64> {
        &self.countrate_err
    }

    /// Lower bin edges.
    pub fn bin_lo(&self) -> &Array1<f64> {
        &self.bin_lo
    }

    /// Upper bin edges.
    pub fn bin_hi(&self) -> &Array1<f64> {
        &self.bin_hi
    }

    /// Bin width.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// MJD reference epoch.
    pub fn mjdref(&self) -> f64 {
        self.mjdref
    }

    /// Start of the first bin.
    pub fn tstart(&self) -> f64 {
        self.tstart
    }

    /// Total duration covered by the original (pre-mask) time array.
    pub fn tseg(&self) -> f64 {
        self.tseg
    }

    /// Validity intervals the series was filtered with.
    pub fn gti(&self) -> &GoodTimeIntervals {
        &self.gti
    }

    /// Error distribution governing derived/combined uncertainties.
    pub fn err_dist(&self) -> ErrorDistribution {
        self.err_dist
    }

    /// Mean counts per bin.
    pub fn meancounts(&self) -> f64 {
        self.meancounts
    }

    /// Mean count rate.
    pub fn meanrate(&self) -> f64 {
        self.meanrate
    }

    /// Number of bins.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Count value at bin `index` (indexing by position).
    pub fn counts_at(&self, index: usize) -> f64 {
        self.counts[index]
    }

    // ---- Arithmetic composition ------------------------------------------

    /// Element-wise sum of two series on their common GTI/time grid.
    ///
    /// GTIs are intersected, the surviving time grids must agree within
    /// `dt / 100`, counts are summed, and errors combine in quadrature
    /// when both series share the same error distribution (otherwise the
    /// result's errors are zeroed with a warning).
    ///
    /// Errors
    /// ------
    /// - `LcError::MjdrefMismatch` for differing reference epochs.
    /// - `LcError::EmptySelection` for non-overlapping GTIs.
    /// - `LcError::MisalignedTimeGrids` when the filtered grids differ.
    pub fn add(&self, other: &BinnedSeries) -> LcResult<BinnedSeries> {
        self.combined_with(other, |a, b| a + b)
    }

    /// Element-wise difference of two series on their common GTI/time
    /// grid; same contract as [`add`](Self::add).
    pub fn sub(&self, other: &BinnedSeries) -> LcResult<BinnedSeries> {
        self.combined_with(other, |a, b| a - b)
    }

    /// The series with counts negated; errors and GTIs are preserved.
    pub fn negated(&self) -> LcResult<BinnedSeries> {
        BinnedSeries::new(
            self.time.clone(),
            self.counts.mapv(|c| -c),
            SeriesOptions {
                err: Some(self.counts_err.clone()),
                gti: Some(self.gti.clone()),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(self.dt),
                ..Default::default()
            },
        )
    }

    fn combined_with(
        &self, other: &BinnedSeries, op: impl Fn(f64, f64) -> f64,
    ) -> LcResult<BinnedSeries> {
        if self.mjdref != other.mjdref {
            return Err(LcError::MjdrefMismatch { left: self.mjdref, right: other.mjdref });
        }

        let common_gti = self.gti.intersect(&other.gti)?;
        let mask_self = common_gti.mask(self.time.as_slice().unwrap_or(&[]), self.dt);
        let mask_other = common_gti.mask(other.time.as_slice().unwrap_or(&[]), other.dt);

        let time_self = filter_by_mask(&self.time, &mask_self);
        let time_other = filter_by_mask(&other.time, &mask_other);
        if time_self.len() != time_other.len()
            || time_self
                .iter()
                .zip(time_other.iter())
                .any(|(a, b)| (a - b).abs() >= self.dt / 100.0)
        {
            return Err(LcError::MisalignedTimeGrids);
        }

        let counts_self = filter_by_mask(&self.counts, &mask_self);
        let counts_other = filter_by_mask(&other.counts, &mask_other);
        let new_counts =
            Array1::from_iter(counts_self.iter().zip(counts_other.iter()).map(|(&a, &b)| op(a, b)));

        let new_err = if self.err_dist != other.err_dist {
            warn!(
                "light curves have different statistics; setting the errors of the combined \
                 series to zero"
            );
            Array1::zeros(new_counts.len())
        } else {
            let err_self = filter_by_mask(&self.counts_err, &mask_self);
            let err_other = filter_by_mask(&other.counts_err, &mask_other);
            Array1::from_iter(
                err_self.iter().zip(err_other.iter()).map(|(&a, &b)| (a * a + b * b).sqrt()),
            )
        };

        BinnedSeries::new(
            time_self,
            new_counts,
            SeriesOptions {
                err: Some(new_err),
                gti: Some(common_gti),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(self.dt),
                ..Default::default()
            },
        )
    }

    // ---- Selection --------------------------------------------------------

    /// Sub-series over bin indices `start..stop` with stride `step`,
    /// with the GTIs recomputed as the intersection of the selected
    /// range (and, for `step > 1`, the selected bins) with the original
    /// intervals.
    ///
    /// Errors
    /// ------
    /// - `LcError::InvalidTruncation` for an inverted or out-of-range
    ///   selection.
    /// - `LcError::EmptySelection` when fewer than two bins are
    ///   selected.
    pub fn slice(&self, start: usize, stop: usize, step: usize) -> LcResult<BinnedSeries> {
        let stop = stop.min(self.n);
        if start >= stop || step == 0 {
            return Err(LcError::InvalidTruncation { start: start as f64, stop: stop as f64 });
        }

        let idx: Vec<usize> = (start..stop).step_by(step).collect();
        if idx.len() < 2 {
            return Err(LcError::EmptySelection);
        }

        let new_time = Array1::from_iter(idx.iter().map(|&i| self.time[i]));
        let new_counts = Array1::from_iter(idx.iter().map(|&i| self.counts[i]));
        let new_err = Array1::from_iter(idx.iter().map(|&i| self.counts_err[i]));

        let half = 0.5 * self.dt;
        let mut new_gti =
            GoodTimeIntervals::from_span(self.time[start] - half, self.time[stop - 1] + half)?;
        if step > 1 {
            let per_bin = GoodTimeIntervals::new(
                new_time.iter().map(|&t| (t - half, t + half)).collect(),
            )?;
            new_gti = new_gti.intersect(&per_bin)?;
        }
        let new_gti = self.gti.intersect(&new_gti)?;

        BinnedSeries::new(
            new_time,
            new_counts,
            SeriesOptions {
                err: Some(new_err),
                gti: Some(new_gti),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(self.dt),
                ..Default::default()
            },
        )
    }

    /// Truncate to bins `start..stop` (exclusive stop, by index).
    pub fn truncate(&self, start: usize, stop: Option<usize>) -> LcResult<BinnedSeries> {
        self.slice(start, stop.unwrap_or(self.n), 1)
    }

    /// Truncate by time values: keep bins with `start <= time < stop`.
    ///
    /// Equivalent to [`truncate`](Self::truncate) at the indices found
    /// by binary search on the time array.
    pub fn truncate_by_time(&self, start: f64, stop: Option<f64>) -> LcResult<BinnedSeries> {
        if let Some(stop_val) = stop {
            if start > stop_val {
                return Err(LcError::InvalidTruncation { start, stop: stop_val });
            }
        }

        let start_idx = self.time.as_slice().unwrap_or(&[]).partition_point(|&t| t < start);
        let stop_idx =
            stop.map(|s| self.time.as_slice().unwrap_or(&[]).partition_point(|&t| t < s));

        self.truncate(start_idx, stop_idx)
    }

    // ---- Joining and splitting -------------------------------------------

    /// Join two possibly-overlapping series into one.
    ///
    /// Counts at exactly shared timestamps are averaged (errors combine
    /// as `sqrt((e1² + e2²) / 2)`); non-overlapping stamps concatenate,
    /// earlier series first. GTIs are unioned.
    ///
    /// Any exactly shared timestamp triggers the overlap warning, even
    /// when the shared value lies outside the true overlap region; this
    /// mirrors the long-standing upstream behavior and is intentional.
    ///
    /// Errors
    /// ------
    /// - `LcError::MjdrefMismatch` for differing reference epochs.
    pub fn join(&self, other: &BinnedSeries) -> LcResult<BinnedSeries> {
        if self.mjdref != other.mjdref {
            return Err(LcError::MjdrefMismatch { left: self.mjdref, right: other.mjdref });
        }
        if self.dt != other.dt {
            warn!("the two light curves being joined have different bin widths");
        }

        let (first, second) =
            if self.tstart < other.tstart { (self, other) } else { (other, self) };

        let mut stamp_index: HashMap<u64, usize> = HashMap::with_capacity(first.n);
        for (i, &t) in first.time.iter().enumerate() {
            stamp_index.insert(t.to_bits(), i);
        }
        let overlap = second.time.iter().any(|t| stamp_index.contains_key(&t.to_bits()));

        let valid_err = self.err_dist == other.err_dist;
        if !valid_err {
            warn!("light curves being joined have different statistics; setting errors to zero");
        }

        let (new_time, new_counts, new_err) = if overlap {
            warn!(
                "the two light curves have overlapping time ranges; in the common range the \
                 resulting counts will be the average of the two. To sum instead, add the series"
            );

            let mut time: Vec<f64> = first.time.to_vec();
            let mut counts: Vec<f64> = first.counts.to_vec();
            let mut err: Vec<f64> = first.counts_err.to_vec();

            for (i, &t) in second.time.iter().enumerate() {
                match stamp_index.get(&t.to_bits()) {
                    Some(&j) => {
                        counts[j] = (counts[j] + second.counts[i]) / 2.0;
                        err[j] = ((err[j].powi(2) + second.counts_err[i].powi(2)) / 2.0).sqrt();
                    }
                    None => {
                        time.push(t);
                        counts.push(second.counts[i]);
                        err.push(second.counts_err[i]);
                    }
                }
            }
            (time, counts, err)
        } else {
            let time: Vec<f64> = first.time.iter().chain(second.time.iter()).copied().collect();
            let counts: Vec<f64> =
                first.counts.iter().chain(second.counts.iter()).copied().collect();
            let err: Vec<f64> =
                first.counts_err.iter().chain(second.counts_err.iter()).copied().collect();
            (time, counts, err)
        };

        let err = if valid_err { new_err } else { vec![0.0; new_counts.len()] };
        let gti = self.gti.union(&other.gti);

        BinnedSeries::new(
            Array1::from(new_time),
            Array1::from(new_counts),
            SeriesOptions {
                err: Some(Array1::from(err)),
                gti: Some(gti),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(self.dt),
                ..Default::default()
            },
        )
    }

    /// Split at data gaps of at least `min_gap`, returning the maximal
    /// contiguous runs holding at least `min_points` bins (runs of fewer
    /// than two bins are always dropped, since they cannot form a valid
    /// series).
    pub fn split(&self, min_gap: f64, min_points: usize) -> LcResult<Vec<BinnedSeries>> {
        let mut boundaries: Vec<usize> = vec![0];
        for (i, w) in self.time.as_slice().unwrap_or(&[]).windows(2).enumerate() {
            if w[1] - w[0] >= min_gap {
                boundaries.push(i + 1);
            }
        }
        boundaries.push(self.n);

        let mut pieces = Vec::new();
        for pair in boundaries.windows(2) {
            let (start, stop) = (pair[0], pair[1]);
            let len = stop - start;
            if len < min_points.max(2) {
                continue;
            }
            pieces.push(self.truncate(start, Some(stop))?);
        }
        Ok(pieces)
    }

    /// Split into one sub-series per good-time interval.
    ///
    /// Each returned series carries the bins whose midpoints fall in one
    /// contiguous interval, with that single interval as its GTI set.
    /// Intervals holding fewer than two bins are skipped, since they
    /// cannot form a valid series.
    pub fn split_by_gti(&self) -> LcResult<Vec<BinnedSeries>> {
        let times = self.time.as_slice().unwrap_or(&[]);
        let mut pieces = Vec::with_capacity(self.gti.intervals().len());

        for &(seg_start, seg_end) in self.gti.intervals() {
            let lo = times.partition_point(|&t| t < seg_start);
            let hi = times.partition_point(|&t| t < seg_end);
            if hi - lo < 2 {
                continue;
            }

            let idx = lo..hi;
            pieces.push(BinnedSeries::new(
                Array1::from_iter(idx.clone().map(|i| self.time[i])),
                Array1::from_iter(idx.clone().map(|i| self.counts[i])),
                SeriesOptions {
                    err: Some(Array1::from_iter(idx.map(|i| self.counts_err[i]))),
                    gti: Some(GoodTimeIntervals::from_span(seg_start, seg_end)?),
                    err_dist: self.err_dist,
                    mjdref: self.mjdref,
                    dt: Some(self.dt),
                    ..Default::default()
                },
            )?);
        }
        Ok(pieces)
    }

    // ---- Rebinning and sorting -------------------------------------------

    /// Rebin to a coarser resolution `dt_new`, honoring GTI boundaries.
    ///
    /// Within each good-time interval, windows of duration `dt_new` are
    /// laid out from the first surviving bin edge; trailing partial
    /// windows are dropped, and intervals shorter than `dt_new` are
    /// dropped whole. `Sum` adds counts with quadrature errors; `Mean`
    /// divides both by the window's bin count.
    ///
    /// Errors
    /// ------
    /// - `LcError::InvalidResolution` when `dt_new` is not strictly
    ///   coarser than the current resolution.
    /// - `LcError::EmptySelection` when fewer than two rebinned bins
    ///   remain.
    pub fn rebin(&self, dt_new: f64, method: RebinMethod) -> LcResult<BinnedSeries> {
        if !dt_new.is_finite() || dt_new < self.dt {
            return Err(LcError::InvalidResolution(dt_new));
        }

        let times = self.time.as_slice().unwrap_or(&[]);
        let mut new_time: Vec<f64> = Vec::new();
        let mut new_counts: Vec<f64> = Vec::new();
        let mut new_err: Vec<f64> = Vec::new();
        let mut kept_gti: Vec<(f64, f64)> = Vec::new();

        for &(seg_start, seg_end) in self.gti.intervals() {
            if seg_end - seg_start < dt_new {
                continue;
            }
            let lo = times.partition_point(|&t| t < seg_start);
            let hi = times.partition_point(|&t| t < seg_end);
            if hi - lo == 0 {
                continue;
            }

            let edge0 = times[lo] - 0.5 * self.dt;
            let seg_edge_end = times[hi - 1] + 0.5 * self.dt;
            let mut produced = false;
            let mut k = 0usize;
            loop {
                let w_lo = edge0 + k as f64 * dt_new;
                let w_hi = w_lo + dt_new;
                if w_hi > seg_edge_end + self.dt * 1e-9 {
                    break;
                }
                let b_lo = lo + times[lo..hi].partition_point(|&t| t < w_lo);
                let b_hi = lo + times[lo..hi].partition_point(|&t| t < w_hi);
                let n_in = b_hi - b_lo;
                if n_in > 0 {
                    let sum_c: f64 = (b_lo..b_hi).map(|i| self.counts[i]).sum();
                    let sum_e2: f64 = (b_lo..b_hi).map(|i| self.counts_err[i].powi(2)).sum();
                    let (c, e) = match method {
                        RebinMethod::Sum => (sum_c, sum_e2.sqrt()),
                        RebinMethod::Mean => (sum_c / n_in as f64, sum_e2.sqrt() / n_in as f64),
                    };
                    new_time.push(w_lo + 0.5 * dt_new);
                    new_counts.push(c);
                    new_err.push(e);
                    produced = true;
                }
                k += 1;
            }
            if produced {
                kept_gti.push((seg_start, seg_end));
            }
        }

        if new_time.len() < 2 {
            return Err(LcError::EmptySelection);
        }

        BinnedSeries::new(
            Array1::from(new_time),
            Array1::from(new_counts),
            SeriesOptions {
                err: Some(Array1::from(new_err)),
                gti: Some(GoodTimeIntervals::new(kept_gti)?),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(dt_new),
                ..Default::default()
            },
        )
    }

    /// The series sorted by time (counts and errors follow).
    pub fn sorted_by_time(&self, reverse: bool) -> LcResult<BinnedSeries> {
        self.sorted_by(|a, b| a.0.total_cmp(&b.0), reverse)
    }

    /// The series sorted by counts (time and errors follow).
    pub fn sorted_by_counts(&self, reverse: bool) -> LcResult<BinnedSeries> {
        self.sorted_by(|a, b| a.1.total_cmp(&b.1), reverse)
    }

    fn sorted_by(
        &self, cmp: impl Fn(&(f64, f64, f64), &(f64, f64, f64)) -> std::cmp::Ordering,
        reverse: bool,
    ) -> LcResult<BinnedSeries> {
        let mut rows: Vec<(f64, f64, f64)> = self
            .time
            .iter()
            .zip(self.counts.iter())
            .zip(self.counts_err.iter())
            .map(|((&t, &c), &e)| (t, c, e))
            .collect();
        rows.sort_by(&cmp);
        if reverse {
            rows.reverse();
        }

        BinnedSeries::new(
            Array1::from_iter(rows.iter().map(|r| r.0)),
            Array1::from_iter(rows.iter().map(|r| r.1)),
            SeriesOptions {
                err: Some(Array1::from_iter(rows.iter().map(|r| r.2))),
                gti: Some(self.gti.clone()),
                err_dist: self.err_dist,
                mjdref: self.mjdref,
                dt: Some(self.dt),
                ..Default::default()
            },
        )
    }

    // ---- Time shifting ----------------------------------------------------

    /// The series shifted rigidly in time by `time_shift` (GTIs follow).
    pub fn shift(&self, time_shift: f64) -> BinnedSeries {
        let mut shifted = self.clone();
        shifted.time = &self.time + time_shift;
        shifted.bin_lo = &self.bin_lo + time_shift;
        shifted.bin_hi = &self.bin_hi + time_shift;
        shifted.tstart += time_shift;
        shifted.gti = self.gti.shifted(time_shift);
        shifted
    }

    /// Re-reference all times to a new MJD reference epoch.
    pub fn change_mjdref(&self, new_mjdref: f64) -> BinnedSeries {
        let mut shifted = self.shift((new_mjdref - self.mjdref) * 86_400.0);
        shifted.mjdref = new_mjdref;
        shifted
    }

    // ---- Chunked analysis -------------------------------------------------

    /// Apply a reducer to GTI-aware, possibly overlapping windows of a
    /// fixed duration.
    ///
    /// Parameters
    /// ----------
    /// - `chunk_length`: `f64`
    ///   Window duration; windows crossing a GTI boundary are dropped.
    /// - `fraction_step`: `f64`
    ///   Step between window starts as a fraction of `chunk_length`
    ///   (1.0 for contiguous windows, 0.5 for a half-overlapping moving
    ///   window).
    /// - `func`: `FnMut(&BinnedSeries) -> R`
    ///   Reducer applied to each window's sub-series.
    ///
    /// Returns
    /// -------
    /// `(Vec<f64>, Vec<f64>, Vec<R>)`
    ///   Window start edges, window stop edges, and the reducer results,
    ///   parallel per window.
    ///
    /// Errors
    /// ------
    /// - `LcError::InvalidResolution` for a non-positive or non-finite
    ///   `chunk_length`.
    /// - `LcError::InvalidChunkStep` for a non-positive or non-finite
    ///   `fraction_step`.
    pub fn analyze_chunks<R>(
        &self, chunk_length: f64, fraction_step: f64, mut func: impl FnMut(&BinnedSeries) -> R,
    ) -> LcResult<(Vec<f64>, Vec<f64>, Vec<R>)> {
        let (starts, stops) = self.gti.bin_intervals(
            self.time.as_slice().unwrap_or(&[]),
            self.dt,
            chunk_length,
            fraction_step,
        )?;

        let mut start_times = Vec::with_capacity(starts.len());
        let mut stop_times = Vec::with_capacity(starts.len());
        let mut results = Vec::with_capacity(starts.len());

        for (&s, &e) in starts.iter().zip(stops.iter()) {
            let window = self.slice(s, e, 1)?;
            start_times.push(self.time[s] - 0.5 * self.dt);
            stop_times.push(self.time[e - 1] + 0.5 * self.dt);
            results.push(func(&window));
        }

        Ok((start_times, stop_times, results))
    }

    /// Estimate a chunk duration whose every window reaches a minimum
    /// total count.
    ///
    /// Starting from `max(ceil(min_total_counts / meancounts) · dt,
    /// min_time_bins · dt)`, the candidate duration is grown until every
    /// chunk's total counts reach `min_total_counts`.
    ///
    /// Errors
    /// ------
    /// - `LcError::InvalidResolution` when the starting candidate is not
    ///   a positive duration (e.g. a non-positive `min_total_counts`
    ///   together with `min_time_bins = 0`).
    /// - `LcError::EmptySelection` when no window of the candidate
    ///   duration fits inside the GTIs.
    pub fn estimate_chunk_length(
        &self, min_total_counts: f64, min_time_bins: usize,
    ) -> LcResult<f64> {
        let rough = (min_total_counts / self.meancounts).ceil() * self.dt;
        let mut chunk_length = rough.max(min_time_bins as f64 * self.dt);

        loop {
            let (_, _, sums) =
                self.analyze_chunks(chunk_length, 1.0, |lc| lc.counts().sum())?;
            let min_observed = sums.iter().copied().fold(f64::INFINITY, f64::min);
            if !min_observed.is_finite() {
                return Err(LcError::EmptySelection);
            }
            if min_observed >= min_total_counts {
                return Ok(chunk_length);
            }
            if min_observed <= 0.0 {
                chunk_length *= 2.0;
            } else {
                chunk_length *= (min_total_counts / min_observed).ceil();
            }
        }
    }

    // ---- Internal ---------------------------------------------------------

    /// Warn when bin widths are not uniform inside some GTI segment.
    fn warn_if_nonuniform(&self) {
        for &(seg_start, seg_end) in self.gti.intervals() {
            let seg_times: Vec<f64> = self
                .time
                .iter()
                .copied()
                .filter(|&t| seg_start <= t && t < seg_end)
                .collect();
            for w in seg_times.windows(2) {
                let gap = w[1] - w[0];
                if (gap - self.dt).abs() > REL_TOL * self.dt.abs() + ABS_TOL {
                    warn!(
                        "bin sizes in the input time array are not equal throughout; this could \
                         cause problems with Fourier transforms. Please make the input evenly \
                         sampled"
                    );
                    return;
                }
            }
        }
    }
}

impl PartialEq for BinnedSeries {
    /// Two series are equal when their time and counts arrays are
    /// approximately equal (element-wise, within `allclose` tolerances).
    fn eq(&self, other: &Self) -> bool {
        allclose(&self.time, &other.time) && allclose(&self.counts, &other.counts)
    }
}

/// Element-wise approximate equality with numpy-style tolerances.
#[inline]
fn allclose(a: &Array1<f64>, b: &Array1<f64>) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(&x, &y)| (x - y).abs() <= ABS_TOL + REL_TOL * y.abs())
}

/// Keep the entries of `arr` where `mask` is true.
#[inline]
fn filter_by_mask(arr: &Array1<f64>, mask: &[bool]) -> Array1<f64> {
    Array1::from_iter(arr.iter().zip(mask.iter()).filter(|(_, &m)| m).map(|(&v, _)| v))
}

/// Median of an unsorted sample.
#[inline]
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 { values[n / 2] } else { (values[n / 2 - 1] + values[n / 2]) / 2.0 }
}
