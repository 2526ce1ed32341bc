//! lightcurve — binned light curves, good-time intervals, and Poisson errors.
//!
//! Purpose
//! -------
//! Provide the time-domain layer of the crate: a validated binned light
//! curve ([`BinnedSeries`]) constructed from per-bin values or photon
//! arrival times, an explicit good-time-interval type
//! ([`GoodTimeIntervals`]), and frequentist Poisson confidence-interval
//! errors. This is the surface the covariance layer builds its subject and
//! reference series on, and the entry point for standalone light-curve
//! work.
//!
//! Key behaviors
//! -------------
//! - Collect input guards in [`validation`] so every construction path
//!   rejects non-finite, mismatched, or too-short inputs the same way.
//! - Model validity intervals explicitly in [`gti`], with masking,
//!   interval-set intersection/union, and GTI-aware chunk windows.
//! - Derive symmetric Poisson errors from chi-squared quantiles in
//!   [`poisson`].
//! - Expose the series type and its transformation algebra (arithmetic,
//!   truncation, joining, splitting, rebinning, sorting, chunked
//!   analysis, event binning) in [`series`].
//! - Centralize the error surface in [`errors`] (`LcError`, `LcResult`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Constructed series are internally consistent: parallel finite
//!   arrays, at least two bins, every bin inside a good-time interval,
//!   `counts = countrate × dt`.
//! - Fatal conditions return `LcError`; tolerated-but-suspicious inputs
//!   (unordered times, non-uniform bins, mismatched statistics) warn via
//!   `log` and continue with documented fallbacks.
//!
//! Conventions
//! -----------
//! - Times are bin midpoints in seconds relative to an MJD reference
//!   epoch (`mjdref`); intervals are half-open `[start, end)`.
//! - All transformations are pure and return new instances.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: bin arrival times via
//!   `BinnedSeries::from_arrival_times`, or wrap pre-binned counts via
//!   `BinnedSeries::new` with [`SeriesOptions`], then transform and
//!   analyze. The covariance layer consumes this module through the same
//!   public API.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own behavior; the
//!   end-to-end path from arrival times to chunked analysis is exercised
//!   in the integration tests.

pub mod errors;
pub mod gti;
pub mod poisson;
pub mod series;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{LcError, LcResult};
pub use self::gti::GoodTimeIntervals;
pub use self::poisson::poisson_symmetrical_errors;
pub use self::series::{
    BinnedSeries, BinningOptions, BinningStrategy, ErrorDistribution, RebinMethod, SeriesOptions,
};

/// Convenience prelude for downstream users of the light-curve layer.
pub mod prelude {
    pub use super::errors::{LcError, LcResult};
    pub use super::gti::GoodTimeIntervals;
    pub use super::series::{
        BinnedSeries, BinningOptions, BinningStrategy, ErrorDistribution, RebinMethod,
        SeriesOptions,
    };
}
