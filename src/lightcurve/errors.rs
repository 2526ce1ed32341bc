//! lightcurve::errors — error types for binned-series construction and ops.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by every light-curve
//! routine in this subtree: series construction, GTI handling, arithmetic
//! composition, truncation, joining, rebinning, and chunked analysis.
//!
//! Key behaviors
//! -------------
//! - Define [`LcResult`] and [`LcError`] as the canonical result and error
//!   types for the `lightcurve` subtree.
//! - Attach human-readable `Display` messages to each variant so that
//!   diagnostics are meaningful without additional context.
//! - Separate *fatal* conditions (reported through this enum) from
//!   *non-fatal* diagnostics, which are emitted on the `log` channel and
//!   never abort construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Modules in this subtree validate their inputs (finiteness, lengths,
//!   interval ordering) and return [`LcResult<T>`] instead of panicking.
//! - `LcError` values are small, cheap to clone, and carry just enough
//!   payload (offending value, lengths, bounds) for debugging.
//! - A fatal error means no partially-valid series was produced.
//!
//! Conventions
//! -----------
//! - Error messages are phrased in terms of domain constraints ("time and
//!   counts must have the same length", "GTIs must be sorted and disjoint")
//!   rather than implementation details.
//! - Covariance-level code wraps these errors via `From<LcError>` on its
//!   own error type; this module knows nothing about that layer.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that `Display` messages embed their payloads, which
//!   is what higher-level code relies on when surfacing errors to users.

pub type LcResult<T> = Result<T, LcError>;

/// LcError — fatal conditions in light-curve construction and operations.
///
/// Purpose
/// -------
/// Represent every validation and configuration failure that can occur
/// while constructing a [`BinnedSeries`](crate::lightcurve::BinnedSeries)
/// or applying one of its transformations.
///
/// Variants
/// --------
/// - `NonFiniteTime(value)` / `NonFiniteCounts(value)` /
///   `NonFiniteErr(value)`
///   A time stamp, count/rate value, or supplied uncertainty is NaN or
///   ±∞; the payload is the first offending value.
/// - `LengthMismatch { time_len, counts_len }`
///   The time and value arrays differ in length.
/// - `TooFewBins(len)`
///   Fewer than two bins were supplied; a light curve needs at least two.
/// - `UnknownErrDist(name)`
///   An error-distribution keyword was not recognized.
/// - `InvalidGti { start, end }`
///   A good-time interval is empty, inverted, non-finite, or out of order
///   with respect to its neighbours.
/// - `MjdrefMismatch { left, right }`
///   Two series with different MJD reference epochs were combined.
/// - `MisalignedTimeGrids`
///   GTI-filtered time arrays of two series being composed are not equal
///   within `dt / 100`.
/// - `EmptyArrivalTimes`
///   An event-binning call received no arrival times.
/// - `InvalidResolution(dt)`
///   A bin width or chunk duration is non-positive, non-finite, or (for
///   rebinning) not coarser than the current one.
/// - `InvalidChunkStep(fraction)`
///   A chunk-window step fraction is non-positive or non-finite; the
///   window generator could not advance.
/// - `InvalidTruncation { start, stop }`
///   A truncation range is inverted or selects nothing.
/// - `EmptySelection`
///   A slice, split, or rebin selected fewer than two bins, which cannot
///   form a valid series.
///
/// Notes
/// -----
/// - Implements [`std::error::Error`] and [`std::fmt::Display`] for
///   idiomatic `?`-based propagation.
#[derive(Debug, Clone, PartialEq)]
pub enum LcError {
    //------ Input validation ------
    NonFiniteTime(f64),
    NonFiniteCounts(f64),
    NonFiniteErr(f64),
    LengthMismatch { time_len: usize, counts_len: usize },
    TooFewBins(usize),
    //------ Configuration ------
    UnknownErrDist(String),
    InvalidGti { start: f64, end: f64 },
    InvalidResolution(f64),
    InvalidChunkStep(f64),
    //------ Composition / selection ------
    MjdrefMismatch { left: f64, right: f64 },
    MisalignedTimeGrids,
    EmptyArrivalTimes,
    InvalidTruncation { start: f64, stop: f64 },
    EmptySelection,
}

impl std::error::Error for LcError {}

impl std::fmt::Display for LcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LcError::NonFiniteTime(value) => {
                write!(f, "Non-finite value in the time array: {value}.")
            }
            LcError::NonFiniteCounts(value) => {
                write!(f, "Non-finite value in the counts array: {value}.")
            }
            LcError::NonFiniteErr(value) => {
                write!(f, "Non-finite value in the error array: {value}.")
            }
            LcError::LengthMismatch { time_len, counts_len } => {
                write!(
                    f,
                    "Time and counts arrays are not of the same length: {time_len} vs {counts_len}."
                )
            }
            LcError::TooFewBins(len) => {
                write!(f, "A light curve needs at least 2 bins; got {len}.")
            }
            LcError::UnknownErrDist(name) => {
                write!(
                    f,
                    "Error distribution {name:?} not recognized (expected 'poisson', 'gauss', or 'none')."
                )
            }
            LcError::InvalidGti { start, end } => {
                write!(
                    f,
                    "Invalid good-time interval [{start}, {end}): intervals must be finite, non-empty, sorted, and disjoint."
                )
            }
            LcError::InvalidResolution(dt) => {
                write!(f, "Invalid bin width {dt}: must be positive, finite, and coarser than the current resolution when rebinning.")
            }
            LcError::InvalidChunkStep(fraction) => {
                write!(f, "Invalid chunk step fraction {fraction}: must be positive and finite.")
            }
            LcError::MjdrefMismatch { left, right } => {
                write!(f, "MJD reference epochs differ between the two light curves: {left} vs {right}.")
            }
            LcError::MisalignedTimeGrids => {
                write!(
                    f,
                    "GTI-filtered time arrays of both light curves must be of the same dimension and aligned within dt/100."
                )
            }
            LcError::EmptyArrivalTimes => {
                write!(f, "Cannot bin an empty sequence of arrival times.")
            }
            LcError::InvalidTruncation { start, stop } => {
                write!(f, "Invalid truncation range: start {start} must not exceed stop {stop}.")
            }
            LcError::EmptySelection => {
                write!(f, "Selection produced fewer than 2 bins, which cannot form a light curve.")
            }
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
    // - Basic `Display` formatting for LcError variants.
    // - Embedding of payload values into error messages.
    //
    // They intentionally DO NOT cover:
    // - The behavior of routines that *produce* these errors; that is
    //   exercised in the series, GTI, and validation modules.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `LcError::LengthMismatch` embeds both lengths in its
    // `Display` representation.
    //
    // Given
    // -----
    // - An `LcError::LengthMismatch` with lengths 5 and 3.
    //
    // Expect
    // ------
    // - `format!("{err}")` contains both "5" and "3".
    fn lc_error_length_mismatch_includes_lengths_in_display() {
        // Arrange
        let err = LcError::LengthMismatch { time_len: 5, counts_len: 3 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('5') && msg.contains('3'), "Display should embed both lengths.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `LcError::UnknownErrDist` carries the offending keyword.
    //
    // Given
    // -----
    // - An `LcError::UnknownErrDist` with the keyword "laplace".
    //
    // Expect
    // ------
    // - `format!("{err}")` contains "laplace".
    fn lc_error_unknown_err_dist_includes_keyword_in_display() {
        // Arrange
        let err = LcError::UnknownErrDist("laplace".to_string());

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("laplace"), "Display should embed the keyword.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `LcError::InvalidGti` embeds the offending interval
    // bounds.
    //
    // Given
    // -----
    // - An `LcError::InvalidGti` with start 10.0 and end 4.0.
    //
    // Expect
    // ------
    // - `format!("{err}")` contains both "10" and "4".
    fn lc_error_invalid_gti_includes_bounds_in_display() {
        // Arrange
        let err = LcError::InvalidGti { start: 10.0, end: 4.0 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("10") && msg.contains('4'), "Display should embed the bounds.\nGot: {msg}");
    }
}
