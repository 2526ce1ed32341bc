//! covariance::errors — error surface of the covariance-spectrum layer.
//!
//! Purpose
//! -------
//! Centralize every failure the covariance layer can report: event-list
//! validation, energy-bin construction, band configuration, series
//! alignment, segmentation, and errors bubbling up from the underlying
//! light-curve layer.
//!
//! Conventions
//! -----------
//! - Fatal conditions are errors; degenerate-statistics conditions (a
//!   non-positive reference excess variance) are `log::warn!` diagnostics
//!   emitted by the engine, never errors.
//! - `LcError` converts into `CovError::Lightcurve` via `From`, so series
//!   construction inside the engine can use `?` directly.

use std::error::Error;
use std::fmt;

use crate::lightcurve::errors::LcError;

/// Result alias for the covariance layer.
pub type CovResult<T> = Result<T, CovError>;

/// CovError — all fatal conditions of the covariance-spectrum layer.
///
/// Variants
/// --------
/// - `EmptyEventList`
///   The event list holds no events.
/// - `NonFiniteEvent { index, time, energy }`
///   The first event with a NaN or infinite time or energy.
/// - `DegenerateEnergies`
///   All events share one energy value, so no least-count bin width
///   exists.
/// - `MalformedBand { low, high }`
///   A requested energy band is inverted, empty, or non-finite.
/// - `MisalignedSeries { subject, reference }`
///   Subject and reference light curves came out with different lengths;
///   the engine never truncates to force agreement.
/// - `InvalidSegmentSize(f64)`
///   The averaging segment duration is non-positive, non-finite, or too
///   long for even one complete segment.
/// - `Lightcurve(LcError)`
///   A failure from the underlying light-curve layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CovError {
    EmptyEventList,
    NonFiniteEvent { index: usize, time: f64, energy: f64 },
    DegenerateEnergies,
    MalformedBand { low: f64, high: f64 },
    MisalignedSeries { subject: usize, reference: usize },
    InvalidSegmentSize(f64),
    Lightcurve(LcError),
}

impl fmt::Display for CovError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CovError::EmptyEventList => {
                write!(f, "event list is empty; at least one (time, energy) pair is required")
            }
            CovError::NonFiniteEvent { index, time, energy } => write!(
                f,
                "event {index} has a non-finite component (time = {time}, energy = {energy})"
            ),
            CovError::DegenerateEnergies => write!(
                f,
                "all events share a single energy value; no least-count bin width can be derived"
            ),
            CovError::MalformedBand { low, high } => {
                write!(f, "energy band [{low}, {high}] is malformed; expected finite low < high")
            }
            CovError::MisalignedSeries { subject, reference } => write!(
                f,
                "subject and reference light curves are misaligned \
                 ({subject} vs {reference} bins)"
            ),
            CovError::InvalidSegmentSize(size) => write!(
                f,
                "segment size {size} is invalid; expected a positive finite duration allowing \
                 at least one complete segment"
            ),
            CovError::Lightcurve(err) => write!(f, "light curve construction failed: {err}"),
        }
    }
}

impl Error for CovError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CovError::Lightcurve(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LcError> for CovError {
    fn from(err: LcError) -> Self {
        CovError::Lightcurve(err)
    }
}
