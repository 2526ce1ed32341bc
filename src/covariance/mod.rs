//! covariance — energy-resolved covariance spectra from photon events.
//!
//! Purpose
//! -------
//! Provide the spectral-timing layer of the crate: a validated photon
//! event list, least-count energy binning with band merging, and the
//! covariance engines that correlate each energy band of interest with a
//! dynamically built reference band, following Wilkinson & Uttley (2009).
//!
//! Key behaviors
//! -------------
//! - Validate `(time, energy)` pairs once in [`events`]; everything
//!   downstream assumes finite input.
//! - Partition energies into natural least-count bins and optionally
//!   merge ranges into bands of interest in [`energy_bins`].
//! - Compute per-band covariances against a reference band that always
//!   excludes the subject, normalized by the square root of the
//!   reference excess variance, in [`spectrum`] — single-pass or
//!   segment-averaged.
//! - Centralize the error surface in [`errors`] (`CovError`,
//!   `CovResult`), with light-curve failures bridged via `From`.
//!
//! Conventions
//! -----------
//! - Outputs are keyed by representative energy, ascending.
//! - Covariance and excess variance use the population convention.
//! - Degenerate statistics warn via `log` and propagate NaNs; only
//!   structural problems are errors.
//!
//! Downstream usage
//! ----------------
//! - Typical flow: build an [`EventList`] from `(time, energy)` pairs,
//!   then construct a [`CovarianceSpectrum`] (or, for long observations,
//!   an [`AveragedCovarianceSpectrum`]) with a [`CovarianceOptions`]
//!   describing the bands of interest, the reference range, and the
//!   counting-noise model.
//!
//! Testing notes
//! -------------
//! - Submodules carry unit tests against hand-computed values; the
//!   end-to-end pipeline is exercised in the integration tests.

pub mod energy_bins;
pub mod errors;
pub mod events;
pub mod spectrum;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::energy_bins::{EnergyBand, EnergyBin, EnergyBinMap};
pub use self::errors::{CovError, CovResult};
pub use self::events::{Event, EventList};
pub use self::spectrum::{
    AveragedCovarianceSpectrum, CovarianceOptions, CovarianceSpectrum, ExcessStd,
};

/// Convenience prelude for downstream users of the covariance layer.
pub mod prelude {
    pub use super::energy_bins::{EnergyBand, EnergyBin, EnergyBinMap};
    pub use super::errors::{CovError, CovResult};
    pub use super::events::{Event, EventList};
    pub use super::spectrum::{
        AveragedCovarianceSpectrum, CovarianceOptions, CovarianceSpectrum, ExcessStd,
    };
}
