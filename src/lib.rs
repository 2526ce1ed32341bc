//! xray_timeseries — binned light curves and energy-resolved covariance
//! spectra for X-ray timing analysis.
//!
//! Purpose
//! -------
//! Serve as the crate root for the two public layers of the library: the
//! time-domain layer ([`lightcurve`]) that turns photon arrival times or
//! pre-binned counts into validated, GTI-filtered binned series, and the
//! spectral-timing layer ([`covariance`]) that correlates energy bands of
//! interest against dynamically built reference bands following
//! Wilkinson & Uttley (2009).
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules (`lightcurve` and `covariance`) as the
//!   public crate surface; each carries its own prelude for ergonomic
//!   imports.
//! - Keep every container validated at construction: a value of a public
//!   type always satisfies its documented invariants, and no operation
//!   returns a partially valid object.
//!
//! Conventions
//! -----------
//! - Times are seconds relative to an MJD reference epoch; energies are
//!   plain numeric values with no instrument-channel semantics.
//! - Fatal conditions surface as `LcError` / `CovError` through `Result`;
//!   tolerated-but-suspicious conditions are reported through the `log`
//!   facade and processing continues with documented fallbacks. The crate
//!   itself performs no I/O and installs no logger.
//!
//! Downstream usage
//! ----------------
//! - Light-curve work: `lightcurve::prelude::*`, then
//!   `BinnedSeries::from_arrival_times` or `BinnedSeries::new`.
//! - Covariance spectra: `covariance::prelude::*`, then build an
//!   `EventList` and a `CovarianceSpectrum` or
//!   `AveragedCovarianceSpectrum`.
//!
//! Testing notes
//! -------------
//! - Each module carries colocated unit tests; the `tests/` directory
//!   exercises the full arrival-times-to-spectrum pipeline.

pub mod covariance;
pub mod lightcurve;
