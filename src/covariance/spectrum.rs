//! covariance::spectrum — energy-resolved covariance spectra.
//!
//! Purpose
//! -------
//! Compute, for each energy band of interest, the covariance between the
//! band's light curve and a reference-band light curve built from every
//! other energy bin in the reference range, normalized by the square
//! root of the reference band's excess variance. A segmented, averaged
//! variant reduces noise on long observations.
//!
//! Key behaviors
//! -------------
//! - The reference band is rebuilt per subject band: all bins whose
//!   representative lies in the reference range, the subject excluded,
//!   their arrival times concatenated and sorted.
//! - Subject and reference series are binned over the same span
//!   (`tstart = min_time`, `tseg = max_time − min_time`); a length
//!   mismatch is an error, never silently truncated.
//! - Covariance and excess variance both use the population convention
//!   (divide by the number of bins).
//! - A non-positive reference excess variance warns once per affected
//!   band and lets the NaN propagate into the normalized spectrum.
//! - The averaged variant bins energies once over the full observation,
//!   splits the time span into `floor(span / segment_size)` complete
//!   segments (any remainder is dropped), and reports the unweighted
//!   per-band mean of the per-segment covariances and errors, with the
//!   segment count entering the error formula.
//!
//! Invariants & assumptions
//! ------------------------
//! - Outputs are keyed by representative energy, ascending, parallel
//!   across `energies`, `bands`, `unnormalized`, `covariance`, and
//!   `covariance_error`.
//!
//! Testing notes
//! -------------
//! - Unit tests pin a hand-computed spectrum, the degenerate-reference
//!   warning path, the merged-band flow, segment-size validation, and
//!   the one-segment equivalence of the averaged variant.

use log::warn;
use ndarray::Array1;

use crate::covariance::energy_bins::{EnergyBand, EnergyBinMap};
use crate::covariance::errors::{CovError, CovResult};
use crate::covariance::events::EventList;
use crate::lightcurve::series::{BinnedSeries, BinningOptions};

/// ExcessStd — how the counting-noise standard deviation is specified.
///
/// Purpose
/// -------
/// Select the `std` term subtracted (squared) from the population
/// variance when computing a band's excess variance.
///
/// Variants
/// --------
/// - `Unspecified`
///   Poisson default: each series uses `sqrt(mean(counts))`.
/// - `Scalar(f64)`
///   One standard deviation for every series.
/// - `SampleSet(Vec<f64>)`
///   A set of measurements whose mean is used for every series; an
///   empty set falls back to `Unspecified`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExcessStd {
    #[default]
    Unspecified,
    Scalar(f64),
    SampleSet(Vec<f64>),
}

impl ExcessStd {
    /// Resolve to a fixed standard deviation, or `None` for the
    /// per-series Poisson default.
    fn resolve(&self) -> Option<f64> {
        match self {
            ExcessStd::Unspecified => None,
            ExcessStd::Scalar(value) => Some(*value),
            ExcessStd::SampleSet(samples) if samples.is_empty() => None,
            ExcessStd::SampleSet(samples) => {
                Some(samples.iter().sum::<f64>() / samples.len() as f64)
            }
        }
    }
}

/// CovarianceOptions — optional parameters for the covariance engines.
///
/// Fields
/// ------
/// - `band_interest`: `Option<Vec<(f64, f64)>>`
///   Energy ranges to merge into bands of interest; `None` keeps every
///   natural bin as a band of interest.
/// - `ref_band_interest`: `Option<(f64, f64)>`
///   Reference energy range; defaults to the full energy span.
/// - `std`: [`ExcessStd`]
///   Counting-noise model for the excess-variance computation.
#[derive(Debug, Clone, Default)]
pub struct CovarianceOptions {
    pub band_interest: Option<Vec<(f64, f64)>>,
    pub ref_band_interest: Option<(f64, f64)>,
    pub std: ExcessStd,
}

/// Per-band result of one covariance pass over one time span.
struct BandPass {
    unnormalized: f64,
    normalized: f64,
    error: f64,
    xs_ref: f64,
}

/// CovarianceSpectrum — single-pass energy-resolved covariance spectrum.
///
/// Outputs are parallel arrays ordered by ascending representative
/// energy of the bands of interest.
#[derive(Debug, Clone)]
pub struct CovarianceSpectrum {
    bands: Vec<EnergyBand>,
    energies: Vec<f64>,
    unnormalized: Vec<f64>,
    covariance: Vec<f64>,
    covariance_error: Vec<f64>,
    dt: f64,
}

impl CovarianceSpectrum {
    /// Compute the covariance spectrum of an event list.
    ///
    /// Parameters
    /// ----------
    /// - `events`: `&EventList`
    ///   The validated photon events.
    /// - `dt`: `f64`
    ///   Time resolution of the per-band light curves.
    /// - `opts`: [`CovarianceOptions`]
    ///   Bands of interest, reference range, and noise model.
    ///
    /// Returns
    /// -------
    /// `CovResult<CovarianceSpectrum>`
    ///   One covariance (raw and normalized) and one error per band of
    ///   interest, ascending in representative energy.
    ///
    /// Errors
    /// ------
    /// - `CovError::DegenerateEnergies`, `CovError::MalformedBand` from
    ///   energy binning and configuration.
    /// - `CovError::MisalignedSeries` when subject and reference series
    ///   disagree in length.
    /// - `CovError::Lightcurve` when a band's series cannot be built
    ///   (for instance an empty band or a span of fewer than two bins).
    pub fn new(events: &EventList, dt: f64, opts: CovarianceOptions) -> CovResult<Self> {
        let mut map = EnergyBinMap::from_events(events)?;
        if let Some(bands) = &opts.band_interest {
            map = map.merge(bands)?;
        }
        let ref_band = resolve_ref_band(events, opts.ref_band_interest)?;
        let std = opts.std.resolve();

        let tstart = events.min_time();
        let tseg = events.max_time() - tstart;

        let mut bands = Vec::new();
        let mut energies = Vec::new();
        let mut unnormalized = Vec::new();
        let mut covariance = Vec::new();
        let mut covariance_error = Vec::new();

        for &subject_idx in map.interest_indices() {
            let pass = band_pass(&map, subject_idx, ref_band, dt, tstart, tseg, std, 1.0)?;
            if pass.xs_ref <= 0.0 {
                warn_degenerate_reference();
            }

            let band = *map.bins()[subject_idx].band();
            bands.push(band);
            energies.push(band.representative());
            unnormalized.push(pass.unnormalized);
            covariance.push(pass.normalized);
            covariance_error.push(pass.error);
        }

        Ok(CovarianceSpectrum { bands, energies, unnormalized, covariance, covariance_error, dt })
    }

    /// The bands of interest, ascending in representative energy.
    pub fn bands(&self) -> &[EnergyBand] {
        &self.bands
    }

    /// Representative energies, parallel to the other outputs.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Raw (unnormalized) covariances per band.
    pub fn unnormalized(&self) -> &[f64] {
        &self.unnormalized
    }

    /// Normalized covariances per band.
    pub fn covariance(&self) -> &[f64] {
        &self.covariance
    }

    /// Errors of the normalized covariances per band.
    pub fn covariance_error(&self) -> &[f64] {
        &self.covariance_error
    }

    /// Time resolution the per-band series were binned at.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

/// AveragedCovarianceSpectrum — segmented, averaged covariance spectrum.
///
/// The observation is split into complete segments of a fixed duration;
/// per-band covariances and errors are computed per segment with the
/// full-observation energy binning and averaged without weighting.
#[derive(Debug, Clone)]
pub struct AveragedCovarianceSpectrum {
    bands: Vec<EnergyBand>,
    energies: Vec<f64>,
    unnormalized: Vec<f64>,
    covariance: Vec<f64>,
    covariance_error: Vec<f64>,
    dt: f64,
    n_segments: usize,
}

impl AveragedCovarianceSpectrum {
    /// Compute the averaged covariance spectrum of an event list.
    ///
    /// Parameters
    /// ----------
    /// - `events`: `&EventList`
    ///   The validated photon events.
    /// - `dt`: `f64`
    ///   Time resolution of the per-band light curves.
    /// - `segment_size`: `f64`
    ///   Duration of each averaging segment; the observation yields
    ///   `floor(span / segment_size)` complete segments and any trailing
    ///   remainder is dropped.
    /// - `opts`: [`CovarianceOptions`]
    ///   Bands of interest, reference range, and noise model.
    ///
    /// Errors
    /// ------
    /// - `CovError::InvalidSegmentSize` for a non-positive or non-finite
    ///   duration, or one too long for even a single complete segment.
    /// - Everything [`CovarianceSpectrum::new`] can return.
    pub fn new(
        events: &EventList, dt: f64, segment_size: f64, opts: CovarianceOptions,
    ) -> CovResult<Self> {
        if !segment_size.is_finite() || segment_size <= 0.0 {
            return Err(CovError::InvalidSegmentSize(segment_size));
        }

        let span = events.max_time() - events.min_time();
        let n_segments = (span / segment_size) as usize;
        if n_segments < 1 {
            return Err(CovError::InvalidSegmentSize(segment_size));
        }

        let mut map = EnergyBinMap::from_events(events)?;
        if let Some(bands) = &opts.band_interest {
            map = map.merge(bands)?;
        }
        let ref_band = resolve_ref_band(events, opts.ref_band_interest)?;
        let std = opts.std.resolve();

        let mut bands = Vec::new();
        let mut energies = Vec::new();
        let mut unnormalized = Vec::new();
        let mut covariance = Vec::new();
        let mut covariance_error = Vec::new();

        for &subject_idx in map.interest_indices() {
            let mut sum_unnorm = 0.0;
            let mut sum_norm = 0.0;
            let mut sum_error = 0.0;
            let mut degenerate = false;

            for segment in 0..n_segments {
                let tstart = events.min_time() + segment as f64 * segment_size;
                let pass = band_pass(
                    &map,
                    subject_idx,
                    ref_band,
                    dt,
                    tstart,
                    segment_size,
                    std,
                    n_segments as f64,
                )?;
                sum_unnorm += pass.unnormalized;
                sum_norm += pass.normalized;
                sum_error += pass.error;
                degenerate |= pass.xs_ref <= 0.0;
            }

            if degenerate {
                warn_degenerate_reference();
            }

            let m = n_segments as f64;
            let band = *map.bins()[subject_idx].band();
            bands.push(band);
            energies.push(band.representative());
            unnormalized.push(sum_unnorm / m);
            covariance.push(sum_norm / m);
            covariance_error.push(sum_error / m);
        }

        Ok(AveragedCovarianceSpectrum {
            bands,
            energies,
            unnormalized,
            covariance,
            covariance_error,
            dt,
            n_segments,
        })
    }

    /// The bands of interest, ascending in representative energy.
    pub fn bands(&self) -> &[EnergyBand] {
        &self.bands
    }

    /// Representative energies, parallel to the other outputs.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Averaged raw covariances per band.
    pub fn unnormalized(&self) -> &[f64] {
        &self.unnormalized
    }

    /// Averaged normalized covariances per band.
    pub fn covariance(&self) -> &[f64] {
        &self.covariance
    }

    /// Averaged errors of the normalized covariances per band.
    pub fn covariance_error(&self) -> &[f64] {
        &self.covariance_error
    }

    /// Time resolution the per-band series were binned at.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of complete segments averaged.
    pub fn n_segments(&self) -> usize {
        self.n_segments
    }
}

/// Validate and default the reference energy range.
fn resolve_ref_band(
    events: &EventList, ref_band: Option<(f64, f64)>,
) -> CovResult<(f64, f64)> {
    match ref_band {
        Some((low, high)) => {
            if !low.is_finite() || !high.is_finite() || high <= low {
                return Err(CovError::MalformedBand { low, high });
            }
            Ok((low, high))
        }
        None => Ok((events.min_energy(), events.max_energy())),
    }
}

/// One covariance pass for one subject band over one time span.
///
/// Builds the subject series from the band's arrival times and the
/// reference series from every other bin whose representative lies in
/// `ref_band`, then evaluates the raw covariance, its normalization by
/// the reference excess variance, and the error term with `n_segments`
/// entering the denominator.
#[allow(clippy::too_many_arguments)]
fn band_pass(
    map: &EnergyBinMap, subject_idx: usize, ref_band: (f64, f64), dt: f64, tstart: f64,
    tseg: f64, std: Option<f64>, n_segments: f64,
) -> CovResult<BandPass> {
    let binning = |toa: &[f64]| {
        BinnedSeries::from_arrival_times(
            toa,
            dt,
            BinningOptions { tstart: Some(tstart), tseg: Some(tseg), ..Default::default() },
        )
    };

    let subject = binning(map.bins()[subject_idx].arrival_times())?;

    let mut ref_times: Vec<f64> = Vec::new();
    for (i, bin) in map.bins().iter().enumerate() {
        let rep = bin.band().representative();
        if i != subject_idx && ref_band.0 <= rep && rep <= ref_band.1 {
            ref_times.extend_from_slice(bin.arrival_times());
        }
    }
    ref_times.sort_by(f64::total_cmp);
    let reference = binning(&ref_times)?;

    if subject.n() != reference.n() {
        return Err(CovError::MisalignedSeries {
            subject: subject.n(),
            reference: reference.n(),
        });
    }

    let unnormalized = population_covariance(subject.counts(), reference.counts());

    let std_subject = std.unwrap_or_else(|| population_mean(subject.counts()).max(0.0).sqrt());
    let std_reference =
        std.unwrap_or_else(|| population_mean(reference.counts()).max(0.0).sqrt());

    let xs_subject = population_variance(subject.counts()) - std_subject.powi(2);
    let xs_ref = population_variance(reference.counts()) - std_reference.powi(2);

    let normalized = unnormalized / xs_ref.sqrt();

    let n_bins = subject.n() as f64;
    let numerator =
        xs_subject * std_reference + xs_ref * std_subject + std_subject * std_reference;
    let error = (numerator / (n_bins * n_segments * xs_ref)).sqrt();

    Ok(BandPass { unnormalized, normalized, error, xs_ref })
}

fn warn_degenerate_reference() {
    warn!(
        "the excess variance in the reference band is not positive. This implies that the \
         reference band was badly chosen. Beware that the covariance spectrum will have NaNs!"
    );
}

/// Population mean of a counts array.
#[inline]
fn population_mean(values: &Array1<f64>) -> f64 {
    values.sum() / values.len() as f64
}

/// Population covariance (divide by N) of two parallel counts arrays.
#[inline]
fn population_covariance(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let mean_a = population_mean(a);
    let mean_b = population_mean(b);
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - mean_a) * (y - mean_b)).sum::<f64>()
        / a.len() as f64
}

/// Population variance (divide by N) of a counts array.
#[inline]
fn population_variance(values: &Array1<f64>) -> f64 {
    population_covariance(values, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - A hand-computed spectrum for a fixed noise scale (covariance,
    //   normalization, and the closed-form error).
    // - The degenerate-reference path (NaN with a warning, no error).
    // - Natural vs merged bands of interest.
    // - Segment-size validation and the one-segment equivalence of the
    //   averaged variant.
    //
    // They intentionally DO NOT cover:
    // - The light-curve layer itself; it has its own tests.
    // -------------------------------------------------------------------------

    /// Photons at energies 1 (subject band), 2, and 3, spanning [0, 4]
    /// so the per-band series hold exactly four unit bins at dt = 1.
    fn fixture_events() -> EventList {
        EventList::from_pairs(&[
            // Energy-1 photons: counts [1, 2, 1, 0] over bins [0, 4).
            (0.5, 1.0),
            (1.5, 1.0),
            (1.6, 1.0),
            (2.5, 1.0),
            // Energy-2 photons.
            (0.5, 2.0),
            (1.5, 2.0),
            (2.5, 2.0),
            (3.5, 2.0),
            // Energy-3 photons; 0.0 and 4.0 pin the observation span.
            (0.0, 3.0),
            (3.5, 3.0),
            (4.0, 3.0),
        ])
        .expect("fixture events should validate")
    }

    #[test]
    // Purpose
    // -------
    // Pin the full pipeline for the first band against hand-computed
    // values with a zero noise scale.
    //
    // Given
    // -----
    // - The fixture events, dt = 1, std = Scalar(0).
    // - Subject band 1 counts x = [1, 2, 1, 0]; reference (energies 2
    //   and 3, the t = 4 photon falling past the last bin) counts
    //   y = [2, 1, 1, 2].
    //
    // Expect
    // ------
    // - unnormalized = pop_cov(x, y) = -0.25.
    // - xs_ref = pop_var(y) = 0.25, so covariance = -0.25 / 0.5 = -0.5.
    // - error = 0 (every term carries the zero std or a zero product).
    fn covariance_spectrum_matches_hand_computed_values() {
        // Arrange
        let events = fixture_events();
        let opts = CovarianceOptions { std: ExcessStd::Scalar(0.0), ..Default::default() };

        // Act
        let spectrum = CovarianceSpectrum::new(&events, 1.0, opts).unwrap();

        // Assert
        assert_eq!(spectrum.energies(), &[1.5, 2.5]);
        assert!((spectrum.unnormalized()[0] - (-0.25)).abs() < 1e-12);
        assert!((spectrum.covariance()[0] - (-0.5)).abs() < 1e-12);
        assert!(spectrum.covariance_error()[0].abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify the closed-form error: with a fixed scalar std the error
    // equals sqrt((xs_s·σ + xs_r·σ + σ²) / (N · M · xs_r)).
    //
    // Given
    // -----
    // - The fixture with std = Scalar(0.1); x = [1, 2, 1, 0],
    //   y = [2, 1, 1, 2], N = 4, M = 1.
    //
    // Expect
    // ------
    // - xs_s = 0.5 - 0.01, xs_r = 0.25 - 0.01, and the reported error
    //   matches the formula evaluated on those values.
    fn covariance_spectrum_error_matches_closed_form() {
        // Arrange
        let events = fixture_events();
        let sigma = 0.1;
        let opts = CovarianceOptions { std: ExcessStd::Scalar(sigma), ..Default::default() };

        let xs_s = 0.5 - sigma * sigma;
        let xs_r = 0.25 - sigma * sigma;
        let expected = ((xs_s * sigma + xs_r * sigma + sigma * sigma) / (4.0 * xs_r)).sqrt();

        // Act
        let spectrum = CovarianceSpectrum::new(&events, 1.0, opts).unwrap();

        // Assert
        assert!(
            (spectrum.covariance_error()[0] - expected).abs() < 1e-12,
            "expected {expected}, got {}",
            spectrum.covariance_error()[0]
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the degenerate-reference path: with the Poisson default the
    // fixture's reference excess variance is negative, so the normalized
    // covariance is NaN but construction still succeeds.
    //
    // Given
    // -----
    // - The fixture events with std unspecified.
    //
    // Expect
    // ------
    // - `Ok` with NaN normalized covariance and a finite raw covariance
    //   for the first band.
    fn covariance_spectrum_degenerate_reference_yields_nan_not_error() {
        // Arrange
        let events = fixture_events();

        // Act
        let spectrum =
            CovarianceSpectrum::new(&events, 1.0, CovarianceOptions::default()).unwrap();

        // Assert
        assert!(spectrum.unnormalized()[0].is_finite());
        assert!(spectrum.covariance()[0].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Verify the merged-band flow: merging [1, 2] leaves one band of
    // interest while the remaining natural bin still feeds the reference
    // band.
    //
    // Given
    // -----
    // - The fixture events, band_interest = [(1, 2)], std = Scalar(0).
    //
    // Expect
    // ------
    // - One output band with representative 1.5 and a finite normalized
    //   covariance.
    fn covariance_spectrum_merged_band_reports_single_band() {
        // Arrange
        let events = fixture_events();
        let opts = CovarianceOptions {
            band_interest: Some(vec![(1.0, 2.0)]),
            std: ExcessStd::Scalar(0.0),
            ..Default::default()
        };

        // Act
        let spectrum = CovarianceSpectrum::new(&events, 1.0, opts).unwrap();

        // Assert
        assert_eq!(spectrum.energies(), &[1.5]);
        assert!(spectrum.covariance()[0].is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Verify segment-size validation of the averaged variant.
    //
    // Given
    // -----
    // - Zero, negative, and too-long segment sizes over a 4 s span.
    //
    // Expect
    // ------
    // - `Err(InvalidSegmentSize)` in all three cases.
    fn averaged_covariance_spectrum_rejects_invalid_segment_sizes() {
        // Arrange
        let events = fixture_events();
        let opts = CovarianceOptions::default();

        // Act & Assert
        for size in [0.0, -2.0, 10.0] {
            match AveragedCovarianceSpectrum::new(&events, 1.0, size, opts.clone()) {
                Err(CovError::InvalidSegmentSize(reported)) => assert_eq!(reported, size),
                other => panic!("expected InvalidSegmentSize for {size}, got {other:?}"),
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the averaged variant with exactly one segment agrees
    // with the single-pass engine.
    //
    // Given
    // -----
    // - The fixture events, segment_size equal to the full 4 s span,
    //   std = Scalar(0).
    //
    // Expect
    // ------
    // - Equal covariances and errors, band by band; n_segments = 1.
    fn averaged_covariance_spectrum_one_segment_matches_single_pass() {
        // Arrange
        let events = fixture_events();
        let opts = CovarianceOptions { std: ExcessStd::Scalar(0.0), ..Default::default() };

        // Act
        let single = CovarianceSpectrum::new(&events, 1.0, opts.clone()).unwrap();
        let averaged = AveragedCovarianceSpectrum::new(&events, 1.0, 4.0, opts).unwrap();

        // Assert
        assert_eq!(averaged.n_segments(), 1);
        assert_eq!(averaged.energies(), single.energies());
        for i in 0..single.energies().len() {
            assert!((averaged.covariance()[i] - single.covariance()[i]).abs() < 1e-12);
            assert!(
                (averaged.covariance_error()[i] - single.covariance_error()[i]).abs() < 1e-12
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `ExcessStd` resolution covers all variants, including
    // the empty-sample-set fallback.
    //
    // Given
    // -----
    // - Each variant in turn.
    //
    // Expect
    // ------
    // - Unspecified and the empty set resolve to None; the scalar to
    //   itself; the sample set to its mean.
    fn excess_std_resolution_covers_all_variants() {
        // Arrange & Act & Assert
        assert_eq!(ExcessStd::Unspecified.resolve(), None);
        assert_eq!(ExcessStd::SampleSet(Vec::new()).resolve(), None);
        assert_eq!(ExcessStd::Scalar(0.4).resolve(), Some(0.4));
        assert_eq!(ExcessStd::SampleSet(vec![1.0, 2.0, 3.0]).resolve(), Some(2.0));
    }
}
