//! covariance::energy_bins — least-count energy binning and band merging.
//!
//! Purpose
//! -------
//! Partition an event list by photon energy into natural bins one least
//! count wide (the smallest nonzero gap between unique energies), and
//! optionally merge ranges of natural bins into wider bands of interest.
//! The result is an ordered descriptor list, indexed by position, that
//! the covariance engine walks to build subject and reference series.
//!
//! Key behaviors
//! -------------
//! - N unique energies produce N − 1 natural bins; bin *i* covers
//!   `[u[i], u[i] + lc)` and is represented by `u[i] + lc/2`. The last
//!   bin is closed on both ends so the highest-energy events are kept.
//! - Merging collapses all natural bins whose representative falls in a
//!   requested `[low, high]` range into one band represented by the
//!   range midpoint; a fresh map is built, and natural bins outside
//!   every requested range remain available (the reference band may use
//!   them). The merged bands are the bins of interest.
//!
//! Invariants & assumptions
//! ------------------------
//! - Bins are ordered by ascending representative energy.
//! - Arrival times are sorted within each natural bin; merged bands
//!   concatenate member lists in bin order without a global re-sort.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the bin count, edge membership of the last bin, the
//!   degenerate single-energy error, merge bookkeeping, and the
//!   concatenation order of merged member lists.

use crate::covariance::errors::{CovError, CovResult};
use crate::covariance::events::EventList;

/// EnergyBand — one energy range with its representative energy.
///
/// Natural bands are half-open `[low, high)` except the last, which is
/// closed; merged bands are closed `[low, high]` and represented by the
/// range midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBand {
    low: f64,
    high: f64,
    representative: f64,
    inclusive_high: bool,
}

impl EnergyBand {
    /// A merged band over `[low, high]`, represented by the midpoint.
    ///
    /// Errors
    /// ------
    /// - `CovError::MalformedBand` for non-finite bounds or `high <= low`.
    pub fn merged(low: f64, high: f64) -> CovResult<Self> {
        if !low.is_finite() || !high.is_finite() || high <= low {
            return Err(CovError::MalformedBand { low, high });
        }
        Ok(EnergyBand { low, high, representative: (low + high) / 2.0, inclusive_high: true })
    }

    /// Lower edge.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper edge.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Representative energy the band is keyed by.
    pub fn representative(&self) -> f64 {
        self.representative
    }

    /// Whether `energy` belongs to this band.
    pub fn contains(&self, energy: f64) -> bool {
        if self.inclusive_high {
            self.low <= energy && energy <= self.high
        } else {
            self.low <= energy && energy < self.high
        }
    }
}

/// EnergyBin — an energy band together with its member arrival times.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBin {
    band: EnergyBand,
    arrival_times: Vec<f64>,
}

impl EnergyBin {
    /// The band descriptor.
    pub fn band(&self) -> &EnergyBand {
        &self.band
    }

    /// Arrival times of the photons in this bin.
    pub fn arrival_times(&self) -> &[f64] {
        &self.arrival_times
    }
}

/// EnergyBinMap — ordered energy bins plus the bins of interest.
///
/// Purpose
/// -------
/// Hold the full set of energy bins (natural and merged) ordered by
/// representative energy, and record which of them are the bands of
/// interest the covariance engine reports on. Lookups are positional;
/// energy ranges are resolved by containment, never by float key
/// equality.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBinMap {
    bins: Vec<EnergyBin>,
    interest: Vec<usize>,
    least_count: f64,
}

impl EnergyBinMap {
    /// Natural least-count binning of an event list.
    ///
    /// Parameters
    /// ----------
    /// - `events`: `&EventList`
    ///   The validated events to bin by energy.
    ///
    /// Returns
    /// -------
    /// `CovResult<EnergyBinMap>`
    ///   N − 1 natural bins for N unique energies, every bin a band of
    ///   interest, arrival times sorted within each bin.
    ///
    /// Errors
    /// ------
    /// - `CovError::DegenerateEnergies` when all events share one energy
    ///   value, since no least-count width exists.
    pub fn from_events(events: &EventList) -> CovResult<Self> {
        let mut unique: Vec<f64> = events.events().iter().map(|e| e.energy).collect();
        unique.sort_by(f64::total_cmp);
        unique.dedup();

        if unique.len() < 2 {
            return Err(CovError::DegenerateEnergies);
        }

        let least_count = unique
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);

        let n_bins = unique.len() - 1;
        let mut bins: Vec<EnergyBin> = Vec::with_capacity(n_bins);
        for (i, &low) in unique[..n_bins].iter().enumerate() {
            let band = EnergyBand {
                low,
                high: low + least_count,
                representative: low + 0.5 * least_count,
                inclusive_high: i == n_bins - 1,
            };

            let mut arrival_times: Vec<f64> = events
                .events()
                .iter()
                .filter(|e| band.contains(e.energy))
                .map(|e| e.time)
                .collect();
            arrival_times.sort_by(f64::total_cmp);

            bins.push(EnergyBin { band, arrival_times });
        }

        let interest = (0..bins.len()).collect();
        Ok(EnergyBinMap { bins, interest, least_count })
    }

    /// Merge ranges of natural bins into bands of interest.
    ///
    /// Parameters
    /// ----------
    /// - `bands`: `&[(f64, f64)]`
    ///   Requested `[low, high]` ranges. Each collapses the not-yet-
    ///   claimed bins whose representative lies in the range (first
    ///   request wins on overlap) into one band represented by the range
    ///   midpoint.
    ///
    /// Returns
    /// -------
    /// `CovResult<EnergyBinMap>`
    ///   A fresh map: the merged bands plus every unclaimed natural bin,
    ///   re-ordered by representative energy; only the merged bands are
    ///   bins of interest. Member arrival-time lists concatenate in bin
    ///   order without re-sorting.
    ///
    /// Errors
    /// ------
    /// - `CovError::MalformedBand` for a non-finite or inverted range.
    pub fn merge(&self, bands: &[(f64, f64)]) -> CovResult<Self> {
        let mut claimed = vec![false; self.bins.len()];
        let mut entries: Vec<(EnergyBin, bool)> = Vec::new();

        for &(low, high) in bands {
            let band = EnergyBand::merged(low, high)?;
            let mut arrival_times: Vec<f64> = Vec::new();
            for (i, bin) in self.bins.iter().enumerate() {
                let rep = bin.band.representative;
                if !claimed[i] && low <= rep && rep <= high {
                    claimed[i] = true;
                    arrival_times.extend_from_slice(&bin.arrival_times);
                }
            }
            entries.push((EnergyBin { band, arrival_times }, true));
        }

        for (i, bin) in self.bins.iter().enumerate() {
            if !claimed[i] {
                entries.push((bin.clone(), false));
            }
        }

        entries.sort_by(|a, b| a.0.band.representative.total_cmp(&b.0.band.representative));

        let interest = entries
            .iter()
            .enumerate()
            .filter(|(_, (_, of_interest))| *of_interest)
            .map(|(i, _)| i)
            .collect();
        let bins = entries.into_iter().map(|(bin, _)| bin).collect();

        Ok(EnergyBinMap { bins, interest, least_count: self.least_count })
    }

    /// All bins, ordered by representative energy.
    pub fn bins(&self) -> &[EnergyBin] {
        &self.bins
    }

    /// Positional indices of the bins of interest, ascending.
    pub fn interest_indices(&self) -> &[usize] {
        &self.interest
    }

    /// The bins of interest, ordered by representative energy.
    pub fn bins_of_interest(&self) -> impl Iterator<Item = &EnergyBin> {
        self.interest.iter().map(|&i| &self.bins[i])
    }

    /// The least-count bin width derived from the unique energies.
    pub fn least_count(&self) -> f64 {
        self.least_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Natural binning: bin count, representatives, last-bin closure,
    //   per-bin time sorting, and the degenerate single-energy error.
    // - Merging: bookkeeping of claimed bins, preservation of total event
    //   count, concatenation order, and malformed-range rejection.
    //
    // They intentionally DO NOT cover:
    // - Covariance computation over the bins; that lives in the spectrum
    //   module and the integration test.
    // -------------------------------------------------------------------------

    fn sample_events() -> EventList {
        // Energies 1..=4 (least count 1), two photons per energy.
        EventList::from_pairs(&[
            (8.0, 1.0),
            (1.0, 1.0),
            (5.0, 2.0),
            (2.0, 2.0),
            (7.0, 3.0),
            (3.0, 3.0),
            (6.0, 4.0),
            (4.0, 4.0),
        ])
        .expect("sample events should validate")
    }

    #[test]
    // Purpose
    // -------
    // Verify natural binning: N unique energies yield N - 1 bins with the
    // documented representatives, the last bin closed so the maximum
    // energy is kept, and per-bin times sorted.
    //
    // Given
    // -----
    // - Energies 1..=4 with two photons each (least count 1).
    //
    // Expect
    // ------
    // - 3 bins with representatives [1.5, 2.5, 3.5]; the last bin holds
    //   the photons at energies 3 and 4; times sorted within each bin.
    fn energy_bin_map_from_events_builds_least_count_bins() {
        // Arrange
        let events = sample_events();

        // Act
        let map = EnergyBinMap::from_events(&events).unwrap();

        // Assert
        assert_eq!(map.bins().len(), 3);
        assert!((map.least_count() - 1.0).abs() < 1e-12);
        let reps: Vec<f64> = map.bins().iter().map(|b| b.band().representative()).collect();
        assert_eq!(reps, vec![1.5, 2.5, 3.5]);

        assert_eq!(map.bins()[0].arrival_times(), &[1.0, 8.0]);
        assert_eq!(map.bins()[1].arrival_times(), &[2.0, 5.0]);
        // Last bin is closed [3, 4]: energies 3 and 4 both belong.
        assert_eq!(map.bins()[2].arrival_times(), &[3.0, 4.0, 6.0, 7.0]);
        assert_eq!(map.interest_indices(), &[0, 1, 2]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a single-energy event list is rejected, since no least-count
    // width exists.
    //
    // Given
    // -----
    // - Three events all at energy 2.
    //
    // Expect
    // ------
    // - `Err(DegenerateEnergies)`.
    fn energy_bin_map_from_events_single_energy_is_degenerate() {
        // Arrange
        let events = EventList::from_pairs(&[(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)]).unwrap();

        // Act & Assert
        assert_eq!(EnergyBinMap::from_events(&events), Err(CovError::DegenerateEnergies));
    }

    #[test]
    // Purpose
    // -------
    // Verify merging: bins with representatives inside the range collapse
    // into one band of interest, unclaimed natural bins survive, the bin
    // count drops by (members - 1), and the total event count is
    // preserved.
    //
    // Given
    // -----
    // - The 3-bin sample map, merged over [1, 3] (claims reps 1.5, 2.5).
    //
    // Expect
    // ------
    // - 2 bins: the merged band (rep 2.0) and the natural rep-3.5 bin;
    //   only the merged band is of interest; 8 events in total.
    fn energy_bin_map_merge_collapses_bins_in_range() {
        // Arrange
        let map = EnergyBinMap::from_events(&sample_events()).unwrap();
        let total_before: usize = map.bins().iter().map(|b| b.arrival_times().len()).sum();

        // Act
        let merged = map.merge(&[(1.0, 3.0)]).unwrap();

        // Assert
        assert_eq!(merged.bins().len(), map.bins().len() - 1);
        let total_after: usize = merged.bins().iter().map(|b| b.arrival_times().len()).sum();
        assert_eq!(total_after, total_before);

        assert_eq!(merged.interest_indices(), &[0]);
        let band = merged.bins()[0].band();
        assert!((band.representative() - 2.0).abs() < 1e-12);
        assert!((merged.bins()[1].band().representative() - 3.5).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a merged band concatenates member arrival-time lists in
    // bin order without a global re-sort.
    //
    // Given
    // -----
    // - Bin 1 holds times [1, 8], bin 2 holds [2, 5]; merge over [1, 3].
    //
    // Expect
    // ------
    // - Merged times [1, 8, 2, 5].
    fn energy_bin_map_merge_concatenates_without_resorting() {
        // Arrange
        let map = EnergyBinMap::from_events(&sample_events()).unwrap();

        // Act
        let merged = map.merge(&[(1.0, 3.0)]).unwrap();

        // Assert
        assert_eq!(merged.bins()[0].arrival_times(), &[1.0, 8.0, 2.0, 5.0]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure malformed merge ranges are rejected.
    //
    // Given
    // -----
    // - An inverted range and a NaN bound.
    //
    // Expect
    // ------
    // - `Err(MalformedBand)` in both cases.
    fn energy_bin_map_merge_rejects_malformed_ranges() {
        // Arrange
        let map = EnergyBinMap::from_events(&sample_events()).unwrap();

        // Act & Assert
        assert_eq!(
            map.merge(&[(3.0, 1.0)]),
            Err(CovError::MalformedBand { low: 3.0, high: 1.0 })
        );
        assert!(matches!(
            map.merge(&[(f64::NAN, 2.0)]),
            Err(CovError::MalformedBand { .. })
        ));
    }
}
