//! covariance::events — validated photon event lists.
//!
//! Purpose
//! -------
//! Own the raw input of the covariance layer: a non-empty list of
//! `(arrival_time, energy)` pairs, validated once at construction so the
//! binning and spectrum code can assume finite values throughout.
//!
//! Conventions
//! -----------
//! - Events are kept in the order supplied; per-bin arrival times are
//!   sorted later, during energy binning.
//! - Scalar extrema (`min_time`, `max_time`, `min_energy`, `max_energy`)
//!   are computed once at construction.

use crate::covariance::errors::{CovError, CovResult};

/// A single photon detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: f64,
    pub energy: f64,
}

/// EventList — validated, non-empty collection of photon events.
///
/// Invariants
/// ----------
/// - At least one event; every time and energy finite.
#[derive(Debug, Clone, PartialEq)]
pub struct EventList {
    events: Vec<Event>,
    min_time: f64,
    max_time: f64,
    min_energy: f64,
    max_energy: f64,
}

impl EventList {
    /// Construct a validated event list.
    ///
    /// Parameters
    /// ----------
    /// - `events`: `Vec<Event>`
    ///   The `(time, energy)` pairs. Must be non-empty and entirely
    ///   finite.
    ///
    /// Returns
    /// -------
    /// `CovResult<EventList>`
    ///   The list with its extrema precomputed.
    ///
    /// Errors
    /// ------
    /// - `CovError::EmptyEventList` for an empty input.
    /// - `CovError::NonFiniteEvent` identifying the first event with a
    ///   NaN or infinite component.
    pub fn new(events: Vec<Event>) -> CovResult<Self> {
        if events.is_empty() {
            return Err(CovError::EmptyEventList);
        }

        for (index, event) in events.iter().enumerate() {
            if !event.time.is_finite() || !event.energy.is_finite() {
                return Err(CovError::NonFiniteEvent {
                    index,
                    time: event.time,
                    energy: event.energy,
                });
            }
        }

        let min_time = events.iter().map(|e| e.time).fold(f64::INFINITY, f64::min);
        let max_time = events.iter().map(|e| e.time).fold(f64::NEG_INFINITY, f64::max);
        let min_energy = events.iter().map(|e| e.energy).fold(f64::INFINITY, f64::min);
        let max_energy = events.iter().map(|e| e.energy).fold(f64::NEG_INFINITY, f64::max);

        Ok(EventList { events, min_time, max_time, min_energy, max_energy })
    }

    /// Convenience constructor from parallel `(time, energy)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> CovResult<Self> {
        EventList::new(pairs.iter().map(|&(time, energy)| Event { time, energy }).collect())
    }

    /// The validated events, in input order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always `false`; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Arrival time of the earliest photon.
    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    /// Arrival time of the latest photon.
    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Lowest photon energy.
    pub fn min_energy(&self) -> f64 {
        self.min_energy
    }

    /// Highest photon energy.
    pub fn max_energy(&self) -> f64 {
        self.max_energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify construction from pairs and the precomputed extrema.
    //
    // Given
    // -----
    // - Pairs spanning times [1, 9] and energies [0.5, 3.5].
    //
    // Expect
    // ------
    // - Extrema match and the events retain input order.
    fn event_list_new_computes_extrema() {
        // Arrange & Act
        let list = EventList::from_pairs(&[(9.0, 0.5), (1.0, 3.5), (4.0, 2.0)]).unwrap();

        // Assert
        assert_eq!(list.len(), 3);
        assert_eq!(list.min_time(), 1.0);
        assert_eq!(list.max_time(), 9.0);
        assert_eq!(list.min_energy(), 0.5);
        assert_eq!(list.max_energy(), 3.5);
        assert_eq!(list.events()[0], Event { time: 9.0, energy: 0.5 });
    }

    #[test]
    // Purpose
    // -------
    // Ensure empty and non-finite inputs are rejected with the documented
    // errors, including the offending index.
    //
    // Given
    // -----
    // - An empty list; a list with a NaN energy at index 1.
    //
    // Expect
    // ------
    // - `Err(EmptyEventList)` and `Err(NonFiniteEvent { index: 1, .. })`.
    fn event_list_new_rejects_empty_and_non_finite_input() {
        // Arrange & Act & Assert
        assert_eq!(EventList::new(Vec::new()), Err(CovError::EmptyEventList));

        match EventList::from_pairs(&[(1.0, 2.0), (2.0, f64::NAN)]) {
            Err(CovError::NonFiniteEvent { index, energy, .. }) => {
                assert_eq!(index, 1);
                assert!(!energy.is_finite());
            }
            other => panic!("expected NonFiniteEvent, got {other:?}"),
        }
    }
}
