//! Mutable simulation state: compartment counts, the simulation
//! clock, the owned random generator and the append-only history.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compartment::{Compartment, Snapshot};
use crate::error::SimulationError;

/// The full state of one simulation run.
///
/// The random generator is owned exclusively by this state. Two
/// independent runs (comparisons, parameter sweeps) must each build
/// their own `CompartmentState` so their draw sequences stay isolated
/// and reproducible.
#[derive(Clone, Debug)]
pub struct CompartmentState {
    compartments: Vec<Compartment>,
    compartment_map: HashMap<String, usize>,
    t: f64,
    rng: StdRng,
    history: Vec<Snapshot>,
}

impl CompartmentState {
    /// Build a state from an ordered list of compartments, seed its
    /// generator, and record the initial snapshot at `t = 0`.
    ///
    /// Compartment order is significant: it fixes the column order of
    /// every snapshot and the series order downstream.
    pub fn new(seed: u64, compartments: Vec<Compartment>) -> Result<Self, SimulationError> {
        Self::with_initial_time(seed, compartments, 0.0)
    }

    /// Like [`CompartmentState::new`], with a caller-supplied initial
    /// clock value.
    pub fn with_initial_time(
        seed: u64,
        compartments: Vec<Compartment>,
        initial_time: f64,
    ) -> Result<Self, SimulationError> {
        if !initial_time.is_finite() || initial_time < 0.0 {
            return Err(SimulationError::Configuration(format!(
                "initial time must be a non-negative finite number, got {initial_time}"
            )));
        }

        let mut compartment_map = HashMap::new();
        for (i, comp) in compartments.iter().enumerate() {
            if compartment_map.insert(comp.name.clone(), i).is_some() {
                return Err(SimulationError::Configuration(format!(
                    "duplicate compartment name '{}'",
                    comp.name
                )));
            }
        }

        let mut state = Self {
            compartments,
            compartment_map,
            t: initial_time,
            rng: StdRng::seed_from_u64(seed),
            history: Vec::new(),
        };
        state.record_snapshot();
        Ok(state)
    }

    /// Move `count` individuals from `source` to `target`, atomically.
    ///
    /// Both compartments are validated before either is touched, so a
    /// failed transition leaves every count unchanged. History is not
    /// recorded here; callers snapshot explicitly after each event.
    pub fn transition(
        &mut self,
        source: &str,
        target: &str,
        count: u64,
    ) -> Result<(), SimulationError> {
        let source_idx = *self.compartment_map.get(source).ok_or_else(|| {
            SimulationError::InvalidTransition(format!("unknown source compartment '{source}'"))
        })?;
        let target_idx = *self.compartment_map.get(target).ok_or_else(|| {
            SimulationError::InvalidTransition(format!("unknown target compartment '{target}'"))
        })?;

        let available = self.compartments[source_idx].count;
        if count > available {
            return Err(SimulationError::InvalidTransition(format!(
                "cannot move {count} individuals from '{source}' to '{target}': only {available} available"
            )));
        }

        self.compartments[source_idx].count -= count;
        self.compartments[target_idx].count += count;
        Ok(())
    }

    /// Append `(t, counts...)` to the history, counts in declaration
    /// order.
    pub fn record_snapshot(&mut self) {
        self.history.push(Snapshot {
            t: self.t,
            counts: self.compartments.iter().map(|c| c.count).collect(),
        });
    }

    /// Sum of all compartment counts.
    pub fn total_population(&self) -> u64 {
        self.compartments.iter().map(|c| c.count).sum()
    }

    /// Draw one sample from an exponential distribution with the
    /// given rate, using this state's owned generator.
    pub fn sample_exponential(&mut self, rate: f64) -> Result<f64, SimulationError> {
        if !(rate > 0.0) {
            return Err(SimulationError::InvalidRate(rate));
        }
        let u: f64 = self.rng.random();
        Ok(-u.ln() / rate)
    }

    /// Read a compartment count by name.
    pub fn count(&self, name: &str) -> Result<u64, SimulationError> {
        self.compartment_map
            .get(name)
            .map(|&i| self.compartments[i].count)
            .ok_or_else(|| SimulationError::UnknownCompartment(name.to_string()))
    }

    /// Overwrite a compartment count by name.
    ///
    /// Bypasses the conservation guarantee of [`Self::transition`];
    /// intended for setup code, not for event loops.
    pub fn set_count(&mut self, name: &str, value: u64) -> Result<(), SimulationError> {
        match self.compartment_map.get(name) {
            Some(&i) => {
                self.compartments[i].count = value;
                Ok(())
            }
            None => Err(SimulationError::UnknownCompartment(name.to_string())),
        }
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Advance the clock by `dt`. The clock is monotonic; a negative
    /// or non-finite `dt` is rejected.
    pub fn advance_time(&mut self, dt: f64) -> Result<(), SimulationError> {
        if !(dt >= 0.0) {
            return Err(SimulationError::Configuration(format!(
                "time step must be non-negative, got {dt}"
            )));
        }
        self.t += dt;
        Ok(())
    }

    /// The accumulated trajectory, in chronological order. Never empty
    /// after construction.
    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    /// Declared compartment names, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.compartments.iter().map(|c| c.name.clone()).collect()
    }

    /// Declared display colors, in declaration order.
    pub fn colors(&self) -> Vec<String> {
        self.compartments
            .iter()
            .map(|c| c.display_color.clone())
            .collect()
    }

    /// The declared compartments with their live counts.
    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sir_compartments(s: u64, i: u64, r: u64) -> Vec<Compartment> {
        vec![
            Compartment::new("S", "#0057b7", s),
            Compartment::new("I", "#fb4d4d", i),
            Compartment::new("R", "#3AF4A3", r),
        ]
    }

    #[test]
    fn construction_records_initial_snapshot() {
        let state = CompartmentState::new(42, sir_compartments(990, 10, 0)).unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].t, 0.0);
        assert_eq!(state.history()[0].counts, vec![990, 10, 0]);
        assert_eq!(state.total_population(), 1000);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let comps = vec![
            Compartment::new("S", "#0057b7", 10),
            Compartment::new("S", "#fb4d4d", 5),
        ];
        let err = CompartmentState::new(1, comps).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn negative_initial_time_is_rejected() {
        let err = CompartmentState::with_initial_time(1, sir_compartments(1, 0, 0), -1.0)
            .unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn transition_moves_individuals() {
        let mut state = CompartmentState::new(42, sir_compartments(990, 10, 0)).unwrap();
        state.transition("S", "I", 3).unwrap();
        assert_eq!(state.count("S").unwrap(), 987);
        assert_eq!(state.count("I").unwrap(), 13);
        assert_eq!(state.total_population(), 1000);
    }

    #[test]
    fn overdraw_fails_and_leaves_counts_unchanged() {
        let mut state = CompartmentState::new(42, sir_compartments(3, 10, 0)).unwrap();
        let err = state.transition("S", "I", 5).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidTransition(_)));
        assert_eq!(state.count("S").unwrap(), 3);
        assert_eq!(state.count("I").unwrap(), 10);
    }

    #[test]
    fn transition_with_unknown_name_fails() {
        let mut state = CompartmentState::new(42, sir_compartments(10, 1, 0)).unwrap();
        assert!(matches!(
            state.transition("X", "I", 1),
            Err(SimulationError::InvalidTransition(_))
        ));
        assert!(matches!(
            state.transition("S", "X", 1),
            Err(SimulationError::InvalidTransition(_))
        ));
    }

    #[test]
    fn named_access_rejects_undeclared_compartments() {
        let mut state = CompartmentState::new(42, sir_compartments(10, 1, 0)).unwrap();
        assert!(matches!(
            state.count("E"),
            Err(SimulationError::UnknownCompartment(_))
        ));
        assert!(matches!(
            state.set_count("E", 7),
            Err(SimulationError::UnknownCompartment(_))
        ));
        state.set_count("R", 7).unwrap();
        assert_eq!(state.count("R").unwrap(), 7);
    }

    #[test]
    fn exponential_sampling_is_positive_and_seeded() {
        let mut a = CompartmentState::new(7, sir_compartments(10, 1, 0)).unwrap();
        let mut b = CompartmentState::new(7, sir_compartments(10, 1, 0)).unwrap();
        for _ in 0..100 {
            let da = a.sample_exponential(2.5).unwrap();
            let db = b.sample_exponential(2.5).unwrap();
            assert!(da >= 0.0);
            assert_eq!(da, db);
        }
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        let mut state = CompartmentState::new(42, sir_compartments(10, 1, 0)).unwrap();
        assert!(matches!(
            state.sample_exponential(0.0),
            Err(SimulationError::InvalidRate(_))
        ));
        assert!(matches!(
            state.sample_exponential(-1.0),
            Err(SimulationError::InvalidRate(_))
        ));
    }

    #[test]
    fn clock_is_monotonic() {
        let mut state = CompartmentState::new(42, sir_compartments(10, 1, 0)).unwrap();
        state.advance_time(1.5).unwrap();
        state.advance_time(0.0).unwrap();
        assert_eq!(state.time(), 1.5);
        assert!(matches!(
            state.advance_time(-0.1),
            Err(SimulationError::Configuration(_))
        ));
        assert_eq!(state.time(), 1.5);
    }

    #[test]
    fn names_and_colors_preserve_declaration_order() {
        let state = CompartmentState::new(42, sir_compartments(1, 2, 3)).unwrap();
        assert_eq!(state.names(), vec!["S", "I", "R"]);
        assert_eq!(state.colors(), vec!["#0057b7", "#fb4d4d", "#3AF4A3"]);
    }

    #[test]
    fn snapshots_serialize_in_column_order() {
        let mut state = CompartmentState::new(42, sir_compartments(5, 1, 0)).unwrap();
        state.transition("S", "I", 1).unwrap();
        state.advance_time(0.25).unwrap();
        state.record_snapshot();

        let json = serde_json::to_string(state.history()).unwrap();
        assert_eq!(
            json,
            r#"[{"t":0.0,"counts":[5,1,0]},{"t":0.25,"counts":[4,2,0]}]"#
        );
    }
}
