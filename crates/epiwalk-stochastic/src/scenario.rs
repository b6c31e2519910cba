//! Scenario configuration: the numeric input boundary between the
//! control surface (UI, notebooks, batch scripts) and the engine.

use std::path::Path;

use epiwalk_core::{CompartmentState, SimulationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{sir_state, SirEngine};

/// A complete, serializable description of one SIR run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SirScenario {
    pub population_size: u64,
    pub initial_infectious: u64,
    #[serde(default)]
    pub initial_recovered: u64,
    pub seed: u64,
    pub r0: f64,
    pub infectious_period: f64,
    pub max_time: f64,
}

impl SirScenario {
    /// Parse a scenario from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::Configuration(format!("invalid scenario JSON: {e}")))
    }

    /// Load a scenario from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            SimulationError::Configuration(format!(
                "cannot open scenario file '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        serde_json::from_reader(file)
            .map_err(|e| SimulationError::Configuration(format!("invalid scenario JSON: {e}")))
    }

    /// Serialize the scenario to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::Configuration(e.to_string()))
    }

    /// Initial susceptible count implied by the other fields.
    pub fn initial_susceptible(&self) -> u64 {
        self.population_size
            .saturating_sub(self.initial_infectious)
            .saturating_sub(self.initial_recovered)
    }

    /// Check the scenario's numeric constraints.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.initial_infectious + self.initial_recovered > self.population_size {
            return Err(SimulationError::Configuration(format!(
                "initial infectious ({}) plus recovered ({}) exceed the population size ({})",
                self.initial_infectious, self.initial_recovered, self.population_size
            )));
        }
        if !(self.max_time > 0.0) {
            return Err(SimulationError::Configuration(format!(
                "max_time must be positive, got {}",
                self.max_time
            )));
        }
        // Rate parameters are re-checked by SirEngine::new; failing
        // here keeps scenario errors ahead of any state construction.
        SirEngine::new(self.r0, self.infectious_period)?;
        Ok(())
    }

    /// Build the seeded state and the engine this scenario describes.
    pub fn build(&self) -> Result<(CompartmentState, SirEngine), SimulationError> {
        self.validate()?;
        let state = sir_state(
            self.seed,
            self.initial_susceptible(),
            self.initial_infectious,
            self.initial_recovered,
        )?;
        let engine = SirEngine::new(self.r0, self.infectious_period)?;
        debug!(
            seed = self.seed,
            susceptible = self.initial_susceptible(),
            infectious = self.initial_infectious,
            recovered = self.initial_recovered,
            "built scenario state"
        );
        Ok((state, engine))
    }

    /// Run the scenario to completion and return the mutated state,
    /// whose history is the simulation output.
    pub fn run(&self) -> Result<CompartmentState, SimulationError> {
        let (mut state, engine) = self.build()?;
        engine.run(&mut state, self.max_time)?;
        Ok(state)
    }
}
