//! Event-driven stochastic SIR engine.
//!
//! Simulates the Susceptible → Infectious → Recovered process as a
//! continuous-time Markov chain over a
//! [`CompartmentState`](epiwalk_core::CompartmentState). Each loop
//! iteration re-derives the instantaneous infection and recovery rates
//! from the current counts, draws one candidate waiting time per
//! event channel from competing exponential clocks, applies the
//! winning one-individual transition, and records a snapshot.
//!
//! The two-draw formulation (one exponential per channel, minimum
//! wins) is mathematically equivalent to the single-draw Gillespie
//! method with rate-proportional event selection; it is kept because
//! the exact sequence of generator draws is part of the reproducible
//! output contract. Collapsing it to a single draw would change every
//! seeded trajectory.

use epiwalk_core::{Compartment, CompartmentState, SimulationEngine, SimulationError};
use tracing::debug;

pub mod scenario;

pub use scenario::SirScenario;

/// Compartment name for susceptible individuals.
pub const SUSCEPTIBLE: &str = "S";
/// Compartment name for infectious individuals.
pub const INFECTIOUS: &str = "I";
/// Compartment name for recovered individuals.
pub const RECOVERED: &str = "R";

const SUSCEPTIBLE_COLOR: &str = "#0057b7";
const INFECTIOUS_COLOR: &str = "#fb4d4d";
const RECOVERED_COLOR: &str = "#3AF4A3";

/// Build an S/I/R state with the standard palette and record its
/// initial snapshot at `t = 0`.
pub fn sir_state(
    seed: u64,
    susceptible: u64,
    infectious: u64,
    recovered: u64,
) -> Result<CompartmentState, SimulationError> {
    CompartmentState::new(
        seed,
        vec![
            Compartment::new(SUSCEPTIBLE, SUSCEPTIBLE_COLOR, susceptible),
            Compartment::new(INFECTIOUS, INFECTIOUS_COLOR, infectious),
            Compartment::new(RECOVERED, RECOVERED_COLOR, recovered),
        ],
    )
}

/// Move `count` individuals from S to I.
pub fn infect(state: &mut CompartmentState, count: u64) -> Result<(), SimulationError> {
    state.transition(SUSCEPTIBLE, INFECTIOUS, count)
}

/// Move `count` individuals from I to R.
pub fn recover(state: &mut CompartmentState, count: u64) -> Result<(), SimulationError> {
    state.transition(INFECTIOUS, RECOVERED, count)
}

/// Gillespie-style SIR engine.
///
/// Holds the epidemic parameters; the counts, clock, generator and
/// history stay in the [`CompartmentState`] it drives.
#[derive(Clone, Debug)]
pub struct SirEngine {
    r0: f64,
    infectious_period: f64,
}

impl SirEngine {
    /// Create an engine from the basic reproduction number and the
    /// mean infectious period (in simulation time units).
    pub fn new(r0: f64, infectious_period: f64) -> Result<Self, SimulationError> {
        if !(infectious_period > 0.0) {
            return Err(SimulationError::Configuration(format!(
                "infectious period must be positive, got {infectious_period}"
            )));
        }
        if !(r0 >= 0.0) {
            return Err(SimulationError::Configuration(format!(
                "basic reproduction number must be non-negative, got {r0}"
            )));
        }
        Ok(Self {
            r0,
            infectious_period,
        })
    }

    /// Transmission rate `beta = r0 / infectious_period`.
    pub fn beta(&self) -> f64 {
        self.r0 / self.infectious_period
    }

    /// Recovery rate `gamma = 1 / infectious_period`.
    pub fn gamma(&self) -> f64 {
        1.0 / self.infectious_period
    }

    /// Run the event loop until the clock reaches `max_time` or the
    /// absorbing state (no infectious individuals, or no event with a
    /// positive rate) is hit.
    ///
    /// Each event moves exactly one individual (S→I or I→R), advances
    /// the clock by the winning waiting time, and appends one snapshot.
    /// An event whose waiting time would carry the clock past
    /// `max_time` is not applied, so the final snapshot always
    /// satisfies `t <= max_time`.
    pub fn run(
        &self,
        state: &mut CompartmentState,
        max_time: f64,
    ) -> Result<(), SimulationError> {
        if !(max_time > state.time()) {
            return Err(SimulationError::Configuration(format!(
                "max_time ({max_time}) must be greater than the current time ({})",
                state.time()
            )));
        }

        debug!(
            r0 = self.r0,
            infectious_period = self.infectious_period,
            max_time,
            population = state.total_population(),
            "starting stochastic SIR run"
        );

        while state.time() < max_time {
            let susceptible = state.count(SUSCEPTIBLE)? as f64;
            let infectious = state.count(INFECTIOUS)? as f64;
            let population = state.total_population() as f64;

            let rate_infection = if population > 0.0 {
                self.beta() * susceptible * infectious / population
            } else {
                0.0
            };
            let rate_recovery = self.gamma() * infectious;

            if rate_infection + rate_recovery == 0.0 {
                debug!(t = state.time(), "absorbing state reached");
                break;
            }

            // Competing exponential clocks, drawn in a fixed order so
            // the trajectory is a pure function of the seed. A
            // zero-rate channel never fires and must not consume a
            // draw.
            let dt_infection = candidate_waiting_time(state, rate_infection)?;
            let dt_recovery = candidate_waiting_time(state, rate_recovery)?;

            // Ties go to recovery.
            let (dt, source, target) = if dt_infection < dt_recovery {
                (dt_infection, SUSCEPTIBLE, INFECTIOUS)
            } else {
                (dt_recovery, INFECTIOUS, RECOVERED)
            };

            if state.time() + dt > max_time {
                debug!(t = state.time(), "next event falls beyond max_time");
                break;
            }

            state.transition(source, target, 1)?;
            state.advance_time(dt)?;
            state.record_snapshot();
        }

        debug!(
            t = state.time(),
            events = state.history().len() - 1,
            "stochastic SIR run finished"
        );
        Ok(())
    }
}

impl SimulationEngine for SirEngine {
    fn run(&self, state: &mut CompartmentState, max_time: f64) -> Result<(), SimulationError> {
        SirEngine::run(self, state, max_time)
    }
}

/// Waiting time for one event channel. A channel with rate zero can
/// never win the race, so it yields infinity instead of invoking the
/// sampler (which rejects non-positive rates).
fn candidate_waiting_time(
    state: &mut CompartmentState,
    rate: f64,
) -> Result<f64, SimulationError> {
    if rate == 0.0 {
        return Ok(f64::INFINITY);
    }
    state.sample_exponential(rate)
}
