//! # epiwalk-core
//!
//! Core building blocks for stochastic compartmental epidemic models:
//! named population compartments, the mutable simulation state with its
//! owned random generator, and the append-only trajectory history that
//! downstream renderers and exporters consume.
//!
//! This crate knows nothing about any particular epidemic model; the
//! transition structure (SIR, SEIR, ...) lives in the engine crates
//! that implement [`SimulationEngine`].

pub mod compartment;
pub mod error;
pub mod state;

pub use compartment::{Compartment, Snapshot};
pub use error::SimulationError;
pub use state::CompartmentState;

/// Common interface for engines that drive a [`CompartmentState`]
/// forward in time.
///
/// An engine owns the model-specific transition structure and rates;
/// the state owns the counts, the clock, the random generator and the
/// history. `run` mutates the state in place until `max_time` is
/// reached or no further events are possible, recording one history
/// snapshot per event.
pub trait SimulationEngine {
    /// Advance `state` until `state.time()` reaches `max_time` or the
    /// process hits an absorbing state.
    fn run(&self, state: &mut CompartmentState, max_time: f64) -> Result<(), SimulationError>;
}
