use thiserror::Error;

/// Errors that can occur while constructing or running a simulation.
///
/// All variants are terminal for the current call: a failed run leaves
/// the state with no history entries beyond the last valid snapshot,
/// and nothing is retried.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Invalid construction or run parameters (duplicate compartment
    /// names, non-positive infectious period, `max_time` not beyond
    /// the current clock, unreadable scenario file, ...).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A transition would drive a compartment negative or references
    /// an unknown source/target compartment.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Access to a compartment name that was not declared at
    /// construction.
    #[error("unknown compartment: {0}")]
    UnknownCompartment(String),

    /// An exponential sample was requested with a non-positive rate.
    /// Engines special-case zero-rate channels before sampling, so
    /// this surfacing indicates a defect in the caller.
    #[error("exponential rate must be positive, got {0}")]
    InvalidRate(f64),
}
