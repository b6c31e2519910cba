use serde::{Deserialize, Serialize};

/// A named subpopulation with a live count.
///
/// The display color is an opaque label passed through to rendering
/// collaborators (legend/series coloring); the core never interprets
/// it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Compartment {
    pub name: String,
    pub display_color: String,
    pub count: u64,
}

impl Compartment {
    pub fn new(name: impl Into<String>, display_color: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            display_color: display_color.into(),
            count,
        }
    }
}

/// One recorded point of a trajectory: the simulation time plus every
/// compartment count, in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub t: f64,
    pub counts: Vec<u64>,
}
