//! The automation engine boundary.
//!
//! Keel never drives the engine beyond spawning it. What comes back is an
//! ordered stream of [`Event`]s that the explainers turn into narration.

mod event;
mod runner;

pub use event::{Event, RunnerResult};
pub use runner::{Runner, pump};
