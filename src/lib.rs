/// Strategic actions available to the agent
pub mod action;

/// Tabular RL algorithms
pub mod algo;

/// Plugin configuration
pub mod config;

/// Host-facing controller
pub mod controller;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// The host's view of the arena
pub mod env;

mod error;

/// Exploration policies
pub mod exploration;

/// Per-episode training log
pub mod report;

/// State discretisation
pub mod state;

mod util;

pub use error::{Error, Result};
