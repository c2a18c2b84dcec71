use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    algo::tabular::q_learning::QLearningConfig,
    decay::{self, Decay},
};

/// Colour of the champion's tabard as rendered by the host
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tabard {
    Blue,
    Brown,
    #[default]
    Grey,
    Red,
    Violet,
    White,
    Yellow,
}

/// Configuration for the [`ShallowMindController`](crate::controller::ShallowMindController)
#[derive(Debug, Clone)]
pub struct ShallowMindConfig<D: Decay> {
    /// Hyperparameters of the learner
    pub learning: QLearningConfig<D>,
    /// Whether to persist the table and the episode log on teardown
    ///
    /// **Default**: `false`
    pub learn: bool,
    /// Where the Q-table is loaded from and saved to
    ///
    /// **Default**: `resources/models/shallow_mind/q_learning.json`
    pub model_path: PathBuf,
    /// Directory receiving episode logs
    ///
    /// **Default**: `logs`
    pub logs_dir: PathBuf,
    /// Tabard requested from the host
    ///
    /// **Default**: [`Tabard::Grey`]
    pub tabard: Tabard,
}

impl Default for ShallowMindConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            learning: QLearningConfig::default(),
            learn: false,
            model_path: PathBuf::from("resources/models/shallow_mind/q_learning.json"),
            logs_dir: PathBuf::from("logs"),
            tabard: Tabard::default(),
        }
    }
}

impl<D: Decay> ShallowMindConfig<D> {
    /// A log file name for the controller called `first_name`, tagged with the
    /// creation time and the hyperparameters
    pub fn episode_log_path(&self, first_name: &str) -> PathBuf {
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let QLearningConfig {
            exploration,
            alpha,
            gamma,
            reward_const,
            punishment_const,
            ..
        } = &self.learning;
        self.logs_dir.join(format!(
            "{started}_{first_name}_EPS-{}_LR-{alpha}_DF-{gamma}_RC-{reward_const}_PC-{punishment_const}.csv",
            exploration.epsilon(0),
        ))
    }
}
