use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// A high-level strategy the agent can follow for one turn
///
/// The declaration order is significant: when several actions share the best
/// Q value, the first one declared wins.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Default, EnumIter, Serialize, Deserialize,
)]
pub enum StrategyAction {
    /// Take the host's precomputed step toward the menhir
    #[default]
    GoToMenhir,
    /// Look around instead of moving
    Scan,
}

impl StrategyAction {
    /// All actions in declaration order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}
