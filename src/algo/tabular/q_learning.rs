use std::mem;

use log::debug;
use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};
use strum::IntoEnumIterator;

use crate::{
    action::StrategyAction,
    assert_interval,
    decay::{self, Decay},
    env::Arena,
    exploration::{Choice, EpsilonGreedy},
    state::{Discretiser, State},
};

use super::q_table::QTable;

/// Configuration for the [`QLearning`] core
#[derive(Debug, Clone)]
pub struct QLearningConfig<D: Decay> {
    /// Exploration policy, its epsilon is evaluated once per episode
    ///
    /// **Default**: a [`Constant`](decay::Constant) epsilon of `0.1`
    pub exploration: EpsilonGreedy<D>,
    /// Learning rate, in `[0, 1]`
    ///
    /// **Default**: `0.5`
    pub alpha: f32,
    /// Discount factor, in `[0, 1]`
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// Numerator of the reward for staying away from the mist
    ///
    /// **Default**: `100.0`
    pub reward_const: f32,
    /// Magnitude of the punishment for reaching the mist
    ///
    /// **Default**: `5.0`
    pub punishment_const: f32,
    /// Bucketisation of observations into states
    pub discretiser: Discretiser,
}

impl Default for QLearningConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.1)),
            alpha: 0.5,
            gamma: 0.9,
            reward_const: 100.0,
            punishment_const: 5.0,
            discretiser: Discretiser::default(),
        }
    }
}

/// Tabular Q-learning over [`StrategyAction`]s
///
/// Each call to [`attempt`](QLearning::attempt) picks an action for the current turn and
/// credits the pair chosen on the previous turn. Between episodes, [`reset`](QLearning::reset)
/// forgets that pair so no credit leaks across episode boundaries.
///
/// The look-ahead term of the update is the value of the pair chosen *this* turn,
/// `Q(s, a)`, not `max_a' Q(s', a')`.
pub struct QLearning<D: Decay = decay::Constant> {
    q_table: QTable<State, StrategyAction>,
    exploration: EpsilonGreedy<D>,
    alpha: f32,
    gamma: f32,
    reward_const: f32,
    punishment_const: f32,
    discretiser: Discretiser,
    pending: Option<(State, StrategyAction)>,
    reward_sum: f32,
    episode: u32,
    rng: StdRng,
}

impl<D: Decay> QLearning<D> {
    /// Initialize the learner on top of an existing table
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: QLearningConfig<D>, q_table: QTable<State, StrategyAction>) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table,
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            reward_const: config.reward_const,
            punishment_const: config.punishment_const,
            discretiser: config.discretiser,
            pending: None,
            reward_sum: 0.0,
            episode: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source, e.g. with a seeded one
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn q_table(&self) -> &QTable<State, StrategyAction> {
        &self.q_table
    }

    /// The state-action pair awaiting credit, `None` between episodes
    pub fn pending(&self) -> Option<&(State, StrategyAction)> {
        self.pending.as_ref()
    }

    /// Sum of rewards collected so far in this episode
    pub fn reward_sum(&self) -> f32 {
        self.reward_sum
    }

    /// Number of completed episodes
    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon(self.episode)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn reward_const(&self) -> f32 {
        self.reward_const
    }

    pub fn punishment_const(&self) -> f32 {
        self.punishment_const
    }

    /// The highest valued action in `state`, the first declared one on ties
    pub fn best_action(&self, state: &State) -> StrategyAction {
        StrategyAction::iter()
            .map(|action| (action, self.q_table.get(state, &action)))
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .map(|(action, _)| action)
            .unwrap_or_default()
    }

    /// Epsilon-greedy choice of action in `state`
    pub fn pick_action(&mut self, state: &State) -> StrategyAction {
        match self.exploration.choose(self.episode, &mut self.rng) {
            Choice::Explore => StrategyAction::iter()
                .choose(&mut self.rng)
                .unwrap_or_default(),
            Choice::Exploit => self.best_action(state),
        }
    }

    /// Credit the pending pair with `reward`, then make `(state, action)` the pending pair
    ///
    /// The first call of an episode only records the pair.
    pub fn update_q(&mut self, state: State, action: StrategyAction, reward: f32) {
        if let Some((old_state, old_action)) = self.pending.take() {
            let target = reward + self.gamma * self.q_table.get(&state, &action);
            let old_value = self.q_table.get(&old_state, &old_action);
            self.q_table.set(
                old_state,
                old_action,
                old_value + self.alpha * (target - old_value),
            );
        }
        self.pending = Some((state, action));
    }

    /// Reward for the current turn given the distance to the mist
    ///
    /// Staying away from the mist pays `floor(reward_const / d)`. Standing on the menhir
    /// pays `1`. Otherwise the agent is punished: by `punishment_const` at the mist's edge
    /// or after heading for the menhir, and in proportion to how deep it is in the mist
    /// otherwise.
    pub fn reward(&self, mist_distance: f32, at_menhir: bool) -> f32 {
        let last_action = self.pending.as_ref().map(|(_, action)| *action);
        if mist_distance > 0.0 {
            (self.reward_const / mist_distance).floor()
        } else if at_menhir {
            1.0
        } else if mist_distance == 0.0 || last_action == Some(StrategyAction::GoToMenhir) {
            -self.punishment_const
        } else {
            -self.punishment_const * mist_distance.abs()
        }
    }

    /// Reward for the arena's current view
    pub fn calculate_reward<A: Arena>(&self, arena: &A) -> f32 {
        self.reward(arena.mist_distance(), arena.position() == arena.menhir())
    }

    /// Play one turn: observe, choose, collect the reward and learn from it
    pub fn attempt<A: Arena>(&mut self, arena: &A) -> StrategyAction {
        let state = self.discretiser.observe(arena);
        let action = self.pick_action(&state);
        let reward = self.calculate_reward(arena);
        debug!("{state:?} -> {action:?} (reward {reward})");
        self.reward_sum += reward;
        self.update_q(state, action, reward);
        action
    }

    /// End the current episode
    ///
    /// **Returns** the rewards accumulated during the episode
    pub fn reset(&mut self) -> f32 {
        if self.pending.take().is_some() {
            self.episode += 1;
        }
        mem::take(&mut self.reward_sum)
    }
}
