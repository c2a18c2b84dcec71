use std::{
    hash::{Hash, Hasher},
    path::PathBuf,
};

use log::{info, warn};

use crate::{
    action::StrategyAction,
    algo::{QLearning, QTable},
    config::{ShallowMindConfig, Tabard},
    decay::{self, Decay},
    env::Arena,
    report::{EpisodeLog, EpisodeRecord},
    Result,
};

/// The plugin the game host drives
///
/// The host calls [`reset`](Self::reset) at the start of every episode and
/// [`decide`](Self::decide) once per turn. Controllers are identified by their first
/// name only, so the host can deduplicate them in a collection.
///
/// When learning is enabled, the Q-table and the episode log are written when the
/// controller is dropped.
pub struct ShallowMindController<A: Arena, D: Decay = decay::Constant> {
    first_name: String,
    tabard: Tabard,
    arena: Option<A>,
    q_learning: QLearning<D>,
    episode_log: EpisodeLog,
    learn: bool,
    model_path: PathBuf,
}

impl<A: Arena, D: Decay> ShallowMindController<A, D> {
    /// Create a controller, resuming from the persisted table when one can be read
    pub fn new(first_name: impl Into<String>, config: ShallowMindConfig<D>) -> Self {
        let first_name = first_name.into();
        let episode_log = EpisodeLog::new(config.episode_log_path(&first_name));
        let ShallowMindConfig {
            learning,
            learn,
            model_path,
            tabard,
            ..
        } = config;
        let q_learning = QLearning::new(learning, QTable::load_or_default(&model_path));
        Self {
            first_name,
            tabard,
            arena: None,
            q_learning,
            episode_log,
            learn,
            model_path,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn name(&self) -> String {
        format!("ShallowMindController{}", self.first_name)
    }

    /// Colour the host dresses this controller's champion in
    pub fn preferred_tabard(&self) -> Tabard {
        self.tabard
    }

    pub fn q_learning(&self) -> &QLearning<D> {
        &self.q_learning
    }

    pub fn episode_log(&self) -> &EpisodeLog {
        &self.episode_log
    }

    /// Start a new episode in `arena`, closing the previous one
    pub fn reset(&mut self, arena: A) {
        let reward = self.q_learning.reset();
        if let Some(previous) = self.arena.as_ref() {
            info!("{} finished an episode with reward {reward}", self.name());
            if self.learn {
                self.episode_log.push(EpisodeRecord {
                    reward,
                    arrived: previous.position() == previous.menhir(),
                    dist: previous.route_to_menhir().time,
                });
            }
        }
        self.arena = Some(arena);
    }

    /// Choose this turn's move
    ///
    /// Before the first [`reset`](Self::reset) there is no arena to act in and the
    /// host's no-op action is returned.
    pub fn decide(&mut self, knowledge: &A::Knowledge) -> A::Action {
        let Some(arena) = self.arena.as_mut() else {
            warn!("{} asked to decide before any episode started", self.name());
            return A::Action::default();
        };
        arena.observe(knowledge);
        match self.q_learning.attempt(&*arena) {
            StrategyAction::GoToMenhir => arena.route_to_menhir().action,
            StrategyAction::Scan => arena.scan_action(),
        }
    }

    /// Persist the Q-table and the episode log when learning is enabled
    pub fn save(&self) -> Result<()> {
        if !self.learn {
            return Ok(());
        }
        self.q_learning.q_table().save(&self.model_path)?;
        info!(
            "Saved Q-table with {} entries to {}",
            self.q_learning.q_table().len(),
            self.model_path.display()
        );
        self.episode_log.write()
    }
}

impl<A: Arena, D: Decay> Drop for ShallowMindController<A, D> {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!("{} failed to save: {e}", self.name());
        }
    }
}

impl<A: Arena, D: Decay> PartialEq for ShallowMindController<A, D> {
    fn eq(&self, other: &Self) -> bool {
        self.first_name == other.first_name
    }
}

impl<A: Arena, D: Decay> Eq for ShallowMindController<A, D> {}

impl<A: Arena, D: Decay> Hash for ShallowMindController<A, D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first_name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, fs, path::Path};

    use super::*;
    use crate::{
        algo::tabular::q_learning::QLearningConfig,
        env::{
            mock::{MockArena, MockMove},
            Coords,
        },
        exploration::EpsilonGreedy,
        state::Discretiser,
    };

    type Controller = ShallowMindController<MockArena>;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("shallow-mind-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn config(dir: &Path, learn: bool) -> ShallowMindConfig<decay::Constant> {
        ShallowMindConfig {
            learning: QLearningConfig {
                exploration: EpsilonGreedy::new(decay::Constant::new(0.0)),
                ..Default::default()
            },
            learn,
            model_path: dir.join("model/q.json"),
            logs_dir: dir.join("logs"),
            ..Default::default()
        }
    }

    fn arena() -> MockArena {
        MockArena::new(Coords::new(0, 0), Coords::new(3, 4), 5.0)
    }

    #[test]
    fn identity_is_first_name() {
        let dir = temp_dir("identity_is_first_name");
        let a = Controller::new("test", config(&dir, false));
        let b = Controller::new("test", config(&dir, false));
        let c = Controller::new("other", config(&dir, false));
        assert!(a == b);
        assert!(a != c);
        assert_eq!(a.name(), "ShallowMindControllertest");
        assert_eq!(a.preferred_tabard(), Tabard::Grey);

        let set: HashSet<Controller> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn new_starts_empty_without_model() {
        let dir = temp_dir("new_starts_empty_without_model");
        let c = Controller::new("test", config(&dir, false));
        assert!(c.q_learning().q_table().is_empty());
    }

    #[test]
    fn decide_before_reset_is_noop() {
        let dir = temp_dir("decide_before_reset_is_noop");
        let mut c = Controller::new("test", config(&dir, false));
        assert_eq!(c.decide(&Coords::new(1, 1)), MockMove::Idle);
        assert!(c.q_learning().pending().is_none());
    }

    #[test]
    fn decide_maps_strategy_to_host_moves() {
        let dir = temp_dir("decide_maps_strategy_to_host_moves");
        let mut c = Controller::new("test", config(&dir, false));
        c.reset(arena());
        // empty table, the tie goes to GoToMenhir
        assert_eq!(c.decide(&Coords::new(0, 0)), MockMove::Step);
        assert_eq!(c.q_learning().reward_sum(), 20.0);
    }

    #[test]
    fn decide_scans_when_scanning_is_better() {
        let dir = temp_dir("decide_scans_when_scanning_is_better");
        let config = config(&dir, false);
        let state = Discretiser::default().observe(&arena());
        let mut table = QTable::new();
        table.set(state, StrategyAction::Scan, 1.0);
        table.save(&config.model_path).unwrap();

        let mut c = Controller::new("scanner", config);
        c.reset(arena());
        assert_eq!(c.decide(&Coords::new(0, 0)), MockMove::Scan);
    }

    #[test]
    fn reset_records_finished_episode() {
        let dir = temp_dir("reset_records_finished_episode");
        let mut c = Controller::new("test", config(&dir, true));
        c.reset(arena());
        c.decide(&Coords::new(0, 0));
        c.decide(&Coords::new(3, 4));
        c.reset(arena());

        assert_eq!(
            c.episode_log().records(),
            [EpisodeRecord {
                reward: 40.0,
                arrived: true,
                dist: 0.0,
            }]
        );
        assert_eq!(c.q_learning().reward_sum(), 0.0);
        assert!(c.q_learning().pending().is_none());
    }

    #[test]
    fn nothing_persisted_without_learning() {
        let dir = temp_dir("nothing_persisted_without_learning");
        let mut c = Controller::new("test", config(&dir, false));
        c.reset(arena());
        c.decide(&Coords::new(0, 0));
        c.reset(arena());
        assert!(c.episode_log().records().is_empty());
        drop(c);
        assert!(!dir.join("model/q.json").exists());
        assert!(!dir.join("logs").exists());
    }

    #[test]
    fn drop_persists_and_new_resumes() {
        let dir = temp_dir("drop_persists_and_new_resumes");
        let log_path = {
            let mut c = Controller::new("test", config(&dir, true));
            c.reset(arena());
            c.decide(&Coords::new(0, 0));
            c.decide(&Coords::new(1, 1));
            c.reset(arena());
            c.episode_log().path().to_path_buf()
        };
        // header and one episode
        assert_eq!(fs::read_to_string(&log_path).unwrap().lines().count(), 2);

        let resumed = Controller::new("test", config(&dir, false));
        assert_eq!(resumed.q_learning().q_table().len(), 1);
    }

    #[test]
    fn learning_controllers_keep_separate_logs() {
        let dir = temp_dir("learning_controllers_keep_separate_logs");
        let mut paths = Vec::new();
        for first_name in ["alice", "bob"] {
            let mut c = Controller::new(first_name, config(&dir, true));
            c.reset(arena());
            c.decide(&Coords::new(0, 0));
            c.reset(arena());
            paths.push(c.episode_log().path().to_path_buf());
        }
        assert_ne!(paths[0], paths[1]);

        let rows: usize = fs::read_dir(dir.join("logs"))
            .unwrap()
            .map(|entry| {
                let contents = fs::read_to_string(entry.unwrap().path()).unwrap();
                contents.lines().count() - 1
            })
            .sum();
        assert_eq!(rows, 2);
    }
}
