use serde::{Deserialize, Serialize};

/// A tile position on the arena grid
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another tile
    pub fn distance(&self, other: &Coords) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The next step of a precomputed path, along with the estimated number of turns
/// needed to reach the path's destination
#[derive(Clone, Debug, PartialEq)]
pub struct Route<A> {
    pub action: A,
    pub time: f32,
}

/// The host's view of an arena for the duration of one episode
///
/// Movement legality and path finding belong to the host; the agent only consumes
/// the precomputed route to the menhir and the distance to the mist.
pub trait Arena {
    /// Per-turn observation handed over by the host
    type Knowledge;

    /// A concrete move understood by the host
    ///
    /// The default value should represent doing nothing.
    type Action: Default;

    /// Refresh the internal view of the arena from this turn's observation
    fn observe(&mut self, knowledge: &Self::Knowledge);

    /// Identifier of the arena layout
    fn name(&self) -> &str;

    /// Current position of the agent
    fn position(&self) -> Coords;

    /// The tile the agent is trying to reach
    fn menhir(&self) -> Coords;

    /// Next move toward the menhir and the estimated turns to arrive
    fn route_to_menhir(&self) -> Route<Self::Action>;

    /// Distance from the agent to the mist
    fn mist_distance(&self) -> f32;

    /// A move that scans the surroundings
    fn scan_action(&self) -> Self::Action;
}
