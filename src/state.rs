use serde::{Deserialize, Serialize};

use crate::env::{Arena, Coords};

/// The discretised view of the game used as a Q-table key
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct State {
    /// Arena identifier
    pub arena: String,
    /// Bucket of the ratio between estimated turns to the menhir and straight-line distance to it
    pub menhir: usize,
    /// Bucket of the distance to the mist
    pub mist: usize,
}

/// Monotonically increasing bin edges
#[derive(Clone, PartialEq, Debug)]
pub struct Bins {
    edges: Vec<f32>,
}

impl Bins {
    /// **Panics** if `edges` is not strictly increasing
    pub fn new(edges: Vec<f32>) -> Self {
        assert!(
            edges.windows(2).all(|w| w[0] < w[1]),
            "Bin edges must be strictly increasing: {edges:?}"
        );
        Self { edges }
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    /// Index of the bucket `value` falls into
    ///
    /// Equal to the number of edges that are `<= value`, so anything below the first
    /// edge lands in bucket 0 and anything at or above the last edge lands in bucket `edges.len()`.
    pub fn digitize(&self, value: f32) -> usize {
        self.edges.partition_point(|&edge| edge <= value)
    }
}

/// Maps continuous observations onto a [`State`]
#[derive(Clone, PartialEq, Debug)]
pub struct Discretiser {
    pub distance_bins: Bins,
    pub mist_bins: Bins,
}

impl Default for Discretiser {
    fn default() -> Self {
        Self {
            distance_bins: Bins::new(vec![1.0, 1.25, 1.5, 2.0, 3.0]),
            mist_bins: Bins::new(vec![1.0, 3.0, 6.0, 10.0, 15.0]),
        }
    }
}

impl Discretiser {
    pub fn discretise(
        &self,
        arena: &str,
        position: Coords,
        menhir: Coords,
        turns_to_menhir: f32,
        mist_distance: f32,
    ) -> State {
        let distance = position.distance(&menhir);
        let ratio = if distance != 0.0 {
            turns_to_menhir / distance
        } else {
            0.0
        };
        State {
            arena: arena.to_owned(),
            menhir: self.distance_bins.digitize(ratio),
            mist: self.mist_bins.digitize(mist_distance),
        }
    }

    /// Discretise the arena's current view
    pub fn observe<A: Arena>(&self, arena: &A) -> State {
        self.discretise(
            arena.name(),
            arena.position(),
            arena.menhir(),
            arena.route_to_menhir().time,
            arena.mist_distance(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digitize_counts_exceeded_edges() {
        let bins = Bins::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(bins.digitize(0.5), 0);
        assert_eq!(bins.digitize(1.5), 1);
        assert_eq!(bins.digitize(2.5), 2);
        assert_eq!(bins.digitize(7.0), 3);
    }

    #[test]
    fn digitize_edge_belongs_to_upper_bucket() {
        let bins = Bins::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(bins.digitize(1.0), 1);
        assert_eq!(bins.digitize(3.0), 3);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn rejects_unsorted_edges() {
        Bins::new(vec![2.0, 1.0]);
    }

    #[test]
    fn discretise_ratio_and_mist() {
        let discretiser = Discretiser {
            distance_bins: Bins::new(vec![1.0, 2.0, 3.0]),
            mist_bins: Bins::new(vec![5.0, 10.0]),
        };
        // distance 5, 10 turns -> ratio 2.0
        let state = discretiser.discretise(
            "isolated",
            Coords::new(0, 0),
            Coords::new(3, 4),
            10.0,
            7.0,
        );
        assert_eq!(
            state,
            State {
                arena: "isolated".into(),
                menhir: 2,
                mist: 1,
            }
        );
    }

    #[test]
    fn ratio_is_zero_at_menhir() {
        let discretiser = Discretiser {
            distance_bins: Bins::new(vec![0.5, 1.0]),
            mist_bins: Bins::new(vec![5.0]),
        };
        let here = Coords::new(2, 2);
        let state = discretiser.discretise("isolated", here, here, 4.0, 0.0);
        assert_eq!(state.menhir, 0);
        assert_eq!(state.mist, 0);
    }

    #[test]
    fn deterministic() {
        let discretiser = Discretiser::default();
        let observe =
            || discretiser.discretise("a", Coords::new(1, 2), Coords::new(9, 9), 12.0, 4.0);
        assert_eq!(observe(), observe());
    }
}
