pub mod tabular;

pub use tabular::{q_learning::QLearning, q_table::QTable};
