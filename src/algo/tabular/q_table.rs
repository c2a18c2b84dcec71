use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::Result;

use super::Hashable;

/// A single persisted table entry
#[derive(Serialize, Deserialize)]
struct Record<S, A> {
    state: S,
    action: A,
    value: f32,
}

/// Values of state-action pairs
///
/// Reads of unseen pairs return `0.0` without inserting anything, so probing every
/// action of a state never grows the table.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable<S: Hashable, A: Hashable> {
    values: HashMap<(S, A), f32>,
}

impl<S: Hashable, A: Hashable> Default for QTable<S, A> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<S: Hashable, A: Hashable> QTable<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `(state, action)`, `0.0` if never written
    pub fn get(&self, state: &S, action: &A) -> f32 {
        // HashMap can't be probed with a tuple of borrows
        self.values
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, state: S, action: A, value: f32) {
        self.values.insert((state, action), value);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(S, A), &f32)> {
        self.values.iter()
    }
}

impl<S, A> QTable<S, A>
where
    S: Hashable + Serialize + DeserializeOwned,
    A: Hashable + Serialize + DeserializeOwned,
{
    /// Read a table previously written with [`QTable::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let records: Vec<Record<S, A>> = serde_json::from_reader(BufReader::new(file))?;
        let values = records
            .into_iter()
            .map(|r| ((r.state, r.action), r.value))
            .collect();
        Ok(Self { values })
    }

    /// Read a table, starting from an empty one if the file is missing or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => {
                debug!(
                    "Loaded Q-table with {} entries from {}",
                    table.len(),
                    path.display()
                );
                table
            }
            Err(e) => {
                warn!(
                    "Starting with an empty Q-table, could not load {}: {e}",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Write the table as JSON, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let records = self
            .values
            .iter()
            .map(|((state, action), &value)| Record {
                state,
                action,
                value,
            })
            .collect::<Vec<_>>();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &records)?;
        writer.flush()?;
        Ok(())
    }
}
