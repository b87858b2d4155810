use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::questions::QUESTION_COUNT;
use crate::error::StoreError;

/// Progress through the intake questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub step: usize,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub model: Option<String>,
}

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    AskingType,
    AskingModel,
    Querying,
}

impl FlowState {
    pub fn phase(&self) -> FlowPhase {
        match self.step {
            0 => FlowPhase::AskingType,
            1 => FlowPhase::AskingModel,
            _ => FlowPhase::Querying,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step >= QUESTION_COUNT
    }

    /// Store the answer for the current step and move to the next one.
    pub fn record_answer(&mut self, value: Option<String>) {
        match self.phase() {
            FlowPhase::AskingType => self.product_type = value,
            FlowPhase::AskingModel => self.model = value,
            FlowPhase::Querying => return,
        }
        self.step += 1;
    }

    /// Space-joined non-empty answers, type first.
    pub fn query(&self) -> String {
        [self.product_type.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Flow state backed by a JSON file.
pub struct FlowStore {
    path: PathBuf,
    state: FlowState,
}

impl FlowStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self { path, state }
    }

    /// Read the persisted state, or the defaults if it is missing or unreadable.
    pub fn load(path: &Path) -> FlowState {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return FlowState::default(),
            Err(e) => {
                warn!("Could not read flow state {}: {}", path.display(), e);
                return FlowState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => {
                debug!("Restored flow state from {}", path.display());
                state
            }
            Err(e) => {
                warn!("Ignoring malformed flow state {}: {}", path.display(), e);
                FlowState::default()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Replace the in-memory state and write it through to disk.
    pub fn save(&mut self, state: FlowState) -> Result<(), StoreError> {
        self.state = state;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let content = serde_json::to_string(&self.state)?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Reset to the defaults and delete the persisted copy.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.state = FlowState::default();

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> FlowStore {
        FlowStore::open(dir.path().join("state").join("flow_state.json"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.state(), &FlowState::default());
        assert_eq!(store.state().phase(), FlowPhase::AskingType);
    }

    #[test]
    fn state_survives_a_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let state = FlowState {
            step: 1,
            product_type: Some("laptop".to_string()),
            model: None,
        };
        store.save(state.clone()).unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.state(), &state);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"step": 1, "type": "laptop", "model": null}));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flow_state.json");
        fs::write(&path, "{not json").unwrap();

        assert_eq!(FlowStore::load(&path), FlowState::default());
    }

    #[test]
    fn clear_removes_file_and_resets() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store
            .save(FlowState {
                step: 1,
                product_type: Some("tableta".to_string()),
                model: None,
            })
            .unwrap();

        store.clear().unwrap();
        assert_eq!(store.state(), &FlowState::default());
        assert!(!store.path().exists());

        // Clearing twice is harmless.
        store.clear().unwrap();
    }

    #[test]
    fn answers_advance_one_step_each() {
        let mut state = FlowState::default();
        state.record_answer(Some("laptop".to_string()));
        assert_eq!(state.phase(), FlowPhase::AskingModel);
        state.record_answer(Some("X200".to_string()));
        assert_eq!(state.step, 2);
        assert!(state.is_complete());

        // No further answers are taken once querying.
        state.record_answer(Some("extra".to_string()));
        assert_eq!(state.step, 2);
        assert_eq!(state.query(), "laptop X200");
    }

    #[test]
    fn query_skips_missing_answers() {
        let mut state = FlowState::default();
        state.record_answer(Some("laptop".to_string()));
        state.record_answer(None);
        assert_eq!(state.query(), "laptop");

        let mut state = FlowState::default();
        state.record_answer(None);
        state.record_answer(Some("X200".to_string()));
        assert_eq!(state.query(), "X200");
    }
}
