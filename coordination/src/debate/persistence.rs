//! State sinks: where the debate record is durably written during a run.
//!
//! The orchestrator is the only writer. Every mutation goes through a
//! [`StateSink`] call so the persisted record never lags what executed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use super::state::{
    AgentClarifications, DebateRound, DebateState, DebateStatus, PromptSources, Solution,
    TransitionError,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("debate not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize failed: {reason}")]
    SerializeFailed { reason: String },

    #[error("deserialize failed: {reason}")]
    DeserializeFailed { reason: String },

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("rejected mutation: {0}")]
    Invalid(#[from] TransitionError),
}

/// Persistence boundary for [`DebateState`].
#[async_trait]
pub trait StateSink: Send + Sync {
    /// Create a pending debate and return its id.
    async fn create_debate(&self, problem: &str, context: Option<&str>) -> Result<String, PersistenceError>;

    async fn set_status(&self, debate_id: &str, status: DebateStatus) -> Result<(), PersistenceError>;

    async fn append_round(&self, debate_id: &str, round: DebateRound) -> Result<(), PersistenceError>;

    async fn set_final_solution(&self, debate_id: &str, solution: Solution) -> Result<(), PersistenceError>;

    async fn set_prompt_sources(&self, debate_id: &str, sources: PromptSources) -> Result<(), PersistenceError>;

    async fn set_clarifications(
        &self,
        debate_id: &str,
        clarifications: Vec<AgentClarifications>,
    ) -> Result<(), PersistenceError>;

    async fn get_debate(&self, debate_id: &str) -> Result<DebateState, PersistenceError>;
}

/// `deb-<utc timestamp>-<8 hex chars>`.
pub fn new_debate_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("deb-{}-{}", Utc::now().format("%Y%m%dT%H%M%S"), &uuid[..8])
}

/// Debates held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryStateSink {
    debates: RwLock<HashMap<String, DebateState>>,
}

impl InMemoryStateSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.debates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.debates.read().await.is_empty()
    }

    /// Ids of all stored debates, sorted.
    pub async fn debate_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.debates.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn insert(&self, state: DebateState) {
        self.debates.write().await.insert(state.id.clone(), state);
    }

    /// Apply `f` to a stored debate and return the updated copy.
    async fn update<F>(&self, debate_id: &str, f: F) -> Result<DebateState, PersistenceError>
    where
        F: FnOnce(&mut DebateState) -> Result<(), TransitionError> + Send,
    {
        let mut debates = self.debates.write().await;
        let state = debates
            .get_mut(debate_id)
            .ok_or_else(|| PersistenceError::NotFound(debate_id.to_string()))?;
        f(state)?;
        Ok(state.clone())
    }
}

#[async_trait]
impl StateSink for InMemoryStateSink {
    async fn create_debate(&self, problem: &str, context: Option<&str>) -> Result<String, PersistenceError> {
        let state = DebateState::new(new_debate_id(), problem, context.map(str::to_string));
        let id = state.id.clone();
        self.insert(state).await;
        Ok(id)
    }

    async fn set_status(&self, debate_id: &str, status: DebateStatus) -> Result<(), PersistenceError> {
        self.update(debate_id, |s| s.transition(status)).await.map(|_| ())
    }

    async fn append_round(&self, debate_id: &str, round: DebateRound) -> Result<(), PersistenceError> {
        self.update(debate_id, |s| s.append_round(round)).await.map(|_| ())
    }

    async fn set_final_solution(&self, debate_id: &str, solution: Solution) -> Result<(), PersistenceError> {
        self.update(debate_id, |s| {
            s.set_final_solution(solution);
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn set_prompt_sources(&self, debate_id: &str, sources: PromptSources) -> Result<(), PersistenceError> {
        self.update(debate_id, |s| {
            s.set_prompt_sources(sources);
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn set_clarifications(
        &self,
        debate_id: &str,
        clarifications: Vec<AgentClarifications>,
    ) -> Result<(), PersistenceError> {
        self.update(debate_id, |s| {
            s.set_clarifications(clarifications);
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn get_debate(&self, debate_id: &str) -> Result<DebateState, PersistenceError> {
        self.debates
            .read()
            .await
            .get(debate_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(debate_id.to_string()))
    }
}

/// On-disk envelope: the debate record plus a schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDebate {
    /// Schema version for forward compatibility.
    pub version: u32,
    #[serde(flatten)]
    pub state: DebateState,
}

impl PersistedDebate {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(state: DebateState) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let persisted: Self =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if persisted.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: persisted.version,
            });
        }

        Ok(persisted)
    }
}

/// Writes one pretty-printed `<id>.json` per debate after every mutation.
#[derive(Debug)]
pub struct JsonFileStateSink {
    dir: PathBuf,
    inner: InMemoryStateSink,
}

impl JsonFileStateSink {
    /// Create the sink, creating `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            inner: InMemoryStateSink::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, debate_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", debate_id))
    }

    /// Read a debate file from disk.
    pub async fn load(path: &Path) -> Result<DebateState, PersistenceError> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(PersistedDebate::from_json(&json)?.state)
    }

    /// Write via a temp file and rename so readers never see a partial file.
    async fn flush(&self, state: &DebateState) -> Result<(), PersistenceError> {
        let json = PersistedDebate::new(state.clone()).to_json()?;
        let path = self.path_for(&state.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(debate_id = %state.id, path = %path.display(), "debate state written");
        Ok(())
    }

    async fn flush_id(&self, debate_id: &str) -> Result<(), PersistenceError> {
        let state = self.inner.get_debate(debate_id).await?;
        self.flush(&state).await
    }
}

#[async_trait]
impl StateSink for JsonFileStateSink {
    async fn create_debate(&self, problem: &str, context: Option<&str>) -> Result<String, PersistenceError> {
        let id = self.inner.create_debate(problem, context).await?;
        self.flush_id(&id).await?;
        Ok(id)
    }

    async fn set_status(&self, debate_id: &str, status: DebateStatus) -> Result<(), PersistenceError> {
        self.inner.set_status(debate_id, status).await?;
        self.flush_id(debate_id).await
    }

    async fn append_round(&self, debate_id: &str, round: DebateRound) -> Result<(), PersistenceError> {
        self.inner.append_round(debate_id, round).await?;
        self.flush_id(debate_id).await
    }

    async fn set_final_solution(&self, debate_id: &str, solution: Solution) -> Result<(), PersistenceError> {
        self.inner.set_final_solution(debate_id, solution).await?;
        self.flush_id(debate_id).await
    }

    async fn set_prompt_sources(&self, debate_id: &str, sources: PromptSources) -> Result<(), PersistenceError> {
        self.inner.set_prompt_sources(debate_id, sources).await?;
        self.flush_id(debate_id).await
    }

    async fn set_clarifications(
        &self,
        debate_id: &str,
        clarifications: Vec<AgentClarifications>,
    ) -> Result<(), PersistenceError> {
        self.inner.set_clarifications(debate_id, clarifications).await?;
        self.flush_id(debate_id).await
    }

    /// Memory first, then the debate file in the sink directory.
    async fn get_debate(&self, debate_id: &str) -> Result<DebateState, PersistenceError> {
        match self.inner.get_debate(debate_id).await {
            Ok(state) => Ok(state),
            Err(PersistenceError::NotFound(_)) => {
                let path = self.path_for(debate_id);
                if !tokio::fs::try_exists(&path).await? {
                    return Err(PersistenceError::NotFound(debate_id.to_string()));
                }
                let state = Self::load(&path).await?;
                self.inner.insert(state.clone()).await;
                Ok(state)
            }
            Err(e) => Err(e),
        }
    }
}
