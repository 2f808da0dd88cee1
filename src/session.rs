use thiserror::Error;

use crate::engine::GameEngine;
use crate::types::{GameStatus, PolicyMode, TurnReport};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("simulation not started")]
    NotStarted,
    #[error("simulation already finished")]
    Finished,
    #[error("no turn recorded at index {0}")]
    TurnOutOfRange(usize),
}

/// One simulation run plus its full replay history. The engine is
/// absent until the first `start`; `start` may be called again at any
/// time to begin a fresh run.
#[derive(Debug, Default)]
pub struct Session {
    engine: Option<GameEngine>,
    history: Vec<TurnReport>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, mode: PolicyMode, seed: u32) {
        self.engine = Some(GameEngine::new(mode, seed));
        self.history.clear();
    }

    pub fn status(&self) -> Option<GameStatus> {
        self.engine.as_ref().map(|engine| engine.status())
    }

    /// Advances one agent turn and records it for replay.
    pub fn turn(&mut self) -> Result<TurnReport, SessionError> {
        let engine = self.engine.as_mut().ok_or(SessionError::NotStarted)?;
        let report = engine.advance_one_agent().ok_or(SessionError::Finished)?;
        self.history.push(report.clone());
        Ok(report)
    }

    pub fn replay(&self, id: usize) -> Result<&TurnReport, SessionError> {
        if self.engine.is_none() {
            return Err(SessionError::NotStarted);
        }
        self.history.get(id).ok_or(SessionError::TurnOutOfRange(id))
    }

    pub fn turns_played(&self) -> usize {
        self.history.len()
    }
}
