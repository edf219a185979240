//! Derived-action state machine.
//!
//! Every backend action a session can trigger is tracked separately:
//!
//! ```text
//! idle → in_flight → complete
//!                  → failed
//!                  → idle      (cancelled)
//! complete | failed → in_flight
//! ```
//!
//! A second `begin` for an action that is still in flight is rejected, which
//! is what keeps a double "analyze" from issuing two requests.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Backend actions a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Upload,
    Analyze,
    GenerateCharts,
    Ask,
    Summarize,
    AskCustom,
    Chat,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Analyze => "analyze",
            Self::GenerateCharts => "generate_charts",
            Self::Ask => "ask",
            Self::Summarize => "summarize",
            Self::AskCustom => "ask_custom",
            Self::Chat => "chat",
        }
    }

    /// Status text persisted in `processing_status` while the action runs.
    #[must_use]
    pub const fn progress_label(self) -> &'static str {
        match self {
            Self::Upload => "uploading",
            Self::Analyze => "analyzing",
            Self::GenerateCharts => "generating charts",
            Self::Ask | Self::Chat => "answering",
            Self::Summarize => "summarizing",
            Self::AskCustom => "processing prompt",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    InFlight,
    Complete,
    Failed,
}

impl ActionState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle | Self::Complete | Self::Failed => &[Self::InFlight],
            Self::InFlight => &[Self::Complete, Self::Failed, Self::Idle],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight => "in_flight",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of every action of one session.
#[derive(Debug, Clone, Default)]
pub struct ActionTracker {
    states: HashMap<ActionKind, ActionState>,
}

impl ActionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, kind: ActionKind) -> ActionState {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.state(kind) == ActionState::InFlight
    }

    /// First action currently in flight, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<ActionKind> {
        self.states
            .iter()
            .find(|(_, state)| **state == ActionState::InFlight)
            .map(|(kind, _)| *kind)
    }

    /// Mark `kind` as in flight.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the action is already in flight.
    pub fn begin(&mut self, kind: ActionKind) -> Result<(), CoreError> {
        self.transition(kind, ActionState::InFlight)
    }

    /// Mark `kind` as finished, successfully or not.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the action was not in flight.
    pub fn finish(&mut self, kind: ActionKind, success: bool) -> Result<(), CoreError> {
        let next = if success {
            ActionState::Complete
        } else {
            ActionState::Failed
        };
        self.transition(kind, next)
    }

    /// Return a cancelled in-flight action to idle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the action was not in flight.
    pub fn cancel(&mut self, kind: ActionKind) -> Result<(), CoreError> {
        self.transition(kind, ActionState::Idle)
    }

    /// Forget every action state.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    fn transition(&mut self, kind: ActionKind, next: ActionState) -> Result<(), CoreError> {
        let current = self.state(kind);
        if !current.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                action: kind.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        self.states.insert(kind, next);
        Ok(())
    }
}
