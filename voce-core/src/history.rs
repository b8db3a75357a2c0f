//! Bounded conversation history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human speaker.
    User,
    /// The agent.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub role: Role,
    /// What they said.
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Ordered conversation turns, bounded to the most recent `cap` entries.
///
/// Only the dialogue manager mutates this; it lives for one session and is
/// never persisted.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    cap: usize,
}

impl ConversationHistory {
    /// Create an empty history bounded to `cap` turns.
    pub fn new(cap: usize) -> Self {
        Self { turns: VecDeque::new(), cap }
    }

    /// Number of turns currently held.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a turn, evicting the oldest entries past the cap.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.cap {
            self.turns.pop_front();
        }
    }

    /// Remove the most recent turn if it is a user turn.
    ///
    /// Used to roll a failed dialogue turn back so the history returns to
    /// its pre-turn state. Returns the removed turn, if any.
    pub fn rollback_user(&mut self) -> Option<Turn> {
        match self.turns.back() {
            Some(turn) if turn.role == Role::User => self.turns.pop_back(),
            _ => None,
        }
    }

    /// Snapshot the turns oldest-first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Iterate over turns oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(20)
    }
}
