//! Match and registry configuration, and the match state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WinRule
// ---------------------------------------------------------------------------

/// How the win zone is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WinRule {
    /// Every win-zone cell must hold one of the mover's own pieces.
    #[default]
    Strict,

    /// A win-zone cell held by an opponent piece counts as filled, as long
    /// as the mover has at least one piece in the zone. Stops a player from
    /// blocking a win by never leaving their starting arm.
    CountBlocked,
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Per-match settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    pub win_rule: WinRule,

    /// Display names longer than this (in characters) are truncated.
    pub max_name_len: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            win_rule: WinRule::Strict,
            max_name_len: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Settings for the room registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Length of generated room codes, drawn from `0-9A-Z`.
    pub code_length: usize,

    /// Fixed RNG seed for room codes. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Settings applied to every match the registry creates.
    pub match_config: MatchConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            code_length: 4,
            seed: None,
            match_config: MatchConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// MatchPhase
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// Transitions are strictly ordered, and there is no way back:
///
/// ```text
/// Waiting → Running → Finished
/// ```
///
/// - **Waiting**: fewer than two players, or two players that have not
///   sent `start` yet. Seats can be taken.
/// - **Running**: moves are accepted and turns alternate.
/// - **Finished**: someone filled their win zone. Nothing is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Waiting,
    Running,
    Finished,
}

impl MatchPhase {
    /// Returns `true` if the match accepts new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if the match accepts moves.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Running),
            Self::Running => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Running => write!(f, "Running"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
