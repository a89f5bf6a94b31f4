//! Assembly state machine.

use serde::{Deserialize, Serialize};

use crate::error::Stage;

/// Where a run currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum AssemblyState {
    #[default]
    Init,
    Validating,
    PolicyResolved,
    GraphBuilt,
    Exported,
    Done,
    Failed { stage: Stage, error: String },
}

impl AssemblyState {
    pub fn name(&self) -> &'static str {
        match self {
            AssemblyState::Init => "init",
            AssemblyState::Validating => "validating",
            AssemblyState::PolicyResolved => "policy_resolved",
            AssemblyState::GraphBuilt => "graph_built",
            AssemblyState::Exported => "exported",
            AssemblyState::Done => "done",
            AssemblyState::Failed { .. } => "failed",
        }
    }

    /// The stage whose work moves a run into this state.
    pub fn stage(&self) -> Stage {
        match self {
            AssemblyState::Init | AssemblyState::Validating => Stage::Validation,
            AssemblyState::PolicyResolved => Stage::PolicyResolution,
            AssemblyState::GraphBuilt => Stage::Composition,
            AssemblyState::Exported => Stage::Export,
            AssemblyState::Done => Stage::Completion,
            AssemblyState::Failed { stage, .. } => *stage,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssemblyState::Done | AssemblyState::Failed { .. })
    }

    /// Forward steps only; any non-terminal state may fail.
    pub fn can_transition_to(&self, next: &AssemblyState) -> bool {
        use AssemblyState::*;
        match (self, next) {
            (current, Failed { .. }) => !current.is_terminal(),
            (Init, Validating)
            | (Validating, PolicyResolved)
            | (PolicyResolved, GraphBuilt)
            | (GraphBuilt, Exported)
            | (Exported, Done) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyState::Failed { stage, .. } => write!(f, "failed({})", stage),
            other => write!(f, "{}", other.name()),
        }
    }
}
