use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of an agent's working memory, persisted for session continuity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDump {
    pub id: Uuid,
    pub project_id: Uuid,
    pub mental_model: String,
    pub next_step_prompt: Option<String>,
    pub workspace_location: WorkspaceLocation,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceLocation {
    #[default]
    Office,
    Home,
}

impl WorkspaceLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Home => "home",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "office" => Some(Self::Office),
            "home" => Some(Self::Home),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContextDumpInput {
    pub mental_model: String,
    #[serde(default)]
    pub next_step_prompt: Option<String>,
    #[serde(default)]
    pub workspace_location: Option<WorkspaceLocation>,
}
