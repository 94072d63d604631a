use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of an AI agent action. No update/delete surface exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiLogEntry {
    pub id: Uuid,
    pub command: String,
    pub interpreted_action: Option<String>,
    /// Opaque structured payload reported by the agent.
    pub result: Option<serde_json::Value>,
    pub status: String,
    pub execution_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiLogInput {
    pub command: String,
    pub status: String,
    #[serde(default)]
    pub interpreted_action: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub execution_time_ms: Option<i64>,
}
