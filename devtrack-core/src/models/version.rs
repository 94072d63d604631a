use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A milestone/release container within a project. At most one version per
/// project is active at any time; the active version is where new unassigned
/// work lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersionInput {
    pub name: String,
    /// Activate the new version immediately, deactivating its siblings.
    #[serde(default)]
    pub activate: bool,
}
