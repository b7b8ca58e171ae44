use crate::difficulty::Difficulty;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Named snapshot of a session (selected drill + rolled difficulty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    /// Assigned at creation, never changes
    pub id: String,
    pub name: String,
    /// Index into the full catalog ordering
    pub drill_index: usize,
    /// Stable id of the drill at `drill_index` when last saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drill_id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub created: DateTime<Utc>,
    /// Set on every update-save, absent until the first one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

/// Input for creating a workshop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewWorkshop {
    pub name: String,
    pub drill_index: usize,
    pub drill_id: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl NewWorkshop {
    pub fn new(name: impl Into<String>, drill_index: usize, difficulty: Option<Difficulty>) -> Self {
        Self { name: name.into(), drill_index, drill_id: None, difficulty }
    }

    pub fn with_drill_id(mut self, drill_id: impl Into<String>) -> Self {
        self.drill_id = Some(drill_id.into());
        self
    }
}

impl Workshop {
    pub(crate) fn from_new(new: NewWorkshop, name: String, created: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(created),
            name,
            drill_index: new.drill_index,
            drill_id: new.drill_id,
            difficulty: new.difficulty,
            created,
            updated: None,
        }
    }

    /// Last time the workshop was written.
    pub fn last_saved(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.created)
    }
}

/// Trimmed name, or `None` if nothing is left.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Time prefix + process sequence + random suffix. The sequence alone keeps
/// ids unique within one process.
fn generate_id(now: DateTime<Utc>) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!("ws-{:x}-{:x}-{}", now.timestamp_millis(), seq, &random[..8])
}
