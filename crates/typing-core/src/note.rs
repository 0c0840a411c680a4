use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{sanitize_labels, sanitize_map, Violations, METADATA_LIMITS};

/// Input used for creating and updating a note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritableNote {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, rename = "desc", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl WritableNote {
    /// Check every field constraint, reporting all violations at once.
    pub fn validate(&self) -> Result<()> {
        Violations::new()
            .name(&self.name)
            .description(&self.description)
            .labels(&self.labels)
            .map(&self.metadata, METADATA_LIMITS)
            .finish()
    }

    /// Trimmed copy with blank labels and blank metadata keys removed.
    pub fn sanitized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            labels: sanitize_labels(&self.labels),
            metadata: sanitize_map(&self.metadata),
        }
    }
}

/// A stored note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, rename = "desc", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
}

/// Operations on notes kept in cloud storage.
#[async_trait]
pub trait Notestore: Send + Sync {
    /// Build a new note and save it.
    async fn create(&self, note: &WritableNote) -> Result<Note>;

    /// Fetch every note.
    async fn get_all(&self) -> Result<Vec<Note>>;

    /// Fetch one note; `None` when it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Note>>;

    /// Replace a note's fields; `None` when it does not exist.
    async fn update(&self, id: &str, note: &WritableNote) -> Result<Option<Note>>;

    /// Remove a note; `false` when it did not exist.
    async fn delete(&self, id: &str) -> Result<bool>;
}
