use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{sanitize_labels, sanitize_map, Violations, DATA_LIMITS, METADATA_LIMITS};

/// Input used for creating and updating a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritableSection {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl WritableSection {
    pub fn validate(&self) -> Result<()> {
        Violations::new()
            .name(&self.name)
            .labels(&self.labels)
            .map(&self.metadata, METADATA_LIMITS)
            .map(&self.data, DATA_LIMITS)
            .finish()
    }

    pub fn sanitized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            labels: sanitize_labels(&self.labels),
            metadata: sanitize_map(&self.metadata),
            data: sanitize_map(&self.data),
        }
    }
}

/// A section stored inside a note's content document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl Section {
    /// New section carrying the given id and the sanitized input fields.
    pub fn new(id: impl Into<String>, input: &WritableSection) -> Self {
        let clean = input.sanitized();
        Self {
            id: id.into(),
            name: clean.name,
            labels: clean.labels,
            metadata: clean.metadata,
            data: clean.data,
        }
    }

    /// Overwrite every writable field, keeping the id.
    pub fn apply(&mut self, input: &WritableSection) {
        let clean = input.sanitized();
        self.name = clean.name;
        self.labels = clean.labels;
        self.metadata = clean.metadata;
        self.data = clean.data;
    }
}

/// Operations on the sections of a note.
#[async_trait]
pub trait Sectionstore: Send + Sync {
    /// Append a new section to the note.
    async fn create(&self, note_id: &str, section: &WritableSection) -> Result<Section>;

    async fn get_all(&self, note_id: &str) -> Result<Vec<Section>>;

    /// Fetch one section; a missing section is a `NotFound` error.
    async fn get(&self, note_id: &str, section_id: &str) -> Result<Section>;

    async fn update(
        &self,
        note_id: &str,
        section_id: &str,
        section: &WritableSection,
    ) -> Result<Section>;

    async fn delete(&self, note_id: &str, section_id: &str) -> Result<()>;
}
