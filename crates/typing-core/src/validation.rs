//! Field constraints and sanitization shared by notes and sections.
//!
//! Limits are checked against the raw input (before trimming), counting
//! characters rather than bytes. A failing count check on a collection skips
//! the per-item checks for that collection.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

pub const NAME_MAX_CHARS: usize = 100;
pub const DESC_MAX_CHARS: usize = 250;
pub const LABELS_MAX_COUNT: usize = 5;
pub const LABEL_MAX_CHARS: usize = 20;

pub const NAME_REQUIRED: &str = "name is required field";
pub const NAME_BLANK: &str = "name can't be empty value";
pub const NAME_TOO_LONG: &str = "name must be less than 100 chars";
pub const DESC_TOO_LONG: &str = "desc must be less than 250 chars";
pub const LABELS_TOO_MANY: &str = "label count can't be more than 5";
pub const LABEL_TOO_LONG: &str = "label must be less than 20 chars";

/// Bounds for a string→string map field.
#[derive(Debug, Clone, Copy)]
pub struct MapLimits {
    pub max_entries: usize,
    pub max_key_chars: usize,
    pub max_value_chars: usize,
    pub count_message: &'static str,
    pub item_message: &'static str,
}

pub const METADATA_LIMITS: MapLimits = MapLimits {
    max_entries: 20,
    max_key_chars: 20,
    max_value_chars: 100,
    count_message: "metadata count can't be more than 20",
    item_message: "metadata key and value must be less than 20 and 100 chars respectively",
};

pub const DATA_LIMITS: MapLimits = MapLimits {
    max_entries: 50,
    max_key_chars: 50,
    max_value_chars: 2000,
    count_message: "data count can't be more than 50",
    item_message: "data key and value must be less than 50 and 2000 chars respectively",
};

/// Collects constraint violations and turns them into one validation error.
#[derive(Debug, Default)]
pub struct Violations(Vec<&'static str>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        if name.is_empty() {
            self.0.push(NAME_REQUIRED);
        } else if name.trim().is_empty() {
            self.0.push(NAME_BLANK);
        } else if char_len(name) > NAME_MAX_CHARS {
            self.0.push(NAME_TOO_LONG);
        }
        self
    }

    pub fn description(&mut self, desc: &str) -> &mut Self {
        if char_len(desc) > DESC_MAX_CHARS {
            self.0.push(DESC_TOO_LONG);
        }
        self
    }

    pub fn labels(&mut self, labels: &[String]) -> &mut Self {
        if labels.len() > LABELS_MAX_COUNT {
            self.0.push(LABELS_TOO_MANY);
        } else if labels.iter().any(|l| char_len(l) > LABEL_MAX_CHARS) {
            self.0.push(LABEL_TOO_LONG);
        }
        self
    }

    pub fn map(&mut self, map: &BTreeMap<String, String>, limits: MapLimits) -> &mut Self {
        if map.len() > limits.max_entries {
            self.0.push(limits.count_message);
        } else if map.iter().any(|(k, v)| {
            char_len(k) > limits.max_key_chars || char_len(v) > limits.max_value_chars
        }) {
            self.0.push(limits.item_message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finish(&self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.0.join(", ")))
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Trim every label and drop the ones that end up blank.
pub fn sanitize_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim keys and values; entries whose key is blank are removed.
pub fn sanitize_map(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(k, v)| {
            let key = k.trim();
            (!key.is_empty()).then(|| (key.to_string(), v.trim().to_string()))
        })
        .collect()
}
