//! Notestore backed by Google Drive: one app-data file per note.
//!
//! Labels are stored as the comma-joined `labels` property and each metadata
//! entry `k` as the property `meta!k`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, instrument};
use typing_core::{Error, Note, Notestore, Result, WritableNote};

use crate::drive::{DriveClient, DriveFile, FilePatch, APP_DATA_FOLDER};

const LABELS_PROPERTY: &str = "labels";
const META_PREFIX: &str = "meta!";
const NOTE_MIME_TYPE: &str = "application/json";
const NOTE_FILE_SUFFIX: &str = ".json";

/// Google Drive notestore bound to a token-scoped client.
pub struct DrvNotestore {
    drive: DriveClient,
}

impl DrvNotestore {
    pub fn new(http: Client) -> Self {
        Self {
            drive: DriveClient::new(http),
        }
    }

    pub fn with_drive(drive: DriveClient) -> Self {
        Self { drive }
    }
}

#[async_trait]
impl Notestore for DrvNotestore {
    #[instrument(skip(self, note), level = "debug")]
    async fn create(&self, note: &WritableNote) -> Result<Note> {
        note.validate()?;
        let note = note.sanitized();

        let file = DriveFile {
            name: file_name(&note.name),
            description: note.description.clone(),
            mime_type: Some(NOTE_MIME_TYPE.to_string()),
            parents: vec![APP_DATA_FOLDER.to_string()],
            properties: to_properties(&note),
            ..Default::default()
        };

        let created = self.drive.create_file(&file).await?;
        debug!("Created note {}", created.id);
        Ok(to_note(created))
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self) -> Result<Vec<Note>> {
        let files = self.drive.list_files().await?;
        Ok(files.into_iter().map(to_note).collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn get(&self, id: &str) -> Result<Option<Note>> {
        check_id(id)?;
        Ok(self.drive.get_file(id).await?.map(to_note))
    }

    #[instrument(skip(self, note), level = "debug")]
    async fn update(&self, id: &str, note: &WritableNote) -> Result<Option<Note>> {
        check_id(id)?;
        note.validate()?;

        let Some(existing) = self.drive.get_file(id).await? else {
            debug!("Note {} not found, nothing to update", id);
            return Ok(None);
        };

        let note = note.sanitized();
        let patch = FilePatch {
            name: file_name(&note.name),
            description: note.description.clone(),
            properties: patch_properties(&note, &existing),
        };

        Ok(self.drive.update_file(id, &patch).await?.map(to_note))
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: &str) -> Result<bool> {
        check_id(id)?;
        self.drive.delete_file(id).await
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation("note id is nil"));
    }
    Ok(())
}

fn file_name(name: &str) -> String {
    format!("{}{}", name, NOTE_FILE_SUFFIX)
}

fn to_properties(note: &WritableNote) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    if !note.labels.is_empty() {
        props.insert(LABELS_PROPERTY.to_string(), note.labels.join(","));
    }
    for (k, v) in &note.metadata {
        props.insert(format!("{}{}", META_PREFIX, k), v.clone());
    }
    props
}

/// New properties plus explicit nulls for whatever must be cleared.
fn patch_properties(note: &WritableNote, existing: &DriveFile) -> BTreeMap<String, Option<String>> {
    let mut props: BTreeMap<String, Option<String>> = to_properties(note)
        .into_iter()
        .map(|(k, v)| (k, Some(v)))
        .collect();

    if note.labels.is_empty() {
        props.insert(LABELS_PROPERTY.to_string(), None);
    }
    for key in existing.properties.keys() {
        if let Some(meta_key) = key.strip_prefix(META_PREFIX) {
            if !note.metadata.contains_key(meta_key) {
                props.insert(key.clone(), None);
            }
        }
    }
    props
}

fn to_note(file: DriveFile) -> Note {
    let name = file
        .name
        .strip_suffix(NOTE_FILE_SUFFIX)
        .unwrap_or(file.name.as_str())
        .to_string();

    let labels: Vec<String> = file
        .properties
        .get(LABELS_PROPERTY)
        .filter(|l| !l.is_empty())
        .map(|l| l.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let metadata: BTreeMap<String, String> = file
        .properties
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(META_PREFIX)
                .map(|meta_key| (meta_key.to_string(), v.clone()))
        })
        .collect();

    Note {
        id: file.id,
        name,
        description: file.description,
        labels,
        metadata,
        date_created: parse_time(file.created_time.as_deref()),
        date_updated: parse_time(file.modified_time.as_deref()),
    }
}

fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> DrvNotestore {
        DrvNotestore::with_drive(DriveClient::with_base_url(Client::new(), &server.uri()))
    }

    async fn request_bodies(server: &MockServer, verb: &str) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == verb)
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_create_sanitizes_and_round_trips() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "nid",
                "name": "note.json",
                "description": "desc",
                "properties": {"labels": "label1,label2", "meta!meta1": "value1"},
                "createdTime": "2020-05-01T10:00:00.000Z",
                "modifiedTime": "2020-05-01T10:00:00.000Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let note = store(&server)
            .create(&WritableNote {
                name: "  note  ".to_string(),
                description: " desc ".to_string(),
                labels: vec![" label1 ".to_string(), "label2".to_string(), "  ".to_string()],
                metadata: BTreeMap::from([
                    (" meta1 ".to_string(), " value1 ".to_string()),
                    ("   ".to_string(), "dropped".to_string()),
                ]),
            })
            .await
            .unwrap();

        let sent = &request_bodies(&server, "POST").await[0];
        assert_eq!(sent["name"], "note.json");
        assert_eq!(sent["description"], "desc");
        assert_eq!(sent["mimeType"], "application/json");
        assert_eq!(sent["parents"], json!(["appDataFolder"]));
        assert_eq!(
            sent["properties"],
            json!({"labels": "label1,label2", "meta!meta1": "value1"})
        );

        assert_eq!(note.id, "nid");
        assert_eq!(note.name, "note");
        assert_eq!(note.description, "desc");
        assert_eq!(note.labels, vec!["label1", "label2"]);
        assert_eq!(note.metadata.get("meta1").map(String::as_str), Some("value1"));
        assert!(note.date_created.is_some());
    }

    #[tokio::test]
    async fn test_create_blank_name_fails_without_calling_drive() {
        let server = MockServer::start().await;

        let err = store(&server)
            .create(&WritableNote {
                name: "   ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_converts_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [
                    {"id": "n1", "name": "first.json"},
                    {"id": "n2", "name": "second.json", "properties": {"labels": "a"}}
                ]
            })))
            .mount(&server)
            .await;

        let notes = store(&server).get_all().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].name, "first");
        assert_eq!(notes[1].labels, vec!["a"]);
    }

    #[tokio::test]
    async fn test_get_missing_note_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(store(&server).get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_note_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let updated = store(&server)
            .update(
                "missing",
                &WritableNote {
                    name: "note".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_none());
        assert!(request_bodies(&server, "PATCH").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_clears_removed_properties() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/nid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "nid",
                "name": "note.json",
                "properties": {"labels": "old", "meta!keep": "1", "meta!drop": "2"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/drive/v3/files/nid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "nid",
                "name": "renamed.json",
                "properties": {"meta!keep": "one"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = store(&server)
            .update(
                "nid",
                &WritableNote {
                    name: "renamed".to_string(),
                    metadata: BTreeMap::from([("keep".to_string(), "one".to_string())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        let sent = &request_bodies(&server, "PATCH").await[0];
        assert_eq!(sent["name"], "renamed.json");
        assert_eq!(sent["description"], "");
        assert_eq!(
            sent["properties"],
            json!({"labels": null, "meta!drop": null, "meta!keep": "one"})
        );
        assert_eq!(updated.name, "renamed");
        assert!(updated.labels.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/drive/v3/files/nid"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/drive/v3/files/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.delete("nid").await.unwrap());
        assert!(!store.delete("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let server = MockServer::start().await;
        let store = store(&server);
        assert!(matches!(store.get("").await, Err(Error::Validation(_))));
        assert!(matches!(store.delete("").await, Err(Error::Validation(_))));
    }

    #[test]
    fn test_to_note_strips_single_suffix() {
        let note = to_note(DriveFile {
            id: "x".to_string(),
            name: "data.json.json".to_string(),
            ..Default::default()
        });
        assert_eq!(note.name, "data.json");
    }
}
