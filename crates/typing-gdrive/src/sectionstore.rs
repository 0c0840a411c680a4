//! Sectionstore backed by Google Drive.
//!
//! A note's sections live in its file content as one JSON array. Every write
//! downloads the array, changes it and uploads it back while holding the
//! note's write lock.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use typing_core::{Error, Result, Section, Sectionstore, WritableSection};
use uuid::Uuid;

use crate::drive::DriveClient;
use crate::locks::NoteLocks;

/// Google Drive sectionstore bound to a token-scoped client.
pub struct DrvSectionstore {
    drive: DriveClient,
    locks: Arc<NoteLocks>,
}

impl DrvSectionstore {
    /// `locks` should be shared by every sectionstore of the process.
    pub fn new(http: Client, locks: Arc<NoteLocks>) -> Self {
        Self::with_drive(DriveClient::new(http), locks)
    }

    pub fn with_drive(drive: DriveClient, locks: Arc<NoteLocks>) -> Self {
        Self { drive, locks }
    }

    async fn load(&self, note_id: &str) -> Result<Vec<Section>> {
        let content = self.drive.download(note_id).await?.ok_or_else(|| {
            Error::not_found(format!("note with id '{}' not found", note_id))
        })?;
        decode_sections(&content)
    }

    async fn store(&self, note_id: &str, sections: &[Section]) -> Result<()> {
        let content = serde_json::to_vec(sections)?;
        self.drive.upload(note_id, content).await
    }
}

#[async_trait]
impl Sectionstore for DrvSectionstore {
    #[instrument(skip(self, section), level = "debug")]
    async fn create(&self, note_id: &str, section: &WritableSection) -> Result<Section> {
        check_note_id(note_id)?;
        section.validate()?;

        let _guard = self.locks.acquire(note_id).await;
        let mut sections = self.load(note_id).await?;

        let created = Section::new(Uuid::now_v7().simple().to_string(), section);
        sections.push(created.clone());
        self.store(note_id, &sections).await?;

        debug!("Created section {} in note {}", created.id, note_id);
        Ok(created)
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_all(&self, note_id: &str) -> Result<Vec<Section>> {
        check_note_id(note_id)?;
        self.load(note_id).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get(&self, note_id: &str, section_id: &str) -> Result<Section> {
        check_note_id(note_id)?;
        check_section_id(section_id)?;

        self.load(note_id)
            .await?
            .into_iter()
            .find(|s| s.id == section_id)
            .ok_or_else(|| section_not_found(section_id))
    }

    #[instrument(skip(self, section), level = "debug")]
    async fn update(
        &self,
        note_id: &str,
        section_id: &str,
        section: &WritableSection,
    ) -> Result<Section> {
        check_note_id(note_id)?;
        check_section_id(section_id)?;
        section.validate()?;

        let _guard = self.locks.acquire(note_id).await;
        let mut sections = self.load(note_id).await?;

        let existing = sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| section_not_found(section_id))?;
        existing.apply(section);
        let updated = existing.clone();

        self.store(note_id, &sections).await?;
        debug!("Updated section {} in note {}", section_id, note_id);
        Ok(updated)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, note_id: &str, section_id: &str) -> Result<()> {
        check_note_id(note_id)?;
        check_section_id(section_id)?;

        let _guard = self.locks.acquire(note_id).await;
        let mut sections = self.load(note_id).await?;

        let index = sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or_else(|| section_not_found(section_id))?;
        // Order is not preserved.
        sections.swap_remove(index);

        self.store(note_id, &sections).await?;
        debug!("Deleted section {} from note {}", section_id, note_id);
        Ok(())
    }
}

/// Empty content (a freshly created note) holds no sections.
fn decode_sections(content: &[u8]) -> Result<Vec<Section>> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let sections: Option<Vec<Section>> = serde_json::from_slice(content)?;
    Ok(sections.unwrap_or_default())
}

fn check_note_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation("note id is nil"));
    }
    Ok(())
}

fn check_section_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation("section id is nil"));
    }
    Ok(())
}

fn section_not_found(section_id: &str) -> Error {
    Error::not_found(format!("section with id '{}' not found", section_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> DrvSectionstore {
        DrvSectionstore::with_drive(
            DriveClient::with_base_url(Client::new(), &server.uri()),
            Arc::new(NoteLocks::new()),
        )
    }

    async fn mount_content(server: &MockServer, note_id: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/drive/v3/files/{}", note_id)))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mount_upload(server: &MockServer, note_id: &str) {
        Mock::given(method("PATCH"))
            .and(path(format!("/upload/drive/v3/files/{}", note_id)))
            .and(query_param("uploadType", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": note_id})))
            .mount(server)
            .await;
    }

    async fn uploaded(server: &MockServer) -> Vec<Vec<Section>> {
        server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "PATCH")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    fn two_sections() -> String {
        json!([
            {"id": "s1", "name": "first", "data": {"k": "v"}},
            {"id": "s2", "name": "second"}
        ])
        .to_string()
    }

    #[tokio::test]
    async fn test_create_in_empty_note() {
        let server = MockServer::start().await;
        mount_content(&server, "nid", "").await;
        mount_upload(&server, "nid").await;

        let created = store(&server)
            .create(
                "nid",
                &WritableSection {
                    name: " intro ".to_string(),
                    data: BTreeMap::from([("text".to_string(), "hello".to_string())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.name, "intro");

        let uploads = uploaded(&server).await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0], vec![created]);
    }

    #[tokio::test]
    async fn test_create_in_missing_note() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server)
            .create(
                "gone",
                &WritableSection {
                    name: "s".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "note with id 'gone' not found");
        assert!(uploaded(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_invalid_section_fails_without_calling_drive() {
        let server = MockServer::start().await;

        let err = store(&server)
            .create("nid", &WritableSection::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_and_get() {
        let server = MockServer::start().await;
        mount_content(&server, "nid", &two_sections()).await;

        let store = store(&server);
        let all = store.get_all("nid").await.unwrap();
        assert_eq!(all.len(), 2);

        let second = store.get("nid", "s2").await.unwrap();
        assert_eq!(second.name, "second");

        let err = store.get("nid", "unknown").await.unwrap_err();
        assert_eq!(err.to_string(), "section with id 'unknown' not found");
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_replaces_fields() {
        let server = MockServer::start().await;
        mount_content(&server, "nid", &two_sections()).await;
        mount_upload(&server, "nid").await;

        let updated = store(&server)
            .update(
                "nid",
                "s1",
                &WritableSection {
                    name: "renamed".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, "s1");
        assert_eq!(updated.name, "renamed");
        assert!(updated.data.is_empty());

        let uploads = uploaded(&server).await;
        assert_eq!(uploads[0][0], updated);
        assert_eq!(uploads[0][1].id, "s2");
    }

    #[tokio::test]
    async fn test_update_unknown_section_does_not_upload() {
        let server = MockServer::start().await;
        mount_content(&server, "nid", &two_sections()).await;
        mount_upload(&server, "nid").await;

        let err = store(&server)
            .update(
                "nid",
                "unknown",
                &WritableSection {
                    name: "x".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(uploaded(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_one_section() {
        let server = MockServer::start().await;
        let content = json!([
            {"id": "s1", "name": "first"},
            {"id": "s2", "name": "second"},
            {"id": "s3", "name": "third"}
        ])
        .to_string();
        mount_content(&server, "nid", &content).await;
        mount_upload(&server, "nid").await;

        store(&server).delete("nid", "s1").await.unwrap();

        let uploads = uploaded(&server).await;
        assert_eq!(uploads.len(), 1);
        let ids: Vec<&str> = uploads[0].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s2"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_section_does_not_upload() {
        let server = MockServer::start().await;
        mount_content(&server, "nid", &two_sections()).await;
        mount_upload(&server, "nid").await;

        let err = store(&server).delete("nid", "unknown").await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(uploaded(&server).await.is_empty());
    }

    #[test]
    fn test_decode_sections() {
        assert!(decode_sections(b"").unwrap().is_empty());
        assert!(decode_sections(b" \n").unwrap().is_empty());
        assert!(decode_sections(b"null").unwrap().is_empty());
        assert!(matches!(decode_sections(b"{oops"), Err(Error::Decode(_))));
    }
}
