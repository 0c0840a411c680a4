//! Google Drive API v3 client wrapper.
//!
//! The HTTP client is scoped to the caller's token (see `client_with_token`),
//! so no token is passed per call. Every file lives in the application's
//! private `appDataFolder` space.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use typing_core::{Error, Result};
use url::Url;

use crate::client::{status_error, transport, GOOGLE_APIS_URL};

/// Drive space holding the application's private files.
pub const APP_DATA_FOLDER: &str = "appDataFolder";

const FILE_FIELDS: &str = "id,name,description,properties,createdTime,modifiedTime";
const FILE_LIST_FIELDS: &str =
    "nextPageToken,files(id,name,description,properties,createdTime,modifiedTime)";
const LIST_PAGE_SIZE: &str = "100";

/// File resource as exchanged with the Drive API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

/// Metadata patch. Drive ignores omitted fields, so properties to clear are
/// sent as explicit `null` values (`None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilePatch {
    pub name: String,
    pub description: String,
    pub properties: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Drive API client bound to one token-scoped HTTP client.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    base_url: String,
}

impl DriveClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, GOOGLE_APIS_URL)
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    fn file_url(&self, file_id: &str) -> Result<Url> {
        self.segment_url(&["drive", "v3", "files"], file_id)
    }

    fn upload_url(&self, file_id: &str) -> Result<Url> {
        self.segment_url(&["upload", "drive", "v3", "files"], file_id)
    }

    /// The id always lands as a single escaped path segment.
    fn segment_url(&self, prefix: &[&str], file_id: &str) -> Result<Url> {
        // `path_segments_mut` drops dot segments instead of escaping them.
        if file_id.is_empty() || file_id == "." || file_id == ".." {
            return Err(Error::not_found(format!(
                "file with id '{}' not found",
                file_id
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Internal(format!("invalid drive base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Internal("drive base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(prefix)
            .push(file_id);
        Ok(url)
    }

    /// Create a metadata-only file.
    #[instrument(skip(self, file), level = "debug", fields(name = %file.name))]
    pub async fn create_file(&self, file: &DriveFile) -> Result<DriveFile> {
        let resp = self
            .http
            .post(self.files_url())
            .query(&[("fields", FILE_FIELDS)])
            .json(file)
            .send()
            .await
            .map_err(transport)?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let created: DriveFile = resp.json().await.map_err(decode)?;
        debug!("Created file {}", created.id);
        Ok(created)
    }

    /// List every file in the app-data space, following pagination.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_files(&self) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("spaces", APP_DATA_FOLDER.to_string()),
                ("fields", FILE_LIST_FIELDS.to_string()),
                ("pageSize", LIST_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let resp = self
                .http
                .get(self.files_url())
                .query(&query)
                .send()
                .await
                .map_err(transport)?;

            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }

            let page: FileList = resp.json().await.map_err(decode)?;
            files.extend(page.files);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Listed {} files", files.len());
        Ok(files)
    }

    /// Get file metadata; `None` if the file does not exist.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_file(&self, file_id: &str) -> Result<Option<DriveFile>> {
        let resp = self
            .http
            .get(self.file_url(file_id)?)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        Ok(Some(resp.json().await.map_err(decode)?))
    }

    /// Patch file metadata; `None` if the file does not exist.
    #[instrument(skip(self, patch), level = "debug")]
    pub async fn update_file(&self, file_id: &str, patch: &FilePatch) -> Result<Option<DriveFile>> {
        let resp = self
            .http
            .patch(self.file_url(file_id)?)
            .query(&[("fields", FILE_FIELDS)])
            .json(patch)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        debug!("Updated metadata of file {}", file_id);
        Ok(Some(resp.json().await.map_err(decode)?))
    }

    /// Delete a file; `false` if it did not exist.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_file(&self, file_id: &str) -> Result<bool> {
        let resp = self
            .http
            .delete(self.file_url(file_id)?)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        debug!("Deleted file {}", file_id);
        Ok(true)
    }

    /// Download file content; `None` if the file does not exist.
    #[instrument(skip(self), level = "debug")]
    pub async fn download(&self, file_id: &str) -> Result<Option<Vec<u8>>> {
        let resp = self
            .http
            .get(self.file_url(file_id)?)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let bytes = resp.bytes().await.map_err(transport)?;
        debug!("Downloaded {} bytes for file {}", bytes.len(), file_id);
        Ok(Some(bytes.to_vec()))
    }

    /// Overwrite the whole file content with a JSON document.
    #[instrument(skip(self, data), level = "debug", fields(data_len = data.len()))]
    pub async fn upload(&self, file_id: &str, data: Vec<u8>) -> Result<()> {
        let url = self.upload_url(file_id)?;
        let len = data.len();

        let resp = self
            .http
            .patch(url)
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(data)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!(
                "file with id '{}' not found",
                file_id
            )));
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        debug!("Uploaded file {} ({} bytes)", file_id, len);
        Ok(())
    }
}

fn decode(err: reqwest::Error) -> Error {
    Error::Decode(err.to_string())
}
