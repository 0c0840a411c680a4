//! Google adapters for the typing note storage service.
//!
//! Notes and sections are kept in the user's Drive `appDataFolder`; signin
//! goes through Google OAuth2. Store and userinfo adapters are bound to one
//! access token through the HTTP client they are built with.

pub mod client;
pub mod drive;
pub mod googleauth;
mod locks;
pub mod notestore;
pub mod sectionstore;
pub mod userinfo;

pub use client::client_with_token;
pub use drive::{DriveClient, DriveFile, FilePatch};
pub use googleauth::{ClientCred, GoogleAuth};
pub use locks::NoteLocks;
pub use notestore::DrvNotestore;
pub use sectionstore::DrvSectionstore;
pub use userinfo::GoogleUserinfo;
