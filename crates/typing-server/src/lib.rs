//! REST API for personal notes stored in the Google Drive app-data folder.
//!
//! - `/api/version`: server version string
//! - `/api/v1/signin/...`: OAuth signin workflow and the token holder profile
//! - `/api/v1/storage/notes/...`: note and section CRUD (bearer token required)

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod version;

pub use config::Config;
pub use error::ApiError;
pub use handlers::AppState;
pub use router::router;
