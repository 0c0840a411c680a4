//! Wiring of the Google adapters into the instance container.

use std::sync::Arc;

use reqwest::Client as HttpClient;
use tracing_subscriber::EnvFilter;
use typing_core::container::require_param;
use typing_core::{Auth, Container, Instance, InstanceType};
use typing_gdrive::{
    ClientCred, DrvNotestore, DrvSectionstore, GoogleAuth, GoogleUserinfo, NoteLocks,
};

use crate::config::LogLevel;

/// Initialize logging. `RUST_LOG`, when set, wins over the configured level.
pub fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        )
        .init();
}

/// Container whose store and userinfo activators expect the token-scoped
/// HTTP client as parameter. The auth instance is shared.
pub fn google_container(cred: ClientCred) -> Container<HttpClient> {
    let auth: Arc<dyn Auth> = Arc::new(GoogleAuth::new(cred));
    let locks = Arc::new(NoteLocks::new());

    let mut container: Container<HttpClient> = Container::new();
    container.add(InstanceType::Auth, move |_| Ok(Instance::Auth(Arc::clone(&auth))));
    container.add(InstanceType::Userinfo, |client| {
        let client = require_param(client)?;
        Ok(Instance::Userinfo(Arc::new(GoogleUserinfo::new(client.clone()))))
    });
    container.add(InstanceType::Notestore, |client| {
        let client = require_param(client)?;
        Ok(Instance::Notestore(Arc::new(DrvNotestore::new(client.clone()))))
    });
    container.add(InstanceType::Sectionstore, move |client| {
        let client = require_param(client)?;
        Ok(Instance::Sectionstore(Arc::new(DrvSectionstore::new(
            client.clone(),
            Arc::clone(&locks),
        ))))
    });
    container
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use typing_core::ContainerError;

    fn cred() -> ClientCred {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"installed":{"client_id":"id","client_secret":"secret","redirect_uris":["http://localhost"]}}"#)
            .unwrap();
        ClientCred::from_file(file.path()).unwrap()
    }

    #[test]
    fn test_every_instance_type_is_registered() {
        let container = google_container(cred());
        let client = HttpClient::new();

        assert!(container.auth().is_ok());
        assert!(container.userinfo(&client).is_ok());
        assert!(container.notestore(&client).is_ok());
        assert!(container.sectionstore(&client).is_ok());
    }

    #[test]
    fn test_scoped_instances_need_a_client() {
        let container = google_container(cred());
        let result = container.get_instance(InstanceType::Notestore, None);
        assert!(matches!(result, Err(ContainerError::ActivationFailed(_))));
    }
}
