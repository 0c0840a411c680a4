use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use typing_gdrive::ClientCred;
use typing_server::bootstrap::{google_container, init_logging};
use typing_server::server::{serve, shutdown_signal};
use typing_server::version::version_string;
use typing_server::{router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    if config.version {
        println!("{}", version_string());
        return Ok(());
    }

    init_logging(config.log_level);

    info!("Starting {}", version_string());
    info!("  Client cred: {}", config.client_cred.display());

    let cred = ClientCred::from_file(&config.client_cred).with_context(|| {
        format!(
            "unable to load google client cred from '{}'",
            config.client_cred.display()
        )
    })?;

    let state = AppState::new(google_container(cred));
    let app = router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port.unwrap_or(0)))
        .await
        .with_context(|| format!("unable to bind {}:{:?}", config.host, config.port))?;
    info!("Listening on http://{}", listener.local_addr()?);

    serve(
        listener,
        app,
        Duration::from_secs(config.shutdown_grace_secs),
        shutdown_signal(),
    )
    .await
}
