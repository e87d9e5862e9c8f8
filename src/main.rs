use mood_do_dia::identity::LocalIdentityProvider;
use mood_do_dia::store::JsonFileStore;
use mood_do_dia::{AppState, Config, router};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let store = JsonFileStore::open(&config.data_path).await;
    let provider = LocalIdentityProvider::open(&config.accounts_path).await;
    let state = AppState::new(provider, store);

    let session_task = state.controller.spawn();
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    }
}
