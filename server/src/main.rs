use std::net::SocketAddr;

use tokio::net::TcpListener;
use todo_search_server::config::ServerConfig;
use todo_search_server::error::StartupError;
use todo_search_server::{telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = ServerConfig::from_env()?;
    let state = AppState::connect(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    todo_search_server::run(listener, state).await?;
    Ok(())
}
