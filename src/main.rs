use anyhow::Result;
use filestash_oidc_bridge::{
    config::{self, AppConfig},
    routes::routes,
    services::bridge_service::BridgeService,
};
use std::{io::ErrorKind, net::SocketAddr};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filestash_oidc_bridge=info")),
        )
        .init();

    // --- Optional .env, then parse + validate config before touching the network ---
    if let Some(path) = config::load_env_file() {
        tracing::info!("Loaded environment from {}", path.display());
    }
    let cfg = AppConfig::from_env_and_args()
        .inspect_err(|e| tracing::error!("Refusing to start: {}", e))?;

    tracing::info!("Starting filestash-oidc-bridge with config: {:?}", cfg);

    // --- Shared outbound client + router ---
    let service = BridgeService::new(cfg.clone())?;
    tracing::info!(
        login = %cfg.login_path(),
        callback = %cfg.redirect_uri(),
        "Routes mounted"
    );
    let app = routes::app(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
