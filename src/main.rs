use tracing_subscriber::EnvFilter;

use game_admin::client::ApiClient;
use game_admin::config::Config;
use game_admin::metrics;
use game_admin::seal::UserSeal;
use game_admin::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("game_admin=info,tower_http=info")),
        )
        .init();

    let config = Config::load();
    metrics::register_metrics();

    match config.token_fingerprint() {
        Some(fingerprint) => tracing::info!(%fingerprint, "using configured API token"),
        None => tracing::warn!("ADMIN_API_TOKEN is not set; API calls will be unauthorized"),
    }

    let seal = match config.seal_key.as_deref() {
        Some(key) => UserSeal::from_hex(key)?,
        None => {
            tracing::warn!("ADMIN_SEAL_KEY is not set; open management pages expire on restart");
            UserSeal::random()?
        }
    };

    let client = ApiClient::new(&config.api_settings())?;
    let app = web::router(AppState::new(client, seal));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(
        port = config.port,
        api = %config.api_base_url,
        "game admin console listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
