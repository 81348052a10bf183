use mock_server::AppState;
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_server=info,tower_http=info")),
        )
        .init();

    let mut state = AppState::new();
    if let Some(token) = std::env::var("MOCK_TOKEN").ok().filter(|t| !t.is_empty()) {
        state = state.with_token(token);
    }
    state.add_service("demo", "Demo service").await;
    state
        .insert_blob("demo", "eng", json!({"greeting": "Hello", "farewell": "Goodbye"}))
        .await;

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock translations service listening");
    mock_server::run_with_state(listener, state).await
}
