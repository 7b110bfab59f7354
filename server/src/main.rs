use server::{AppState, ServerConfig};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let port = config.port;
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "befriend provider listening");
    server::serve(listener, state).await.expect("server failed");
}
