use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock server listening");
    mock_server::run(listener).await
}

fn log_filter() -> EnvFilter {
    match std::env::var("MOCK_SERVER_LOG").or_else(|_| std::env::var("RUST_LOG")) {
        Ok(filter) => EnvFilter::new(filter),
        Err(_) => EnvFilter::new("info"),
    }
}
