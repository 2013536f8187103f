use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ax = link_server::build()?;

    let host = ax
        .state
        .app
        .get("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let port = ax
        .state
        .app
        .get("http.port")
        .unwrap_or_else(|| "3000".to_string());

    let addr = format!("{host}:{port}");

    info!("[links] listening on http://{addr}");

    ax.listen(addr).await?;

    Ok(())
}
