use mock_server::Credentials;
use tokio::net::TcpListener;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    init_logging();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let credentials = Credentials {
        token: std::env::var("RT_TOKEN").ok(),
        login: std::env::var("RT_USER")
            .ok()
            .zip(std::env::var("RT_PASS").ok()),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, auth = credentials.token.is_some() || credentials.login.is_some(), "listening");
    mock_server::run(listener, credentials).await
}

fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}
