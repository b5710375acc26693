use std::net::SocketAddr;
use std::sync::Arc;

use handicraft_store::config::{init_db, Config};
use handicraft_store::services::email::{LogMailer, Mailer, SmtpMailer};
use handicraft_store::services::jwt::JwtService;
use handicraft_store::AppSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handicraft_store=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let db = init_db(&config.database_url).await?;
    tracing::info!("Connected to MySQL");

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, "Using SMTP relay for email");
            Arc::new(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let jwt_service = JwtService::new(config.jwt_secret.clone()).with_expiry_hours(config.jwt_expiry_hours);

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let mut settings = AppSettings::from_config(&config);
    if let Some(path) = &config.invoice_font_path {
        let font = tokio::fs::read(path).await?;
        tracing::info!(path = %path.display(), "Loaded invoice font");
        settings.invoice_font = Some(Arc::new(font));
    }

    let app = handicraft_store::create_app(db, jwt_service, mailer, settings).await;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    // Peer addresses key the auth rate limiter.
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
