use std::env;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// SMTP relay settings. Only present when `SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub port: u16,
    pub public_base_url: String,
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub max_body_bytes: usize,
    pub auth_rate_limit_per_minute: u32,
    /// Key rate limits by `X-Forwarded-For`/`X-Real-IP` instead of the peer address.
    pub trust_proxy_headers: bool,
    pub admin_notify_email: Option<String>,
    /// TrueType font embedded in invoices; needed for non-Latin text.
    pub invoice_font_path: Option<PathBuf>,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = required("DATABASE_URL")?;

        // No fallback: a missing signing secret must stop the server.
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiry_hours = parsed("JWT_EXPIRY_HOURS", 24)?;
        let port = parsed("PORT", 5000)?;

        let public_base_url = optional("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let frontend_url = optional("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let upload_dir = PathBuf::from(optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));

        let max_body_bytes = parsed("MAX_BODY_BYTES", 10 * 1024 * 1024)?;
        let auth_rate_limit_per_minute = parsed("AUTH_RATE_LIMIT_PER_MINUTE", 30)?;
        let trust_proxy_headers = parsed("TRUST_PROXY_HEADERS", false)?;

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parsed("SMTP_PORT", 587)?,
                username: optional("SMTP_USERNAME").unwrap_or_default(),
                password: optional("SMTP_PASSWORD").unwrap_or_default(),
                from_address: required("SMTP_FROM")?,
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiry_hours,
            port,
            public_base_url,
            frontend_url,
            upload_dir,
            max_body_bytes,
            auth_rate_limit_per_minute,
            trust_proxy_headers,
            admin_notify_email: optional("ADMIN_NOTIFY_EMAIL"),
            invoice_font_path: optional("INVOICE_FONT_PATH").map(PathBuf::from),
            smtp,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
