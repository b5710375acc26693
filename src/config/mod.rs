pub mod database;
pub mod environment;

pub use database::{batch_size, init_db, DbPool};
pub use environment::{Config, ConfigError, SmtpConfig};
