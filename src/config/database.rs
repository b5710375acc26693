use sqlx::{mysql::MySqlPoolOptions, MySql, Pool};

pub type DbPool = Pool<MySql>;

/// MySQL rejects prepared statements with more placeholders than this.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Upper bound on rows per multi-row statement, whatever the row width.
pub const MAX_BATCH_ROWS: usize = 1_000;

pub async fn init_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Rows that fit in one statement when each row binds `binds_per_row` values.
pub fn batch_size(binds_per_row: usize) -> usize {
    (MAX_BIND_PARAMS / binds_per_row.max(1)).clamp(1, MAX_BATCH_ROWS)
}
