use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;

use async_db_log::{AsyncDbLogger, LoggerConfig, SinkConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = "sqlite://app_logs.db";

    let mut conn = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .connect()
        .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS app_logs (
            ts TEXT NOT NULL,
            level TEXT NOT NULL,
            source TEXT NOT NULL,
            message TEXT NOT NULL,
            context TEXT
        )",
    )
    .execute(&mut conn)
    .await?;

    let logger = AsyncDbLogger::connect(LoggerConfig::default(), &SinkConfig::new(url))?;
    for i in 0..1_000 {
        logger.info("demo", &format!("hello #{i}"));
    }
    logger.info("demo", "done!");
    let status = logger.stop().await;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM app_logs")
        .fetch_one(&mut conn)
        .await?;
    println!("stop: {:?}, rows in app_logs: {}", status, count);
    conn.close().await?;
    Ok(())
}
