use crate::sink::{BatchSink, SinkConnector, SinkError};
use crate::sql::impl_sql_batch_sink;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Executor, Sqlite};
use std::str::FromStr;

/// Connection settings for [`SqliteSink`].
///
/// URL examples: `sqlite://logs.db`, `sqlite::memory:`. The database file
/// is created if it does not exist; the target table is not.
#[derive(Clone, Debug)]
pub struct SqliteConnector {
    options: SqliteConnectOptions,
    insert_sql: String,
}

impl SqliteConnector {
    pub fn new(url: &str, insert_sql: impl Into<String>) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        Ok(SqliteConnector {
            options,
            insert_sql: insert_sql.into(),
        })
    }
}

#[async_trait]
impl SinkConnector for SqliteConnector {
    async fn connect(self: Box<Self>) -> Result<Box<dyn BatchSink>, SinkError> {
        let mut conn = self.options.connect().await.map_err(SinkError::init)?;
        (&mut conn)
            .prepare(self.insert_sql.as_str())
            .await
            .map_err(SinkError::init)?;

        Ok(Box::new(SqliteSink {
            conn,
            insert_sql: self.insert_sql,
        }))
    }
}

/// SQLite sink; same contract as the Postgres one, one transaction per
/// batch over a single owned connection.
pub struct SqliteSink {
    conn: SqliteConnection,
    insert_sql: String,
}

impl_sql_batch_sink!(SqliteSink, Sqlite, "sqlite");
