//! Batch write path shared by the sqlx-backed sinks.
//!
//! Each sink owns one connection in a `conn` field and its insert template
//! in `insert_sql`; only the database type differs, so the transaction
//! handling is generated per sink rather than written twice.

/// Implement [`BatchSink`](crate::sink::BatchSink) for a sqlx sink struct.
///
/// `write_batch` binds the five record fields for every record inside one
/// transaction and commits. On any failure the transaction is rolled back
/// (a failed rollback is only logged) and the batch is reported as a
/// [`SinkError::Write`](crate::sink::SinkError::Write). `close` releases
/// the connection.
macro_rules! impl_sql_batch_sink {
    ($sink:ident, $db:ty, $name:literal) => {
        #[::async_trait::async_trait]
        impl $crate::sink::BatchSink for $sink {
            async fn write_batch(
                &mut self,
                records: &[$crate::record::LogRecord],
            ) -> Result<(), $crate::sink::SinkError> {
                use ::sqlx::Connection;

                let mut tx = self
                    .conn
                    .begin()
                    .await
                    .map_err($crate::sink::SinkError::write)?;

                if let Err(e) = insert_all(&mut tx, &self.insert_sql, records).await {
                    if let Err(rollback) = tx.rollback().await {
                        ::tracing::warn!(error = %rollback, backend = $name, "rollback failed");
                    }
                    return Err($crate::sink::SinkError::write(e));
                }

                tx.commit().await.map_err($crate::sink::SinkError::write)
            }

            async fn close(self: Box<Self>) -> Result<(), $crate::sink::SinkError> {
                use ::sqlx::Connection;

                let conn = self.conn;
                conn.close().await.map_err($crate::sink::SinkError::close)
            }
        }

        async fn insert_all(
            tx: &mut ::sqlx::Transaction<'_, $db>,
            sql: &str,
            records: &[$crate::record::LogRecord],
        ) -> Result<(), ::sqlx::Error> {
            for record in records {
                ::sqlx::query(sql)
                    .bind(record.timestamp)
                    .bind(&record.level)
                    .bind(&record.source)
                    .bind(&record.message)
                    .bind(record.context.as_deref())
                    .execute(&mut **tx)
                    .await?;
            }
            Ok(())
        }
    };
}

pub(crate) use impl_sql_batch_sink;
