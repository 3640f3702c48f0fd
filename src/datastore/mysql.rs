//! MySQL-backed datastore over a single long-lived connection

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Row};

use super::{Datastore, DatastoreError};
use crate::metrics::{HourlyBucket, Measurement};

/// Connection settings for the monitored database
#[derive(Debug, Clone)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub charset: String,
}

impl MySqlConfig {
    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset(&self.charset)
    }
}

/// Production datastore: one `MySqlConnection` held for the monitor's
/// lifetime. No pool; probes run sequentially against this connection.
pub struct MySqlStore {
    conn: MySqlConnection,
}

impl MySqlStore {
    /// Establish the connection. Failure here is fatal at startup.
    pub async fn connect(config: &MySqlConfig) -> Result<Self, DatastoreError> {
        let conn = MySqlConnection::connect_with(&config.connect_options())
            .await
            .map_err(DatastoreError::Connect)?;
        Ok(Self { conn })
    }

    /// Create the measurement log table if it does not exist yet
    pub async fn ensure_schema(&mut self) -> Result<(), DatastoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS query_monitor (
                log_id BIGINT PRIMARY KEY AUTO_INCREMENT,
                query_type VARCHAR(20),
                exec_time FLOAT,
                rows_examined INT,
                lock_time FLOAT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                INDEX idx_created (created_at)
            ) ENGINE=InnoDB
            "#,
        )
        .execute(&mut self.conn)
        .await
        .map_err(DatastoreError::Query)?;
        Ok(())
    }

    /// Release the connection on clean shutdown
    pub async fn close(self) -> Result<(), DatastoreError> {
        self.conn.close().await.map_err(DatastoreError::Query)
    }
}

#[async_trait]
impl Datastore for MySqlStore {
    async fn explain(&mut self, statement: &str) -> Result<String, DatastoreError> {
        let sql = format!("EXPLAIN FORMAT=JSON {statement}");
        let row = sqlx::query(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(DatastoreError::Query)?;
        row.try_get::<String, _>(0)
            .map_err(|e| DatastoreError::Decode(e.to_string()))
    }

    async fn append(&mut self, measurement: &Measurement) -> Result<(), DatastoreError> {
        // created_at is assigned by the column default at insert time
        sqlx::query(
            r#"
            INSERT INTO query_monitor (query_type, exec_time, rows_examined, lock_time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(measurement.query_kind.as_str())
        .bind(measurement.exec_time)
        .bind(measurement.rows_examined)
        .bind(measurement.lock_time)
        .execute(&mut self.conn)
        .await
        .map_err(DatastoreError::Query)?;
        Ok(())
    }

    async fn hourly_summary(
        &mut self,
        lookback_hours: u32,
    ) -> Result<Vec<HourlyBucket>, DatastoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                HOUR(created_at) AS hour,
                AVG(exec_time) AS avg_time,
                MAX(rows_examined) AS max_rows
            FROM query_monitor
            WHERE created_at > NOW() - INTERVAL ? HOUR
            GROUP BY hour
            ORDER BY hour
            "#,
        )
        .bind(lookback_hours)
        .fetch_all(&mut self.conn)
        .await
        .map_err(DatastoreError::Query)?;

        rows.into_iter()
            .map(|row| {
                let hour: i64 = row
                    .try_get("hour")
                    .map_err(|e| DatastoreError::Decode(e.to_string()))?;
                let avg_exec_time: f64 = row
                    .try_get("avg_time")
                    .map_err(|e| DatastoreError::Decode(e.to_string()))?;
                let max_rows: i64 = row
                    .try_get("max_rows")
                    .map_err(|e| DatastoreError::Decode(e.to_string()))?;
                Ok(HourlyBucket {
                    hour: hour as u32,
                    avg_exec_time,
                    max_rows_examined: max_rows.max(0) as u64,
                })
            })
            .collect()
    }
}
