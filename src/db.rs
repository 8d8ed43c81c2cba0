use std::str::FromStr;

use derive_more::Display;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, MySql, MySqlPool};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::utils::db_utils::{SqlParam, SqlValue, bind_params, decode_column};

#[derive(Debug, Display)]
pub enum DbError {
    #[display(fmt = "invalid database configuration: {}", _0)]
    Configuration(sqlx::Error),

    #[display(fmt = "database connection failed: {}", _0)]
    Connection(sqlx::Error),

    #[display(fmt = "query execution failed: {}", _0)]
    Query(sqlx::Error),
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Configuration(e) | DbError::Connection(e) | DbError::Query(e) => Some(e),
        }
    }
}

/// A connection checked out of the pool by [`DataAccess::connect`].
pub type DbConnection = PoolConnection<MySql>;

/// Handle to the payroll database. Cheap to clone; every clone shares the same
/// pool and each operation checks out its own connection.
#[derive(Clone, Debug)]
pub struct DataAccess {
    pool: MySqlPool,
}

impl DataAccess {
    /// Builds the pool without opening any connection yet.
    pub fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options = MySqlConnectOptions::from_str(&config.url).map_err(|e| {
            error!(error = %e, "Database connection string rejected");
            DbError::Configuration(e)
        })?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        info!(
            max_connections = config.max_connections,
            "Data access instance created"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Checks out a connection and pings it.
    pub async fn connect(&self) -> Result<DbConnection, DbError> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            error!(error = %e, "Failed to open a database connection");
            DbError::Connection(e)
        })?;

        conn.ping().await.map_err(|e| {
            error!(error = %e, "Database connection did not answer ping");
            DbError::Connection(e)
        })?;

        info!("Database connection established");
        Ok(conn)
    }

    /// Closes a connection obtained from [`DataAccess::connect`]. The pool opens
    /// a replacement on demand.
    pub async fn disconnect(&self, conn: DbConnection) -> Result<(), DbError> {
        conn.close().await.map_err(|e| {
            error!(error = %e, "Failed to close the database connection");
            DbError::Connection(e)
        })?;

        info!("Database connection closed");
        Ok(())
    }

    /// Closes every pooled connection. Safe to call more than once.
    pub async fn shutdown(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("Database pool closed");
        }
    }

    /// Runs `query` and returns the first column of the first row, if any.
    pub async fn execute_scalar(
        &self,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Option<SqlValue>, DbError> {
        debug!(query, "Executing scalar query");
        log_params(params);

        let row = bind_params(sqlx::query(query), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed(query, e))?;

        let value = match row {
            Some(row) => Some(decode_column(&row, 0).map_err(|e| query_failed(query, e))?),
            None => None,
        };

        match &value {
            Some(v) => debug!(rows = 1, result = %v, "Scalar query executed"),
            None => debug!(rows = 0, "Scalar query executed"),
        }
        Ok(value)
    }

    /// Runs a statement and returns the number of affected rows.
    pub async fn execute_non_query(
        &self,
        query: &str,
        params: &[SqlParam],
    ) -> Result<u64, DbError> {
        debug!(query, "Executing statement");
        log_params(params);

        let result = bind_params(sqlx::query(query), params)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed(query, e))?;

        let affected = result.rows_affected();
        debug!(affected, "Statement executed");
        Ok(affected)
    }

    /// Runs a query and returns every row in order. Columns are addressable by
    /// name through [`sqlx::Row::try_get`].
    pub async fn execute_query(
        &self,
        query: &str,
        params: &[SqlParam],
    ) -> Result<Vec<MySqlRow>, DbError> {
        info!(query, "Executing query");
        log_params(params);

        let rows = bind_params(sqlx::query(query), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(query, e))?;

        debug!(rows = rows.len(), "Query executed");
        Ok(rows)
    }
}

fn log_params(params: &[SqlParam]) {
    for param in params {
        debug!("Parameter: {} = {}", param.name, param.value);
    }
}

fn query_failed(query: &str, e: sqlx::Error) -> DbError {
    error!(error = %e, query, "Query execution failed");
    DbError::Query(e)
}
