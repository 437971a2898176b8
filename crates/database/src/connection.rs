use crate::error::DbError;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// Opens a connection pool to a PostgreSQL database for a single request.
///
/// The pool holds at most one connection. It is not meant to be shared across
/// requests; call `PgPool::close` (or drop it) once the request's queries are done.
pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionError)?;

    Ok(pool)
}
