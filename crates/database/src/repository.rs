use crate::DbError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Row};

/// The `DbRepository` wraps one request-scoped pool and encapsulates the SQL
/// for the instrument catalog and the tick store.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A warrant row from `api_derivative`, joined with its issuing brokerage.
#[derive(Debug, Clone, FromRow)]
pub struct DbDerivative {
    pub code: String,
    pub underlying: Option<String>,
    pub option_type: Option<String>,
    pub strike_price: Option<Decimal>,
    pub issuer_id: Option<String>,
    pub expiry: NaiveDate,
    pub issuer_name: Option<String>,
}

/// A code observed on both the start and the end date.
#[derive(Debug, Clone)]
pub struct DbPricePair {
    pub code: String,
    pub start_price: Decimal,
    pub start_date: NaiveDate,
    pub end_price: Decimal,
    pub end_date: NaiveDate,
}

impl DbRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches warrants that are still alive after `end_date`.
    ///
    /// When `min_expiry` is given, only warrants expiring on or after it are kept.
    /// The issuer name prefers the brokerage's short title, then its full title,
    /// then the raw issuer code.
    pub async fn get_active_warrants(
        &self,
        end_date: NaiveDate,
        min_expiry: Option<NaiveDate>,
    ) -> Result<Vec<DbDerivative>, DbError> {
        let rows = sqlx::query_as::<_, DbDerivative>(
            r#"
            SELECT
                TRIM(d.code) AS code,
                d.underlying,
                d.option_type,
                d.strike_price::numeric AS strike_price,
                d.issuer_id,
                d.expiry::date AS expiry,
                COALESCE(b.short_title, b.title, d.issuer_id) AS issuer_name
            FROM api_derivative d
            LEFT JOIN api_brokerage b ON d.issuer_id = b.code
            WHERE d.expiry > $1
            AND ($2::date IS NULL OR d.expiry >= $2::date)
            AND d.type = 'warrant'
            "#,
        )
        .bind(end_date)
        .bind(min_expiry)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetches the closes of `codes` on exactly `start_date` and `end_date`.
    ///
    /// `bucket` is a `timestamptz`; it is shifted by `utc_offset_secs` before its
    /// date is taken, so both dates are calendar days in the reference zone. If a
    /// code has several bars on the same day, the latest bar wins. Codes missing
    /// either day are absent from the result.
    pub async fn get_price_pairs(
        &self,
        codes: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        utc_offset_secs: i32,
    ) -> Result<Vec<DbPricePair>, DbError> {
        let rows = sqlx::query(
            r#"
            WITH local_bars AS (
                SELECT
                    TRIM(code) AS code,
                    close::numeric AS close,
                    bucket,
                    ((bucket AT TIME ZONE 'UTC') + $4::int * INTERVAL '1 second')::date AS local_date
                FROM ohlcv_d
                WHERE TRIM(code) = ANY($1)
            ),
            start_prices AS (
                SELECT DISTINCT ON (code) code, close AS start_price, local_date AS start_date
                FROM local_bars
                WHERE local_date = $2
                ORDER BY code, bucket DESC
            ),
            end_prices AS (
                SELECT DISTINCT ON (code) code, close AS end_price, local_date AS end_date
                FROM local_bars
                WHERE local_date = $3
                ORDER BY code, bucket DESC
            )
            SELECT
                s.code,
                s.start_price,
                s.start_date,
                e.end_price,
                e.end_date
            FROM start_prices s
            INNER JOIN end_prices e ON s.code = e.code
            "#,
        )
        .bind(codes)
        .bind(start_date)
        .bind(end_date)
        .bind(utc_offset_secs)
        .fetch_all(&self.pool)
        .await?;

        let pairs = rows
            .into_iter()
            .map(|row| {
                Ok::<_, sqlx::Error>(DbPricePair {
                    code: row.try_get("code")?,
                    start_price: row.try_get("start_price")?,
                    start_date: row.try_get("start_date")?,
                    end_price: row.try_get("end_price")?,
                    end_date: row.try_get("end_date")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(pairs)
    }

    /// Closes the underlying pool, releasing its connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
