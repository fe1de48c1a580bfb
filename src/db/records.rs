//! Record repository - the two read queries over the `data` table
//!
//! The table is written by an external ingestion process; this repository
//! only reads it. Both queries run under a deadline so a hung database
//! fails the request instead of parking the handler forever.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One full observation row: a country's statistics at one point in time.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CaseRecord {
    pub id: Uuid,
    pub country: String,
    pub cases: i64,
    pub cases_today: i64,
    pub deaths: i64,
    pub deaths_today: i64,
    pub recovered: i64,
    pub active: i64,
    pub critical: i64,
    pub cases_per_one_million: f64,
    pub deaths_per_one_million: f64,
    /// When the statistic was observed upstream.
    pub updated: DateTime<Utc>,
    /// When the ingestion process recorded the row.
    pub time_ran: DateTime<Utc>,
}

/// The most recent observation for one country. The snapshot query does
/// not select `id` or `time_ran`, so this type has no place for them.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CountrySnapshot {
    pub country: String,
    pub cases: i64,
    pub cases_today: i64,
    pub deaths: i64,
    pub deaths_today: i64,
    pub recovered: i64,
    pub active: i64,
    pub critical: i64,
    pub cases_per_one_million: f64,
    pub deaths_per_one_million: f64,
    pub updated: DateTime<Utc>,
}

/// Database error type. Query and decode failures are kept apart so the
/// difference between "statement failed" and "row did not fit the record
/// shape" survives into logs.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("query failed: {0}")]
    Query(sqlx::Error),

    #[error("row decode failed: {0}")]
    Scan(sqlx::Error),

    #[error("query timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::Decode(_) => Self::Scan(e),
            other => Self::Query(other),
        }
    }
}

/// Record repository
pub struct RecordRepo<'a> {
    pool: &'a PgPool,
    timeout: Duration,
}

impl<'a> RecordRepo<'a> {
    pub fn new(pool: &'a PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Every row in the table, ordered by ascending case count.
    ///
    /// Either the whole table is returned or the operation fails; no
    /// partial results.
    pub async fn fetch_all(&self) -> Result<Vec<CaseRecord>, DbError> {
        self.with_deadline(
            sqlx::query_as::<_, CaseRecord>(
                r#"
                SELECT id, country, cases, cases_today, deaths, deaths_today,
                       recovered, active, critical,
                       cases_per_one_million, deaths_per_one_million,
                       updated, time_ran
                FROM data
                ORDER BY cases ASC
                "#,
            )
            .fetch_all(self.pool),
        )
        .await
    }

    /// For each distinct country, the row with the greatest `updated`.
    ///
    /// DISTINCT ON keeps the first row per country under the ORDER BY;
    /// rows sharing the same `updated` resolve to the higher case count.
    pub async fn fetch_latest_per_country(&self) -> Result<Vec<CountrySnapshot>, DbError> {
        self.with_deadline(
            sqlx::query_as::<_, CountrySnapshot>(
                r#"
                SELECT DISTINCT ON (country)
                       country, cases, cases_today, deaths, deaths_today,
                       recovered, active, critical,
                       cases_per_one_million, deaths_per_one_million,
                       updated
                FROM data
                ORDER BY country, updated DESC, cases DESC
                "#,
            )
            .fetch_all(self.pool),
        )
        .await
    }

    async fn with_deadline<T>(
        &self,
        query: impl Future<Output = Result<Vec<T>, sqlx::Error>>,
    ) -> Result<Vec<T>, DbError> {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(rows) => rows.map_err(DbError::from),
            Err(_) => Err(DbError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_classify_as_scan() {
        let err = DbError::from(sqlx::Error::ColumnNotFound("cases".to_string()));
        assert!(matches!(err, DbError::Scan(_)));

        let err = DbError::from(sqlx::Error::ColumnIndexOutOfBounds { index: 13, len: 11 });
        assert!(matches!(err, DbError::Scan(_)));
    }

    #[test]
    fn execution_failures_classify_as_query() {
        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DbError::Query(_)));

        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Query(_)));
    }

    #[test]
    fn timeout_message_names_the_deadline() {
        let err = DbError::Timeout { seconds: 10 };
        assert_eq!(err.to_string(), "query timed out after 10s");
    }
}
