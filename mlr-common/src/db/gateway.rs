//! Stored-Procedure Gateway
//!
//! Every store interaction is a [`Procedure`]: a typed value carrying its
//! positional inputs, executed by [`Gateway::call`] as one unit of work:
//!
//! 1. acquire a pooled connection and begin a transaction
//! 2. execute the procedure, bounded by the per-call timeout
//! 3. commit on success, roll back on any error
//! 4. release the connection on every exit path
//!
//! A unit of work that loses a write lock to a concurrent writer is rolled
//! back and run again from the start with exponential backoff. Retries stop
//! when the per-call timeout elapses.
//!
//! If the caller's future is dropped (client disconnect) the open
//! transaction is dropped with it, which rolls back and returns the
//! connection to the pool.
//!
//! Store errors are decoded exactly once, here, into [`StoreError`].

use sqlx::error::ErrorKind;
use sqlx::{SqliteConnection, SqlitePool};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Result of a stored-procedure call
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Application-level error codes raised by procedures
///
/// Numeric values are stable and appear in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCode {
    RecordLabelNotFound,
    RecordLabelDeleteNotFound,
    EmployeeNotFound,
    EmployeeDeleteNotFound,
    ContributorNotFound,
    SongNotFound,
    CollaborationNotFound,
    CollaborationDeleteNotFound,
    ReferencedLabelNotFound,
    ReferencedContributorNotFound,
    PersonNotFound,
    SongTitleAmbiguous,
    NifImmutable,
}

/// How a signalled code is classified for clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    NotFound,
    Invalid,
}

impl StoreCode {
    pub fn code(self) -> u32 {
        match self {
            StoreCode::RecordLabelNotFound => 50000,
            StoreCode::RecordLabelDeleteNotFound => 50001,
            StoreCode::EmployeeNotFound => 50011,
            StoreCode::EmployeeDeleteNotFound => 50012,
            StoreCode::ContributorNotFound => 50020,
            StoreCode::SongNotFound => 50025,
            StoreCode::CollaborationNotFound => 50030,
            StoreCode::CollaborationDeleteNotFound => 50031,
            StoreCode::ReferencedLabelNotFound => 50040,
            StoreCode::ReferencedContributorNotFound => 50041,
            StoreCode::PersonNotFound => 51010,
            StoreCode::SongTitleAmbiguous => 51030,
            StoreCode::NifImmutable => 51040,
        }
    }

    pub fn kind(self) -> SignalKind {
        match self {
            StoreCode::SongTitleAmbiguous | StoreCode::NifImmutable => SignalKind::Invalid,
            _ => SignalKind::NotFound,
        }
    }
}

impl fmt::Display for StoreCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Decoded store failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique, foreign-key, not-null or check constraint violated
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Procedure raised an application error
    #[error("[{code}] {message}")]
    Signal { code: StoreCode, message: String },

    /// Call exceeded the per-call timeout and was rolled back
    #[error("Procedure {procedure} timed out after {millis} ms")]
    Timeout { procedure: &'static str, millis: u64 },

    /// Lock held by a concurrent writer (SQLITE_BUSY / SQLITE_LOCKED)
    #[error("Store locked: {0}")]
    Busy(String),

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn signal(code: StoreCode, message: impl Into<String>) -> Self {
        StoreError::Signal {
            code,
            message: message.into(),
        }
    }

    /// Code of a signalled error, if any
    pub fn code(&self) -> Option<StoreCode> {
        match self {
            StoreError::Signal { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return StoreError::Integrity(db_err.message().to_string());
                }
                _ if is_lock_error(db_err.code().as_deref(), db_err.message()) => {
                    return StoreError::Busy(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// SQLite primary result codes 5 (BUSY) and 6 (LOCKED), extended codes included
fn is_lock_error(code: Option<&str>, message: &str) -> bool {
    let primary = code.and_then(|c| c.parse::<i32>().ok()).map(|c| c & 0xff);
    matches!(primary, Some(5) | Some(6)) || message.contains("database is locked")
}

/// A named remote call with positional inputs and a typed output
///
/// `Clone` lets the gateway run the same call again after a lock conflict.
pub trait Procedure: Send + Clone {
    /// Procedure name used in logs
    const NAME: &'static str;

    type Output: Send;

    /// Run against a connection that is already inside a transaction
    fn execute(
        self,
        conn: &mut SqliteConnection,
    ) -> impl Future<Output = StoreResult<Self::Output>> + Send;
}

/// Typed entry point to the relational store
#[derive(Debug, Clone)]
pub struct Gateway {
    pool: SqlitePool,
    call_timeout: Duration,
}

impl Gateway {
    pub fn new(pool: SqlitePool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute one procedure as its own transaction
    pub async fn call<P: Procedure>(&self, procedure: P) -> StoreResult<P::Output> {
        let started = Instant::now();

        let unit_of_work = retry_on_lock(&self.pool, procedure);
        let result = match tokio::time::timeout(self.call_timeout, unit_of_work).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                procedure: P::NAME,
                millis: self.call_timeout.as_millis() as u64,
            }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(procedure = P::NAME, elapsed_ms, "Procedure completed"),
            Err(err) => debug!(procedure = P::NAME, elapsed_ms, error = %err, "Procedure failed"),
        }

        result
    }
}

const INITIAL_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_MS: u64 = 500;

/// Run the unit of work, starting over while the store reports a lock conflict
async fn retry_on_lock<P: Procedure>(pool: &SqlitePool, procedure: P) -> StoreResult<P::Output> {
    let mut attempt = 1u32;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        match run_in_transaction(pool, procedure.clone()).await {
            Err(StoreError::Busy(detail)) => {
                warn!(
                    procedure = P::NAME,
                    attempt,
                    backoff_ms,
                    error = %detail,
                    "Store locked, will retry after backoff"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                attempt += 1;
            }
            result => {
                if attempt > 1 {
                    debug!(procedure = P::NAME, attempt, "Procedure succeeded after retry");
                }
                return result;
            }
        }
    }
}

async fn run_in_transaction<P: Procedure>(
    pool: &SqlitePool,
    procedure: P,
) -> StoreResult<P::Output> {
    let mut tx = pool.begin().await?;
    match procedure.execute(&mut *tx).await {
        Ok(output) => {
            tx.commit().await?;
            Ok(output)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(
                    procedure = P::NAME,
                    error = %rollback_err,
                    "Rollback failed; connection will be discarded"
                );
            }
            Err(err)
        }
    }
}
