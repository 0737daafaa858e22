//! Administrative scripts: schema creation, sample data, teardown

use sqlx::SqliteConnection;
use tracing::debug;

use crate::db::gateway::{Procedure, StoreResult};
use crate::db::init::create_schema;
use crate::db::scripts::{split_batches, DROP_SCRIPT, SEED_SCRIPT};

/// Run every batch of a script in order on one connection
async fn run_script(conn: &mut SqliteConnection, name: &str, script: &str) -> StoreResult<()> {
    let batches = split_batches(script);
    for (index, batch) in batches.iter().enumerate() {
        debug!(script = name, batch = index + 1, total = batches.len(), "Executing batch");
        sqlx::Executor::execute(&mut *conn, batch.as_str()).await?;
    }
    Ok(())
}

/// Create tables and views (idempotent)
#[derive(Debug, Clone, Copy)]
pub struct InitSchema;

impl Procedure for InitSchema {
    const NAME: &'static str = "InitSchema";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        create_schema(conn).await
    }
}

/// Load the sample data set
#[derive(Debug, Clone, Copy)]
pub struct PopulateSampleData;

impl Procedure for PopulateSampleData {
    const NAME: &'static str = "PopulateSampleData";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        run_script(conn, "populate", SEED_SCRIPT).await
    }
}

/// Drop every view and table
#[derive(Debug, Clone, Copy)]
pub struct DropAllTables;

impl Procedure for DropAllTables {
    const NAME: &'static str = "DropAllTables";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        run_script(conn, "drop_tables", DROP_SCRIPT).await
    }
}
