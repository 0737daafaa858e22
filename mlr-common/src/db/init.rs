//! Database initialization
//!
//! Opens the SQLite pool with the connection policy every pooled connection
//! shares (foreign keys, WAL, busy timeout) and creates the schema.
//! Table and view creation is idempotent, so it runs at every startup when
//! `database.auto_init` is set and again on `POST /api/db/init`.

use crate::config::DatabaseConfig;
use crate::db::gateway::{Gateway, StoreResult};
use crate::db::procedures::admin::InitSchema;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

/// Open the connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let newly_created = !config.path.exists();

    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", config.path.display());
    } else {
        info!("Opened existing database: {}", config.path.display());
    }

    Ok(pool)
}

/// Open the pool, wrap it in a [`Gateway`] and create the schema if configured
pub async fn open(config: &DatabaseConfig) -> Result<Gateway> {
    let pool = connect(config).await?;
    let gateway = Gateway::new(pool, config.call_timeout);

    if config.auto_init {
        gateway.call(InitSchema).await?;
        info!("Database schema verified");
    }

    Ok(gateway)
}

/// Create every table and view (idempotent)
pub async fn create_schema(conn: &mut SqliteConnection) -> StoreResult<()> {
    create_person_table(conn).await?;
    create_record_label_table(conn).await?;
    create_contributor_table(conn).await?;
    create_employee_table(conn).await?;
    create_song_table(conn).await?;
    create_genre_tables(conn).await?;
    create_song_contributor_table(conn).await?;
    create_collaboration_table(conn).await?;
    create_collaboration_link_tables(conn).await?;
    create_views(conn).await?;
    Ok(())
}

async fn create_person_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS person (
            nif TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            date_of_birth TEXT,
            email TEXT,
            phone_number TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_record_label_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS record_label (
            record_label_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            location TEXT,
            website TEXT,
            email TEXT NOT NULL,
            phone_number TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_contributor_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contributor (
            contributor_id INTEGER PRIMARY KEY AUTOINCREMENT,
            nif TEXT NOT NULL UNIQUE REFERENCES person(nif) ON UPDATE CASCADE,
            roles TEXT NOT NULL CHECK (roles <> '')
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_employee_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employee (
            employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
            nif TEXT NOT NULL UNIQUE REFERENCES person(nif) ON UPDATE CASCADE,
            job_title TEXT NOT NULL,
            department TEXT,
            salary REAL NOT NULL CHECK (salary >= 0),
            hire_date TEXT NOT NULL,
            record_label_id INTEGER NOT NULL REFERENCES record_label(record_label_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_employee_record_label ON employee(record_label_id)")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn create_song_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song (
            song_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            duration INTEGER NOT NULL CHECK (duration > 0),
            release_date TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_genre_tables(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS genre (
            genre_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_genre (
            song_id INTEGER NOT NULL REFERENCES song(song_id) ON DELETE CASCADE,
            genre_id INTEGER NOT NULL REFERENCES genre(genre_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (song_id, genre_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_song_contributor_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_contributor (
            song_id INTEGER NOT NULL REFERENCES song(song_id) ON DELETE CASCADE,
            contributor_id INTEGER NOT NULL REFERENCES contributor(contributor_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (song_id, contributor_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_collaboration_table(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaboration (
            collaboration_id INTEGER PRIMARY KEY AUTOINCREMENT,
            collaboration_name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT,
            description TEXT,
            song_id INTEGER REFERENCES song(song_id) ON DELETE CASCADE,
            CHECK (end_date IS NULL OR end_date >= start_date)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_collaboration_song ON collaboration(song_id)")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn create_collaboration_link_tables(conn: &mut SqliteConnection) -> StoreResult<()> {
    // Labels are not cascaded: deleting a referenced label goes through the guard
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaboration_record_label (
            collaboration_id INTEGER NOT NULL REFERENCES collaboration(collaboration_id) ON DELETE CASCADE,
            record_label_id INTEGER NOT NULL REFERENCES record_label(record_label_id),
            position INTEGER NOT NULL,
            PRIMARY KEY (collaboration_id, record_label_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaboration_contributor (
            collaboration_id INTEGER NOT NULL REFERENCES collaboration(collaboration_id) ON DELETE CASCADE,
            contributor_id INTEGER NOT NULL REFERENCES contributor(contributor_id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (collaboration_id, contributor_id)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_views(conn: &mut SqliteConnection) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_contributors AS
        SELECT
            c.contributor_id,
            p.nif,
            p.name,
            p.date_of_birth,
            p.email,
            p.phone_number,
            (SELECT group_concat(DISTINCT rl.name)
               FROM collaboration_contributor cc
               JOIN collaboration_record_label crl ON crl.collaboration_id = cc.collaboration_id
               JOIN record_label rl ON rl.record_label_id = crl.record_label_id
              WHERE cc.contributor_id = c.contributor_id) AS record_label_name,
            c.roles
        FROM contributor c
        JOIN person p ON p.nif = c.nif
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_employees AS
        SELECT
            e.employee_id,
            p.nif,
            p.name,
            p.date_of_birth,
            e.job_title,
            e.department,
            CAST(e.salary AS REAL) AS salary,
            e.hire_date,
            p.email,
            p.phone_number,
            e.record_label_id,
            rl.name AS record_label_name
        FROM employee e
        JOIN person p ON p.nif = e.nif
        LEFT JOIN record_label rl ON rl.record_label_id = e.record_label_id
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_record_labels AS
        SELECT record_label_id, name, location, website, email, phone_number
        FROM record_label
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_songs AS
        SELECT
            s.song_id,
            s.title,
            s.duration,
            s.release_date,
            (SELECT group_concat(g.name, ', ' ORDER BY sg.position)
               FROM song_genre sg
               JOIN genre g ON g.genre_id = sg.genre_id
              WHERE sg.song_id = s.song_id) AS genres,
            (SELECT group_concat(c.nif, ', ' ORDER BY sc.position)
               FROM song_contributor sc
               JOIN contributor c ON c.contributor_id = sc.contributor_id
              WHERE sc.song_id = s.song_id) AS contributors,
            (SELECT group_concat(cb.collaboration_name, ', ' ORDER BY cb.collaboration_id)
               FROM collaboration cb
              WHERE cb.song_id = s.song_id) AS collaboration_name
        FROM song s
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_collaborations AS
        SELECT
            cb.collaboration_id,
            cb.collaboration_name,
            cb.start_date,
            cb.end_date,
            cb.description,
            cb.song_id,
            s.title AS song_title,
            (SELECT group_concat(rl.name, ', ' ORDER BY crl.position)
               FROM collaboration_record_label crl
               JOIN record_label rl ON rl.record_label_id = crl.record_label_id
              WHERE crl.collaboration_id = cb.collaboration_id) AS record_labels,
            (SELECT group_concat(c.nif, ', ' ORDER BY cc.position)
               FROM collaboration_contributor cc
               JOIN contributor c ON c.contributor_id = cc.contributor_id
              WHERE cc.collaboration_id = cb.collaboration_id) AS contributors
        FROM collaboration cb
        LEFT JOIN song s ON s.song_id = cb.song_id
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS vw_dashboard_counts AS
        SELECT
            (SELECT COUNT(*) FROM record_label) AS record_label_count,
            (SELECT COUNT(*) FROM employee) AS employee_count,
            (SELECT COUNT(*) FROM song) AS song_count,
            (SELECT COUNT(*) FROM contributor) AS contributor_count,
            (SELECT COUNT(*) FROM collaboration) AS collaboration_count
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
