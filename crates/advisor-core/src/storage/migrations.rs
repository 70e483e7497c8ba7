//! Database migrations
//!
//! Versioned SQLite schema for the knowledge graph, applied automatically
//! when a database is opened.

use anyhow::Context;
use sqlx::SqlitePool;
use tracing::{debug, info};

pub const CURRENT_VERSION: i32 = 1;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: knowledge graph nodes and relationships
///
/// Relationships carry no foreign keys: an edge may reference a node that a
/// later document introduces, or one whose write failed.
const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS advisory_nodes (
        id TEXT PRIMARY KEY NOT NULL,
        node_type TEXT NOT NULL CHECK (node_type IN ('pain_point', 'solution', 'tool', 'industry', 'business_process')),
        name TEXT NOT NULL,
        properties TEXT NOT NULL DEFAULT '{}',
        source_documents TEXT NOT NULL DEFAULT '[]',
        confidence REAL NOT NULL DEFAULT 0.0 CHECK (confidence >= 0.0 AND confidence <= 100.0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_advisory_nodes_type ON advisory_nodes(node_type);
    CREATE INDEX IF NOT EXISTS idx_advisory_nodes_name ON advisory_nodes(name);

    CREATE TABLE IF NOT EXISTS advisory_relationships (
        id TEXT PRIMARY KEY NOT NULL,
        source_id TEXT NOT NULL,
        target_id TEXT NOT NULL,
        relationship_type TEXT NOT NULL CHECK (relationship_type IN ('SOLVES', 'IMPLEMENTS', 'REQUIRES', 'CAUSES', 'PREVENTS')),
        properties TEXT NOT NULL DEFAULT '{}',
        weight REAL NOT NULL DEFAULT 1.0,
        confidence REAL NOT NULL DEFAULT 0.0,
        source_document TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_advisory_relationships_source ON advisory_relationships(source_id);
    CREATE INDEX IF NOT EXISTS idx_advisory_relationships_target ON advisory_relationships(target_id);
    CREATE INDEX IF NOT EXISTS idx_advisory_relationships_type ON advisory_relationships(relationship_type);
    CREATE INDEX IF NOT EXISTS idx_advisory_relationships_document ON advisory_relationships(source_document);
"#;

/// Schema steps in version order
const MIGRATIONS: &[(i32, &str, &str)] = &[(1, "knowledge graph tables", MIGRATION_V1)];

async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    let (version,): (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_one(pool)
        .await?;

    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded version, each in its own
/// transaction
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(version, _, _)| *version > current_version)
        .collect();

    if pending.is_empty() {
        debug!(version = current_version, "Database schema is up to date");
        return Ok(());
    }

    for &(version, description, sql) in pending {
        info!(version, description, "Applying migration");

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Migration v{} failed", version))?;
        sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    info!(version = CURRENT_VERSION, "Database migrations completed");
    Ok(())
}

pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub current_version: i32,
    pub target_version: i32,
    pub needs_migration: bool,
}
