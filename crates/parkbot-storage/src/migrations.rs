//! Database schema migrations.
//!
//! Applies the initial schema: conversation_states, chat_messages, rides,
//! ticket_types, and the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use parkbot_core::error::ParkbotError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), ParkbotError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| ParkbotError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| ParkbotError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), ParkbotError> {
    conn.execute_batch(
        "
        -- One row per user; slots and transcript are JSON documents.
        CREATE TABLE IF NOT EXISTS conversation_states (
            user_id                 TEXT PRIMARY KEY NOT NULL,
            active_intent           TEXT,
            slots                   TEXT NOT NULL DEFAULT '{}',
            transcript              TEXT NOT NULL DEFAULT '[]',
            last_interaction_time   INTEGER NOT NULL
        );

        -- seq breaks timestamp ties so a user message always sorts before
        -- the reply written in the same millisecond.
        CREATE TABLE IF NOT EXISTS chat_messages (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL UNIQUE,
            user_id     TEXT NOT NULL,
            text        TEXT NOT NULL,
            sender      TEXT NOT NULL CHECK (sender IN ('user', 'bot')),
            timestamp   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_user
            ON chat_messages (user_id, timestamp ASC, seq ASC);

        CREATE TABLE IF NOT EXISTS rides (
            id          TEXT PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category    TEXT NOT NULL,
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_rides_category
            ON rides (category);

        CREATE TABLE IF NOT EXISTS ticket_types (
            id                  TEXT PRIMARY KEY NOT NULL,
            name                TEXT NOT NULL,
            description         TEXT NOT NULL DEFAULT '',
            ride_limit          INTEGER NOT NULL CHECK (ride_limit >= 0),
            price               REAL NOT NULL CHECK (price >= 0),
            free_for_children   INTEGER NOT NULL DEFAULT 0,
            created_at          INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| ParkbotError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
