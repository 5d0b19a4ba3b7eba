//! SQLite schema of the on-disk response cache.

use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ResolveResult;

/// Bumped whenever the tables below change shape. A file with any other
/// version is refused rather than migrated: it only holds cached responses.
pub const CACHE_FORMAT_VERSION: i64 = 1;

pub const META_FORMAT_VERSION: &str = "format_version";
pub const META_REGISTRY_URL: &str = "registry_url";
pub const META_ENTRY_COUNT: &str = "entry_count";

pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS cache_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS responses (
        position INTEGER PRIMARY KEY,
        request_key TEXT NOT NULL UNIQUE,
        status INTEGER NOT NULL,
        body BLOB NOT NULL,
        checksum INTEGER NOT NULL
    );",
];

pub fn init_schema(conn: &Connection) -> ResolveResult<()> {
    for stmt in SCHEMA_STATEMENTS {
        conn.execute_batch(stmt)?;
    }
    Ok(())
}

/// Upsert one `cache_meta` entry.
pub fn set_meta(conn: &Connection, key: &str, value: &str) -> ResolveResult<()> {
    conn.execute(
        "INSERT INTO cache_meta(key, value) VALUES(?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_meta(conn: &Connection, key: &str) -> ResolveResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM cache_meta WHERE key = ?1;",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}
