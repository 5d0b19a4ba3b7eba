//! Export and import of the registry response cache.
//!
//! The file is a SQLite database at `<path>.resolve.maven`. Loading validates
//! everything into a fresh map first and swaps it in only when the whole file
//! checked out, so a rejected file never leaves a half-loaded cache behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rusqlite::{params, Connection, OpenFlags};
use tracing::{info, warn};

use crate::errors::{ResolveError, ResolveResult};
use crate::registry::{MavenRegistryApiClient, RawResponse};
use crate::store::schema::{
    get_meta, init_schema, set_meta, CACHE_FORMAT_VERSION, META_ENTRY_COUNT, META_FORMAT_VERSION,
    META_REGISTRY_URL,
};

pub const CACHE_EXTENSION: &str = ".resolve.maven";

/// `path` with [`CACHE_EXTENSION`] appended.
pub fn cache_path(path: &Path) -> PathBuf {
    let mut file: OsString = path.as_os_str().to_owned();
    file.push(CACHE_EXTENSION);
    PathBuf::from(file)
}

fn checksum(request_key: &str, response: &RawResponse) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(request_key.as_bytes());
    hasher.update(&response.status.to_be_bytes());
    hasher.update(&response.body);
    hasher.finalize()
}

fn incompatible(file: &Path, reason: impl ToString) -> ResolveError {
    ResolveError::CacheFormat {
        path: file.to_path_buf(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Persist every cached response of `api`, replacing any earlier file.
///
/// The database is built in a staging file beside the target and renamed
/// over it once committed. A failed write leaves the earlier file in place.
pub fn write_cache(api: &MavenRegistryApiClient, path: &Path) -> ResolveResult<()> {
    let file = cache_path(path);
    let entries = api.cache_snapshot();

    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".resolve-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    write_entries(staged.path(), api.config().base_url(), &entries)?;
    staged
        .persist(&file)
        .map_err(|e| ResolveError::Io(e.error))?;

    info!("wrote {} cached responses to {}", entries.len(), file.display());
    Ok(())
}

fn write_entries(
    file: &Path,
    registry_url: &str,
    entries: &IndexMap<String, RawResponse>,
) -> ResolveResult<()> {
    let mut conn = Connection::open(file)?;
    init_schema(&conn)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO responses (position, request_key, status, body, checksum) \
             VALUES (?1, ?2, ?3, ?4, ?5);",
        )?;
        for (position, (request_key, response)) in entries.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                request_key,
                response.status,
                response.body,
                checksum(request_key, response),
            ])?;
        }
    }
    set_meta(&tx, META_FORMAT_VERSION, &CACHE_FORMAT_VERSION.to_string())?;
    set_meta(&tx, META_REGISTRY_URL, registry_url)?;
    set_meta(&tx, META_ENTRY_COUNT, &entries.len().to_string())?;
    tx.commit()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Replace the cache of `api` with the contents of a file written by
/// [`write_cache`]. On failure the current cache is left as it was.
pub fn load_cache(api: &MavenRegistryApiClient, path: &Path) -> ResolveResult<()> {
    let file = cache_path(path);
    match read_entries(&file, api.config().base_url()) {
        Ok(entries) => {
            info!("loaded {} cached responses from {}", entries.len(), file.display());
            api.replace_cache(entries);
            Ok(())
        }
        Err(e) => {
            warn!("rejected response cache {}: {e}", file.display());
            Err(e)
        }
    }
}

fn read_entries(file: &Path, registry_url: &str) -> ResolveResult<IndexMap<String, RawResponse>> {
    if !file.is_file() {
        return Err(ResolveError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("cache file does not exist: {}", file.display()),
        )));
    }
    let conn = Connection::open_with_flags(
        file,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let version = get_meta(&conn, META_FORMAT_VERSION).map_err(|e| incompatible(file, e))?;
    if version.as_deref() != Some(CACHE_FORMAT_VERSION.to_string().as_str()) {
        return Err(incompatible(
            file,
            format!(
                "format version {} (expected {CACHE_FORMAT_VERSION})",
                version.as_deref().unwrap_or("missing")
            ),
        ));
    }

    let written_for = get_meta(&conn, META_REGISTRY_URL)?.unwrap_or_default();
    if written_for != registry_url {
        return Err(incompatible(
            file,
            format!("written for registry {written_for}, not {registry_url}"),
        ));
    }

    let expected: usize = get_meta(&conn, META_ENTRY_COUNT)?
        .and_then(|count| count.parse().ok())
        .ok_or_else(|| incompatible(file, "missing entry count"))?;

    let mut stmt = conn.prepare(
        "SELECT request_key, status, body, checksum FROM responses ORDER BY position;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Vec<u8>>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut entries = IndexMap::with_capacity(expected);
    for row in rows {
        let (request_key, status, body, stored) = row?;
        let status = u16::try_from(status)
            .map_err(|_| incompatible(file, format!("status {status} for {request_key}")))?;
        let response = RawResponse { status, body };
        if i64::from(checksum(&request_key, &response)) != stored {
            return Err(incompatible(file, format!("checksum mismatch for {request_key}")));
        }
        entries.insert(request_key, response);
    }

    if entries.len() != expected {
        return Err(incompatible(
            file,
            format!("{} entries, header says {expected}", entries.len()),
        ));
    }
    Ok(entries)
}
