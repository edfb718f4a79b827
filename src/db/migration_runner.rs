//! Versioned schema migrations.
//!
//! Each applied migration is recorded in `schema_migrations` with the
//! SHA-256 of its SQL, so an edited migration file is caught on the next
//! start. File databases are copied to `backups/` before anything runs.

use rusqlite::{params, Connection, OptionalExtension, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const MAX_BACKUPS: usize = 5;
const BACKUP_PREFIX: &str = "pre_migration_";

pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn checksum(&self) -> String {
        format!("{:x}", Sha256::digest(self.sql.as_bytes()))
    }
}

/// Ordered by version; version N sits at index N.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 0,
        name: "bootstrap",
        sql: include_str!("migrations/000_bootstrap.sql"),
    },
    Migration {
        version: 1,
        name: "initial_schema",
        sql: include_str!("migrations/001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        name: "add_settings",
        sql: include_str!("migrations/002_add_settings.sql"),
    },
];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema up to date. Returns how many migrations ran, not
/// counting the bookkeeping table itself.
pub fn migrate(conn: &Connection, db_path: &str) -> Result<usize> {
    if !has_table(conn, "schema_migrations")? {
        if has_table(conn, "trades")? {
            adopt_unversioned(conn)?;
        } else {
            apply(conn, &MIGRATIONS[0])?;
        }
    }

    let current = schema_version(conn)?.unwrap_or(0);
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    let Some(target) = pending.last().map(|m| m.version) else {
        return Ok(0);
    };
    log::info!(
        "Schema at version {}, {} migrations pending",
        current,
        pending.len()
    );

    let backup = if current > 0 && is_file_database(db_path) {
        Some(create_backup(db_path, target)?)
    } else {
        None
    };

    for migration in &pending {
        if let Err(e) = apply(conn, migration) {
            log::error!(
                "Migration {} ({}) failed and was rolled back: {}",
                migration.version,
                migration.name,
                e
            );
            if let Some(path) = &backup {
                log::error!("Pre-migration backup: {}", path.display());
            }
            return Err(e);
        }
    }

    Ok(pending.len())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let started = Instant::now();

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    let elapsed_ms = started.elapsed().as_millis() as i64;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            migration.version,
            migration.name,
            unix_now(),
            migration.checksum(),
            elapsed_ms
        ],
    )?;
    tx.commit()?;

    log::info!(
        "Applied migration {} ({}) in {}ms",
        migration.version,
        migration.name,
        elapsed_ms
    );
    Ok(())
}

/// Fail if a recorded checksum no longer matches its migration's SQL.
pub fn verify_checksums(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT version, checksum FROM schema_migrations WHERE checksum IS NOT NULL",
    )?;
    let recorded = stmt
        .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>>>()?;

    for (version, checksum) in recorded {
        let Some(migration) = MIGRATIONS.get(version as usize) else {
            continue;
        };
        if checksum != migration.checksum() {
            log::error!(
                "Migration {} ({}) was modified after it was applied",
                version,
                migration.name
            );
            return Err(rusqlite::Error::InvalidQuery);
        }
    }
    Ok(())
}

/// Highest applied version, or `None` before the bookkeeping table exists.
pub fn schema_version(conn: &Connection) -> Result<Option<u32>> {
    if !has_table(conn, "schema_migrations")? {
        return Ok(None);
    }
    Ok(conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| row.get(0))
        .optional()?
        .flatten())
}

/// Databases created before versioning: record the migrations their tables
/// show were already applied, without re-running them.
fn adopt_unversioned(conn: &Connection) -> Result<()> {
    let version = if has_table(conn, "settings")? { 2 } else { 1 };
    log::info!("Unversioned database looks like schema version {}", version);

    apply(conn, &MIGRATIONS[0])?;
    for migration in &MIGRATIONS[1..=version] {
        conn.execute(
            "INSERT INTO schema_migrations (version, name, applied_at, notes)
             VALUES (?1, ?2, ?3, 'adopted from unversioned database')",
            params![migration.version, migration.name, unix_now()],
        )?;
    }
    Ok(())
}

fn create_backup(db_path: &str, target_version: u32) -> Result<PathBuf> {
    let db_file = Path::new(db_path);
    let backup_dir = db_file
        .parent()
        .ok_or_else(|| rusqlite::Error::InvalidPath(db_file.to_path_buf()))?
        .join("backups");
    fs::create_dir_all(&backup_dir).map_err(|e| io_failure(format!("backup directory: {}", e)))?;

    // Timestamp first so names sort chronologically
    let backup_path = backup_dir.join(format!(
        "{}{}_v{}.db",
        BACKUP_PREFIX,
        unix_now(),
        target_version
    ));

    let src = Connection::open(db_path)?;
    let mut dst = Connection::open(&backup_path)?;
    rusqlite::backup::Backup::new(&src, &mut dst)?.run_to_completion(
        5,
        Duration::from_millis(250),
        None,
    )?;

    let integrity: String = dst.pragma_query_value(None, "integrity_check", |row| row.get(0))?;
    if integrity != "ok" {
        return Err(io_failure(format!("backup integrity check failed: {}", integrity)));
    }
    log::info!("Backup created: {}", backup_path.display());

    prune_backups(&backup_dir);
    Ok(backup_path)
}

fn prune_backups(backup_dir: &Path) {
    let Ok(entries) = fs::read_dir(backup_dir) else {
        return;
    };
    let mut backups: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "db")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(BACKUP_PREFIX))
        })
        .collect();
    backups.sort();

    let excess = backups.len().saturating_sub(MAX_BACKUPS);
    for path in &backups[..excess] {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Failed to delete old backup {}: {}", path.display(), e);
        }
    }
}

fn has_table(conn: &Connection, table: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn is_file_database(db_path: &str) -> bool {
    db_path != ":memory:" && !db_path.is_empty() && Path::new(db_path).exists()
}

fn io_failure(message: String) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(1), Some(message))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn, ":memory:").unwrap();
        conn
    }

    #[test]
    fn test_versions_match_positions() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i as u32, "{} is out of place", migration.name);
        }
    }

    #[test]
    fn test_every_migration_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        for migration in MIGRATIONS {
            conn.execute_batch(migration.sql)
                .unwrap_or_else(|e| panic!("{} has invalid SQL: {}", migration.name, e));
        }
    }

    #[test]
    fn test_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(migrate(&conn, ":memory:").unwrap(), 2);
        assert_eq!(schema_version(&conn).unwrap(), Some(latest_version()));

        for table in ["trades", "settings", "schema_migrations"] {
            assert!(has_table(&conn, table).unwrap(), "missing table {}", table);
        }
        let settings_rows: i32 = conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(settings_rows, 1);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let conn = migrated();
        assert_eq!(migrate(&conn, ":memory:").unwrap(), 0);
    }

    #[test]
    fn test_checksums_recorded_and_verified() {
        let conn = migrated();
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM schema_migrations WHERE checksum IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
        assert!(verify_checksums(&conn).is_ok());

        conn.execute("UPDATE schema_migrations SET checksum = 'bogus' WHERE version = 1", [])
            .unwrap();
        assert!(verify_checksums(&conn).is_err());
    }

    #[test]
    fn test_unversioned_database_is_adopted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[1].sql).unwrap();

        assert_eq!(migrate(&conn, ":memory:").unwrap(), 1);
        assert_eq!(schema_version(&conn).unwrap(), Some(2));
        assert!(verify_checksums(&conn).is_ok());
    }

    #[test]
    fn test_failed_migration_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn, &MIGRATIONS[0]).unwrap();
        apply(&conn, &MIGRATIONS[1]).unwrap();

        let broken = Migration {
            version: 2,
            name: "broken",
            sql: "CREATE TABLE half_done (id INTEGER); INVALID SQL",
        };
        assert!(apply(&conn, &broken).is_err());
        assert_eq!(schema_version(&conn).unwrap(), Some(1));
        assert!(!has_table(&conn, "half_done").unwrap());
    }

    #[test]
    fn test_backup_before_migrating_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let db_path = db_path.to_str().unwrap();

        let conn = Connection::open(db_path).unwrap();
        apply(&conn, &MIGRATIONS[0]).unwrap();
        apply(&conn, &MIGRATIONS[1]).unwrap();

        assert_eq!(migrate(&conn, db_path).unwrap(), 1);
        let backups: Vec<_> = fs::read_dir(dir.path().join("backups")).unwrap().collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_old_backups_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        for ts in 0..MAX_BACKUPS + 2 {
            fs::write(dir.path().join(format!("{}{:010}_v2.db", BACKUP_PREFIX, ts)), b"x").unwrap();
        }
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();

        prune_backups(dir.path());

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left.len(), MAX_BACKUPS + 1);
        assert!(left.contains(&"keep.txt".to_string()));
        assert!(!left.contains(&format!("{}{:010}_v2.db", BACKUP_PREFIX, 1)));
        assert!(left.contains(&format!("{}{:010}_v2.db", BACKUP_PREFIX, 2)));
    }
}
