// 🗄️ Embedded-store scanner - Modrinth App `app.db` (SQLite)
//
// Opened read-only; the app may hold a write lock while running, so we wait at
// most `busy_timeout` and then give up on this source.

use super::{ScanContext, Scanner, ScannerKind};
use crate::error::Error;
use crate::roots::SourceRoots;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

const SOURCE: &str = "Modrinth App";

/// Logged-in Minecraft accounts live in this table.
pub const USERS_QUERY: &str = "SELECT username FROM minecraft_users";

pub struct ModrinthDatabaseScanner {
    busy_timeout: Duration,
}

impl ModrinthDatabaseScanner {
    pub fn new(busy_timeout: Duration) -> Self {
        ModrinthDatabaseScanner { busy_timeout }
    }

    /// Read-only open + the single fixed lookup
    pub fn read_usernames(&self, db_path: &Path) -> crate::Result<Vec<String>> {
        if !db_path.is_file() {
            return Err(Error::SourceUnavailable(db_path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::malformed(db_path, e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| Error::malformed(db_path, e))?;

        let mut stmt = conn
            .prepare(USERS_QUERY)
            .map_err(|e| Error::malformed(db_path, format!("query failed: {}", e)))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))
            .map_err(|e| Error::malformed(db_path, format!("query failed: {}", e)))?;

        let mut names = Vec::new();
        for row in rows {
            match row {
                Ok(Some(name)) => names.push(name),
                Ok(None) => {}
                Err(e) => return Err(Error::malformed(db_path, e)),
            }
        }
        Ok(names)
    }
}

impl Scanner for ModrinthDatabaseScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::ModrinthDatabase
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], "ModrinthApp") {
            match self.read_usernames(&dir.join("app.db")) {
                Ok(names) => {
                    ctx.file_read();
                    for name in names {
                        ctx.submit(&name, SOURCE);
                    }
                }
                Err(e @ Error::MalformedSource { .. }) => {
                    warn!("Modrinth database: {}", e);
                    ctx.record(e);
                }
                Err(e) => ctx.record(e),
            }
        }
    }
}
