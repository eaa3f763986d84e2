use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

const MIGRATIONS: [(i32, &str); 1] = [(1, include_str!("migrations/001_initial.sql"))];

pub struct Database {
    pool: DbPool,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { pool: self.pool.clone() }
    }
}

impl Database {
    pub fn open(path: &str, pool_size: u32) -> Result<Self> {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let conn = pool.get()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Ok(Self { pool })
    }

    /// Opens a named in-memory database shared by every connection in the pool.
    /// The database lives as long as the pool holds at least one connection.
    pub fn open_memory(name: &str) -> Result<Self> {
        let uri = format!("file:{}?mode=memory&cache=shared", name);
        let manager = SqliteConnectionManager::file(uri)
            .with_flags(OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI)
            .with_init(init_connection);
        let pool = Pool::builder().max_size(4).build(manager)?;
        Ok(Self { pool })
    }

    pub fn get(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.get()?;
        run_migrations(&conn)?;
        Ok(())
    }

    /// Every known migration with the time it was applied, `None` when pending.
    pub fn migration_status(&self) -> Result<Vec<(i32, Option<String>)>> {
        let conn = self.get()?;
        ensure_migrations_table(&conn)?;

        let mut stmt = conn.prepare("SELECT version, applied_at FROM schema_migrations")?;
        let applied: Vec<(i32, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MIGRATIONS
            .iter()
            .map(|(version, _)| {
                let applied_at = applied
                    .iter()
                    .find(|(v, _)| v == version)
                    .map(|(_, at)| at.clone());
                (*version, applied_at)
            })
            .collect())
    }
}

// Cascades rely on foreign keys, which SQLite enables per connection.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}

fn run_migrations(conn: &Connection) -> Result<()> {
    ensure_migrations_table(conn)?;

    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    for (version, sql) in MIGRATIONS {
        if version > current_version {
            tracing::info!("Running migration {}", version);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [version],
            )?;
        }
    }

    Ok(())
}
