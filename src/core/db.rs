use anyhow::{Context, Error, Result};
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

/// Opens the async database connection, creating the file and any
/// parent directories when missing.
pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    if let Some(parent) = std::path::Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create db directory for {}", db_path))?;
    }
    let db = Connection::open(db_path)
        .await
        .with_context(|| format!("Failed to open db at {}", db_path))?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

pub fn initialize_db(conn: &mut SyncConnection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
             key TEXT PRIMARY KEY NOT NULL,
             value TEXT NOT NULL
         );",
    )
}
