use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use super::seed::seed_demo_data;
use crate::config::LibraryConfig;

/// Open (creating if needed) the configured database file with foreign keys
/// enforced. Setup paths use this; the per-call data access in
/// [`crate::Library`] refuses to create a missing file.
pub fn open_or_create(config: &LibraryConfig) -> Result<Connection> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(&config.database_path).with_context(|| {
        format!(
            "failed to open SQLite database at {}",
            config.database_path.display()
        )
    })?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    Ok(conn)
}

/// Create every table the library uses if it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Author (
            author_id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create Author table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Book (
            book_id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_title TEXT NOT NULL,
            publish_year INTEGER NOT NULL,
            times_checked_out INTEGER NOT NULL,
            is_checked INTEGER NOT NULL,
            author_id INTEGER,
            FOREIGN KEY(author_id) REFERENCES Author(author_id)
        )",
        [],
    )
    .context("failed to create Book table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Librarian (
            librarian_id INTEGER PRIMARY KEY AUTOINCREMENT,
            librarian_name TEXT NOT NULL,
            book_id INTEGER,
            FOREIGN KEY(book_id) REFERENCES Book(book_id)
        )",
        [],
    )
    .context("failed to create Librarian table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Vendor (
            vendor_name TEXT NOT NULL,
            book_id INTEGER,
            FOREIGN KEY(book_id) REFERENCES Book(book_id)
        )",
        [],
    )
    .context("failed to create Vendor table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS Patron (
            patron_id INTEGER PRIMARY KEY AUTOINCREMENT,
            patron_name TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create Patron table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS PatronAddress (
            patron_address_id INTEGER PRIMARY KEY AUTOINCREMENT,
            patron_id INTEGER,
            street TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            FOREIGN KEY(patron_id) REFERENCES Patron(patron_id)
        )",
        [],
    )
    .context("failed to create PatronAddress table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS \"Transaction\" (
            transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
            librarian_id INTEGER,
            book_id INTEGER,
            patron_id INTEGER,
            FOREIGN KEY(librarian_id) REFERENCES Librarian(librarian_id),
            FOREIGN KEY(book_id) REFERENCES Book(book_id),
            FOREIGN KEY(patron_id) REFERENCES Patron(patron_id)
        )",
        [],
    )
    .context("failed to create Transaction table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS TransactionRecord (
            record_id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_issue TEXT,
            date_return TEXT,
            transaction_id INTEGER,
            FOREIGN KEY(transaction_id) REFERENCES \"Transaction\"(transaction_id)
        )",
        [],
    )
    .context("failed to create TransactionRecord table")?;

    debug!("schema is up to date");
    Ok(())
}

/// Create the database and tables if absent, then seed any empty reference
/// table with demo rows. Safe to run repeatedly; returns the tables that were
/// populated on this run.
pub fn initialize(config: &LibraryConfig) -> Result<Vec<&'static str>> {
    info!(path = %config.database_path.display(), "initializing library database");
    let mut conn = open_or_create(config)?;
    ensure_schema(&conn)?;
    let seeded = seed_demo_data(&mut conn)?;
    info!(tables = ?seeded, "database initialization complete");
    Ok(seeded)
}
