//! Fixed demo rows used to populate a fresh database.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

const AUTHORS: &[&str] = &[
    "Jane Austen",
    "Charles Dickens",
    "J.K. Rowling",
    "Mark Twain",
    "William Shakespeare",
];

/// (title, publish year, times checked out, is_checked, author id)
const BOOKS: &[(&str, i64, i64, i64, i64)] = &[
    ("Pride and Prejudice", 1813, 10, 0, 1),
    ("Great Expectations", 1861, 8, 0, 2),
    ("Harry Potter and the Philosopher's Stone", 1997, 15, 0, 3),
    ("The Adventures of Tom Sawyer", 1876, 5, 0, 4),
    ("Romeo and Juliet", 1597, 12, 0, 5),
];

const LIBRARIANS: &[(&str, i64)] = &[
    ("John Smith", 1),
    ("Emma Johnson", 2),
    ("Michael Williams", 3),
];

const VENDORS: &[(&str, i64)] = &[
    ("Book Supplier A", 2),
    ("Book Supplier B", 4),
    ("Book Supplier C", 5),
];

const PATRONS: &[&str] = &["Alice Smith", "Bob Johnson", "Charlie Williams"];

/// (patron id, street, city, state)
const PATRON_ADDRESSES: &[(i64, &str, &str, &str)] = &[
    (1, "123 Main St", "Cityville", "State A"),
    (2, "456 Elm St", "Townsville", "State B"),
    (3, "789 Oak St", "Villagetown", "State C"),
];

/// Populate each reference table that is currently empty. Tables are seeded
/// in dependency order and each one commits on its own.
pub fn seed_demo_data(conn: &mut Connection) -> Result<Vec<&'static str>> {
    let mut seeded = Vec::new();

    if table_is_empty(conn, "Author")? {
        let tx = conn.transaction().context("failed to begin Author seed")?;
        {
            let mut stmt = tx.prepare("INSERT INTO Author (author_name) VALUES (?1)")?;
            for name in AUTHORS {
                stmt.execute([name]).context("failed to insert author")?;
            }
        }
        tx.commit().context("failed to commit Author seed")?;
        seeded.push("Author");
    }

    if table_is_empty(conn, "Book")? {
        let tx = conn.transaction().context("failed to begin Book seed")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO Book (book_title, publish_year, times_checked_out, is_checked, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (title, year, times, checked, author) in BOOKS {
                stmt.execute(params![title, year, times, checked, author])
                    .context("failed to insert book")?;
            }
        }
        tx.commit().context("failed to commit Book seed")?;
        seeded.push("Book");
    }

    if table_is_empty(conn, "Librarian")? {
        let tx = conn.transaction().context("failed to begin Librarian seed")?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO Librarian (librarian_name, book_id) VALUES (?1, ?2)")?;
            for (name, book) in LIBRARIANS {
                stmt.execute(params![name, book])
                    .context("failed to insert librarian")?;
            }
        }
        tx.commit().context("failed to commit Librarian seed")?;
        seeded.push("Librarian");
    }

    if table_is_empty(conn, "Vendor")? {
        let tx = conn.transaction().context("failed to begin Vendor seed")?;
        {
            let mut stmt = tx.prepare("INSERT INTO Vendor (vendor_name, book_id) VALUES (?1, ?2)")?;
            for (name, book) in VENDORS {
                stmt.execute(params![name, book])
                    .context("failed to insert vendor")?;
            }
        }
        tx.commit().context("failed to commit Vendor seed")?;
        seeded.push("Vendor");
    }

    if table_is_empty(conn, "Patron")? {
        let tx = conn.transaction().context("failed to begin Patron seed")?;
        {
            let mut stmt = tx.prepare("INSERT INTO Patron (patron_name) VALUES (?1)")?;
            for name in PATRONS {
                stmt.execute([name]).context("failed to insert patron")?;
            }
        }
        tx.commit().context("failed to commit Patron seed")?;
        seeded.push("Patron");
    }

    if table_is_empty(conn, "PatronAddress")? {
        let tx = conn
            .transaction()
            .context("failed to begin PatronAddress seed")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO PatronAddress (patron_id, street, city, state) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (patron, street, city, state) in PATRON_ADDRESSES {
                stmt.execute(params![patron, street, city, state])
                    .context("failed to insert patron address")?;
            }
        }
        tx.commit().context("failed to commit PatronAddress seed")?;
        seeded.push("PatronAddress");
    }

    for table in &seeded {
        info!(table, "populated demo rows");
    }
    Ok(seeded)
}

/// `table` is always one of the constants above, never user input.
fn table_is_empty(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .with_context(|| format!("failed to count rows in {table}"))?;
    Ok(count == 0)
}
