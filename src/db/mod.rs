//! Persistence module split across logical submodules.
//!
//! [`Library`] is the data-access handle the shell talks to. It keeps no
//! connection around: each call opens the configured SQLite file, runs its
//! statements, and drops the connection before returning, on every path.

mod catalog;
mod circulation;
mod connection;
mod seed;

use anyhow::Result;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, error, info, warn};

use crate::config::LibraryConfig;
use crate::error::{LibraryError, TransactionOutcome};
use crate::models::{Author, BookMatch, BookSummary, BorrowedBook, Patron};

pub use catalog::{
    fetch_authors, fetch_available_books, fetch_books_by_author, fetch_borrowed_books,
    fetch_patrons, fetch_patrons_with_book,
};
pub use connection::{ensure_schema, initialize, open_or_create};
pub use seed::seed_demo_data;

/// Data-access handle. Holds only the configuration; every method connects
/// on its own.
#[derive(Debug, Clone)]
pub struct Library {
    /// Database location and the librarian recorded on checkouts.
    config: LibraryConfig,
}

impl Library {
    /// Wrap a configuration. Nothing is opened until the first query.
    pub fn new(config: LibraryConfig) -> Self {
        Self { config }
    }

    /// Open a fresh connection to an existing database. A missing file is a
    /// connection failure rather than an empty new database.
    fn connect(&self) -> Result<Connection, LibraryError> {
        let conn = Connection::open_with_flags(
            &self.config.database_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(LibraryError::Connection)?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(LibraryError::Connection)?;
        Ok(conn)
    }

    /// Run one read query on its own connection. Failures are logged and
    /// flattened into an empty list.
    fn read<T>(&self, what: &str, query: impl FnOnce(&Connection) -> Result<Vec<T>>) -> Vec<T> {
        let conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => {
                error!(query = what, error = %err, "error connecting to the library database");
                return Vec::new();
            }
        };

        match query(&conn) {
            Ok(rows) => {
                debug!(query = what, rows = rows.len(), "query finished");
                rows
            }
            Err(err) => {
                let detail = format!("{err:#}");
                error!(query = what, error = %detail, "error executing SQL query");
                Vec::new()
            }
        }
    }

    /// All authors, for the search flow's author picker.
    pub fn authors(&self) -> Vec<Author> {
        self.read("authors", fetch_authors)
    }

    /// Books that can be checked out right now.
    pub fn available_books(&self) -> Vec<BookSummary> {
        self.read("available books", fetch_available_books)
    }

    /// All patrons, for the "which patron are you?" prompts.
    pub fn patrons(&self) -> Vec<Patron> {
        self.read("patrons", fetch_patrons)
    }

    /// Books currently checked out, with their author's name.
    pub fn borrowed_books(&self) -> Vec<BorrowedBook> {
        self.read("borrowed books", fetch_borrowed_books)
    }

    /// Patrons with an open checkout of the book. After a return, or once a
    /// newer checkout exists, the former holder no longer appears.
    pub fn patrons_with_book(&self, book_id: i64) -> Vec<Patron> {
        self.read("patrons with book", |conn| {
            fetch_patrons_with_book(conn, book_id)
        })
    }

    /// Books by the given author. An unknown author yields an empty list.
    pub fn search_books_by_author(&self, author_id: i64) -> Vec<BookMatch> {
        self.read("books by author", |conn| {
            fetch_books_by_author(conn, author_id)
        })
    }

    /// Check a book out to a patron, returning the book title. Neither id is
    /// validated beforehand; an unknown book is [`LibraryError::NotFound`].
    pub fn try_check_out(&self, patron_id: i64, book_id: i64) -> Result<String, LibraryError> {
        let mut conn = self.connect()?;
        circulation::check_out(&mut conn, self.config.librarian_id, patron_id, book_id)
    }

    /// Return a book on behalf of a patron, returning the book title. Fails
    /// with [`LibraryError::NotBorrowedByThisPatron`] unless the patron holds
    /// the newest open checkout of the book.
    pub fn try_return(&self, patron_id: i64, book_id: i64) -> Result<String, LibraryError> {
        let mut conn = self.connect()?;
        circulation::return_book(&mut conn, patron_id, book_id)
    }

    /// [`Library::try_check_out`] as a status-plus-message outcome, logging
    /// the result.
    pub fn check_out_book(&self, patron_id: i64, book_id: i64) -> TransactionOutcome {
        match self.try_check_out(patron_id, book_id) {
            Ok(title) => {
                info!(patron_id, book_id, %title, "book checked out");
                TransactionOutcome::success("Book checked out successfully.")
            }
            Err(err) => {
                log_rejection("checkout", patron_id, book_id, &err);
                err.into()
            }
        }
    }

    /// [`Library::try_return`] as a status-plus-message outcome, logging the
    /// result.
    pub fn return_book(&self, patron_id: i64, book_id: i64) -> TransactionOutcome {
        match self.try_return(patron_id, book_id) {
            Ok(title) => {
                info!(patron_id, book_id, %title, "book returned");
                TransactionOutcome::success(format!("{title} has been successfully returned."))
            }
            Err(err) => {
                log_rejection("return", patron_id, book_id, &err);
                err.into()
            }
        }
    }
}

fn log_rejection(operation: &str, patron_id: i64, book_id: i64, err: &LibraryError) {
    match err {
        LibraryError::Connection(_) | LibraryError::Query(_) => {
            error!(operation, patron_id, book_id, error = %err, "database failure");
        }
        _ => warn!(operation, patron_id, book_id, reason = %err, "request rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_library() -> (TempDir, Library) {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::new(dir.path().join("library.sqlite"));
        initialize(&config).unwrap();
        (dir, Library::new(config))
    }

    fn book_state(library: &Library, book_id: i64) -> (i64, i64) {
        let conn = library.connect().unwrap();
        conn.query_row(
            "SELECT is_checked, times_checked_out FROM Book WHERE book_id = ?1",
            [book_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap()
    }

    fn count(library: &Library, sql: &str) -> i64 {
        let conn = library.connect().unwrap();
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn checkout_flags_book_and_records_transaction() {
        let (_dir, library) = seeded_library();

        let outcome = library.check_out_book(1, 1);
        assert!(outcome.is_success(), "{outcome:?}");

        assert_eq!(book_state(&library, 1), (1, 11));
        assert_eq!(
            count(
                &library,
                "SELECT COUNT(*) FROM \"Transaction\" WHERE book_id = 1 AND patron_id = 1 AND librarian_id = 1"
            ),
            1
        );
        assert_eq!(
            count(
                &library,
                "SELECT COUNT(*) FROM TransactionRecord WHERE date_issue IS NOT NULL AND date_return IS NULL"
            ),
            1
        );
    }

    #[test]
    fn second_checkout_is_rejected_without_changes() {
        let (_dir, library) = seeded_library();
        assert!(library.check_out_book(1, 1).is_success());

        let outcome = library.check_out_book(2, 1);
        assert!(!outcome.is_success());
        assert!(outcome.message.contains("not available"), "{}", outcome.message);
        assert!(matches!(
            library.try_check_out(2, 1),
            Err(LibraryError::AlreadyCheckedOut { .. })
        ));

        assert_eq!(book_state(&library, 1), (1, 11));
        assert_eq!(count(&library, "SELECT COUNT(*) FROM \"Transaction\""), 1);
    }

    #[test]
    fn checkout_of_unknown_book_is_not_found() {
        let (_dir, library) = seeded_library();
        assert!(matches!(
            library.try_check_out(1, 99),
            Err(LibraryError::NotFound)
        ));
    }

    #[test]
    fn failed_insert_rolls_back_the_flag() {
        let (_dir, library) = seeded_library();
        // Patron 42 does not exist, so the Transaction insert violates the
        // foreign key after the Book row was already updated.
        assert!(matches!(
            library.try_check_out(42, 2),
            Err(LibraryError::Query(_))
        ));
        assert_eq!(book_state(&library, 2), (0, 8));
        assert_eq!(count(&library, "SELECT COUNT(*) FROM \"Transaction\""), 0);
    }

    #[test]
    fn return_clears_flag_and_closes_record() {
        let (_dir, library) = seeded_library();
        assert!(library.check_out_book(1, 3).is_success());

        let outcome = library.return_book(1, 3);
        assert!(outcome.is_success(), "{outcome:?}");
        assert_eq!(
            outcome.message,
            "Harry Potter and the Philosopher's Stone has been successfully returned."
        );
        assert_eq!(book_state(&library, 3), (0, 16));
        assert_eq!(
            count(
                &library,
                "SELECT COUNT(*) FROM TransactionRecord WHERE date_return IS NOT NULL"
            ),
            1
        );
        // History is kept.
        assert_eq!(count(&library, "SELECT COUNT(*) FROM \"Transaction\""), 1);
        assert!(library.patrons_with_book(3).is_empty());
    }

    #[test]
    fn return_without_checkout_is_rejected() {
        let (_dir, library) = seeded_library();
        assert!(matches!(
            library.try_return(1, 1),
            Err(LibraryError::NotBorrowedByThisPatron)
        ));

        assert!(library.check_out_book(1, 1).is_success());
        assert!(matches!(
            library.try_return(2, 1),
            Err(LibraryError::NotBorrowedByThisPatron)
        ));
        assert_eq!(book_state(&library, 1).0, 1);
    }

    #[test]
    fn returning_twice_reports_already_available() {
        let (_dir, library) = seeded_library();
        assert!(library.check_out_book(2, 4).is_success());
        assert!(library.return_book(2, 4).is_success());

        assert!(matches!(
            library.try_return(2, 4),
            Err(LibraryError::AlreadyAvailable { .. })
        ));
    }

    #[test]
    fn former_holder_cannot_return_next_patrons_copy() {
        let (_dir, library) = seeded_library();
        assert!(library.check_out_book(1, 5).is_success());
        assert!(library.return_book(1, 5).is_success());
        assert!(library.check_out_book(2, 5).is_success());

        assert!(matches!(
            library.try_return(1, 5),
            Err(LibraryError::NotBorrowedByThisPatron)
        ));
        let holders = library.patrons_with_book(5);
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].name, "Bob Johnson");
    }

    #[test]
    fn legacy_transaction_without_record_can_be_returned() {
        let (_dir, library) = seeded_library();
        {
            let conn = library.connect().unwrap();
            conn.execute("UPDATE Book SET is_checked = 1 WHERE book_id = 2", [])
                .unwrap();
            conn.execute(
                "INSERT INTO \"Transaction\" (librarian_id, book_id, patron_id) VALUES (1, 2, 3)",
                [],
            )
            .unwrap();
        }

        assert_eq!(library.patrons_with_book(2).len(), 1);
        assert!(library.return_book(3, 2).is_success());
        assert_eq!(book_state(&library, 2).0, 0);
        assert!(library.patrons_with_book(2).is_empty());
    }

    #[test]
    fn older_legacy_checkout_is_superseded_by_newer_one() {
        let (_dir, library) = seeded_library();
        {
            let conn = library.connect().unwrap();
            conn.execute(
                "INSERT INTO \"Transaction\" (librarian_id, book_id, patron_id) VALUES (1, 1, 1)",
                [],
            )
            .unwrap();
        }
        assert!(library.check_out_book(2, 1).is_success());

        let holders: Vec<i64> = library.patrons_with_book(1).iter().map(|p| p.id).collect();
        assert_eq!(holders, vec![2]);

        assert!(matches!(
            library.try_return(1, 1),
            Err(LibraryError::NotBorrowedByThisPatron)
        ));
        assert_eq!(book_state(&library, 1).0, 1);

        assert!(library.return_book(2, 1).is_success());
        assert_eq!(book_state(&library, 1).0, 0);
    }

    #[test]
    fn database_without_schema_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.sqlite");
        Connection::open(&path)
            .unwrap()
            .execute_batch("PRAGMA user_version = 7;")
            .unwrap();
        let library = Library::new(LibraryConfig::new(path));

        assert!(library.authors().is_empty());
        assert!(library.available_books().is_empty());
        assert!(library.patrons_with_book(1).is_empty());
        assert!(library.search_books_by_author(1).is_empty());

        let outcome = library.check_out_book(1, 1);
        assert!(!outcome.is_success());
        assert!(outcome.message.starts_with("Error executing SQL query"));
    }

    #[test]
    fn read_queries_follow_availability() {
        let (_dir, library) = seeded_library();
        assert_eq!(library.authors().len(), 5);
        assert_eq!(library.patrons().len(), 3);
        assert_eq!(library.available_books().len(), 5);
        assert!(library.borrowed_books().is_empty());

        assert!(library.check_out_book(3, 2).is_success());
        let borrowed = library.borrowed_books();
        assert_eq!(borrowed.len(), 1);
        assert_eq!(borrowed[0].title, "Great Expectations");
        assert_eq!(borrowed[0].author_name, "Charles Dickens");
        assert_eq!(library.available_books().len(), 4);
    }

    #[test]
    fn search_by_author() {
        let (_dir, library) = seeded_library();
        let hits = library.search_books_by_author(4);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Adventures of Tom Sawyer");
        assert_eq!(hits[0].publish_year, 1876);

        assert!(library.search_books_by_author(77).is_empty());
    }

    #[test]
    fn missing_database_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let library = Library::new(LibraryConfig::new(dir.path().join("absent.sqlite")));

        assert!(library.authors().is_empty());
        assert!(library.search_books_by_author(1).is_empty());
        assert!(!dir.path().join("absent.sqlite").exists());

        let outcome = library.check_out_book(1, 1);
        assert!(!outcome.is_success());
        assert!(outcome.message.starts_with("Database connection failed"));
    }

    #[test]
    fn configured_librarian_is_recorded() {
        let dir = TempDir::new().unwrap();
        let config = LibraryConfig::new(dir.path().join("library.sqlite")).with_librarian(2);
        initialize(&config).unwrap();
        let library = Library::new(config);

        assert!(library.check_out_book(1, 1).is_success());
        assert_eq!(
            count(&library, "SELECT librarian_id FROM \"Transaction\""),
            2
        );
    }
}
