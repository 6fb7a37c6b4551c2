use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::{Author, BookMatch, BookSummary, BorrowedBook, Patron};

/// Every author in table order. Feeds the author picker of the search flow.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn
        .prepare("SELECT author_id, author_name FROM Author")
        .context("failed to prepare author query")?;

    let authors = stmt
        .query_map([], |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load authors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect authors")?;

    Ok(authors)
}

/// Books whose availability flag is clear, i.e. the ones a patron may check
/// out right now.
pub fn fetch_available_books(conn: &Connection) -> Result<Vec<BookSummary>> {
    let mut stmt = conn
        .prepare("SELECT book_id, book_title FROM Book WHERE is_checked < 1")
        .context("failed to prepare available books query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(BookSummary {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })
        .context("failed to load available books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect available books")?;

    Ok(books)
}

/// Every patron in table order, offered when checking out or returning.
pub fn fetch_patrons(conn: &Connection) -> Result<Vec<Patron>> {
    let mut stmt = conn
        .prepare("SELECT patron_id, patron_name FROM Patron")
        .context("failed to prepare patron query")?;

    let patrons = stmt
        .query_map([], |row| {
            Ok(Patron {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load patrons")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect patrons")?;

    Ok(patrons)
}

/// Books currently checked out. A book without an author still shows up, with
/// an empty author name.
pub fn fetch_borrowed_books(conn: &Connection) -> Result<Vec<BorrowedBook>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.book_id, b.book_title, COALESCE(a.author_name, '')
             FROM Book b
             LEFT JOIN Author a ON b.author_id = a.author_id
             WHERE b.is_checked > 0",
        )
        .context("failed to prepare borrowed books query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(BorrowedBook {
                id: row.get(0)?,
                title: row.get(1)?,
                author_name: row.get(2)?,
            })
        })
        .context("failed to load borrowed books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect borrowed books")?;

    Ok(books)
}

/// Patrons holding an open checkout of `book_id`. Only the newest
/// `Transaction` for a book can be open, and it stays open until its
/// `TransactionRecord` carries a return date; rows written before records
/// existed have none and count as open while they are the newest.
pub fn fetch_patrons_with_book(conn: &Connection, book_id: i64) -> Result<Vec<Patron>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT p.patron_id, p.patron_name
             FROM Patron p
             INNER JOIN \"Transaction\" t ON p.patron_id = t.patron_id
             WHERE t.book_id = ?1
               AND t.transaction_id = (
                   SELECT MAX(transaction_id) FROM \"Transaction\" WHERE book_id = ?1
               )
               AND NOT EXISTS (
                   SELECT 1 FROM TransactionRecord r
                   WHERE r.transaction_id = t.transaction_id AND r.date_return IS NOT NULL
               )
             ORDER BY p.patron_id",
        )
        .context("failed to prepare book holders query")?;

    let patrons = stmt
        .query_map([book_id], |row| {
            Ok(Patron {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load book holders")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect book holders")?;

    Ok(patrons)
}

/// Books written by `author_id`, joined with the author's name. An unknown
/// author simply matches nothing.
pub fn fetch_books_by_author(conn: &Connection, author_id: i64) -> Result<Vec<BookMatch>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.book_id, b.book_title, a.author_name, b.publish_year, b.times_checked_out
             FROM Book b
             INNER JOIN Author a ON b.author_id = a.author_id
             WHERE b.author_id = ?1",
        )
        .context("failed to prepare author search query")?;

    let books = stmt
        .query_map([author_id], |row| {
            Ok(BookMatch {
                id: row.get(0)?,
                title: row.get(1)?,
                author_name: row.get(2)?,
                publish_year: row.get(3)?,
                times_checked_out: row.get(4)?,
            })
        })
        .context("failed to iterate author search")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect author search")?;

    Ok(books)
}
