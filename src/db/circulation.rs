//! Checkout and return. Each runs inside a single `IMMEDIATE` SQLite
//! transaction so the write lock is held from the availability check to the
//! commit. Returning early drops the transaction, which rolls it back.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::LibraryError;

/// Mark `book_id` as held by `patron_id` and record the event. Returns the
/// book title on success.
pub fn check_out(
    conn: &mut Connection,
    librarian_id: i64,
    patron_id: i64,
    book_id: i64,
) -> Result<String, LibraryError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let book: Option<(String, i64)> = tx
        .query_row(
            "SELECT book_title, is_checked FROM Book WHERE book_id = ?1",
            [book_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((title, is_checked)) = book else {
        return Err(LibraryError::NotFound);
    };
    if is_checked != 0 {
        return Err(LibraryError::AlreadyCheckedOut { title });
    }

    // Conditional on the flag so a concurrent writer can never double-book.
    let reserved = tx.execute(
        "UPDATE Book
         SET times_checked_out = times_checked_out + 1, is_checked = 1
         WHERE book_id = ?1 AND is_checked = 0",
        [book_id],
    )?;
    if reserved == 0 {
        return Err(LibraryError::AlreadyCheckedOut { title });
    }

    tx.execute(
        "INSERT INTO \"Transaction\" (librarian_id, book_id, patron_id) VALUES (?1, ?2, ?3)",
        params![librarian_id, book_id, patron_id],
    )?;
    let transaction_id = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO TransactionRecord (date_issue, date_return, transaction_id)
         VALUES (CURRENT_TIMESTAMP, NULL, ?1)",
        [transaction_id],
    )?;

    tx.commit()?;
    Ok(title)
}

/// Clear the book's flag and close the patron's checkout. Only the patron
/// named on the newest checkout of the book may return it, and only while
/// that checkout is still open. Returns the book title on success.
pub fn return_book(
    conn: &mut Connection,
    patron_id: i64,
    book_id: i64,
) -> Result<String, LibraryError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let latest: Option<(String, i64, i64, i64, Option<i64>, Option<String>)> = tx
        .query_row(
            "SELECT b.book_title, b.is_checked, t.transaction_id,
                    (SELECT MAX(transaction_id) FROM \"Transaction\" WHERE book_id = ?1),
                    r.record_id, r.date_return
             FROM \"Transaction\" t
             INNER JOIN Book b ON t.book_id = b.book_id
             LEFT JOIN TransactionRecord r ON r.transaction_id = t.transaction_id
             WHERE t.book_id = ?1 AND t.patron_id = ?2
             ORDER BY t.transaction_id DESC, r.record_id DESC
             LIMIT 1",
            params![book_id, patron_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .optional()?;

    let Some((title, is_checked, transaction_id, newest_id, record_id, date_return)) = latest
    else {
        return Err(LibraryError::NotBorrowedByThisPatron);
    };
    if is_checked <= 0 {
        return Err(LibraryError::AlreadyAvailable { title });
    }
    // A newer checkout exists, or this one was already closed: someone else
    // holds the book now.
    if transaction_id != newest_id || date_return.is_some() {
        return Err(LibraryError::NotBorrowedByThisPatron);
    }

    let released = tx.execute(
        "UPDATE Book SET is_checked = 0 WHERE book_id = ?1 AND is_checked > 0",
        [book_id],
    )?;
    if released == 0 {
        return Err(LibraryError::AlreadyAvailable { title });
    }

    match record_id {
        Some(record_id) => {
            tx.execute(
                "UPDATE TransactionRecord SET date_return = CURRENT_TIMESTAMP WHERE record_id = ?1",
                [record_id],
            )?;
        }
        None => {
            tx.execute(
                "INSERT INTO TransactionRecord (date_issue, date_return, transaction_id)
                 VALUES (NULL, CURRENT_TIMESTAMP, ?1)",
                [transaction_id],
            )?;
        }
    }

    tx.commit()?;
    Ok(title)
}
