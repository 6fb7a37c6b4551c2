//! Row types returned by the read queries. They stay plain data holders so the
//! shell can print them without knowing anything about SQL.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row from the `Author` table.
pub struct Author {
    /// `author_id`, the number the shell offers as a choice.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Minimal projection of a book used when offering a checkout choice.
pub struct BookSummary {
    /// `book_id`.
    pub id: i64,
    /// Title shown in the checkout list.
    pub title: String,
}

impl fmt::Display for BookSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book that is currently checked out, joined with its author's name.
pub struct BorrowedBook {
    /// `book_id`.
    pub id: i64,
    /// Title shown in the return list.
    pub title: String,
    /// Empty when the book has no author row.
    pub author_name: String,
}

impl fmt::Display for BorrowedBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One hit from an author search. Mirrors the columns the shell prints:
/// id, title, author, publish year and the running checkout counter.
pub struct BookMatch {
    /// `book_id`.
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub publish_year: i64,
    /// Running counter, bumped by every successful checkout.
    pub times_checked_out: i64,
}

impl fmt::Display for BookMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.id, self.title, self.author_name, self.publish_year, self.times_checked_out
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row from the `Patron` table.
pub struct Patron {
    /// `patron_id`.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.name)
    }
}

/// Anything the shell can offer as a numbered choice.
pub trait Selectable {
    /// The number a user types to pick this item.
    fn id(&self) -> i64;
}

impl Selectable for Author {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Selectable for BookSummary {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Selectable for BorrowedBook {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Selectable for Patron {
    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_match_prints_like_a_result_row() {
        let hit = BookMatch {
            id: 1,
            title: "Pride and Prejudice".to_string(),
            author_name: "Jane Austen".to_string(),
            publish_year: 1813,
            times_checked_out: 10,
        };
        assert_eq!(
            hit.to_string(),
            "(1, Pride and Prejudice, Jane Austen, 1813, 10)"
        );
    }

    #[test]
    fn choices_print_as_numbered_lines() {
        let patron = Patron {
            id: 2,
            name: "Bob Johnson".to_string(),
        };
        assert_eq!(patron.to_string(), "2. Bob Johnson");
    }
}
