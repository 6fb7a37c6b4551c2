//! Line-based prompt loop. The shell only ever offers choices taken from a
//! list it fetched moments earlier, and a bad answer aborts the current step
//! rather than re-prompting; the outer "leave the library?" loop is the only
//! retry.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use crate::db::Library;
use crate::models::Selectable;

/// Why a typed selection was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid input. Please enter a number.")]
    NotANumber,
    #[error("Invalid {kind} selection.")]
    NotOffered { kind: &'static str },
}

/// Parse `raw` as an id and require it to be one of `offered`.
pub fn parse_selection<T: Selectable>(
    raw: &str,
    offered: &[T],
    kind: &'static str,
) -> Result<i64, SelectionError> {
    let id: i64 = raw.trim().parse().map_err(|_| SelectionError::NotANumber)?;
    if offered.iter().any(|item| item.id() == id) {
        Ok(id)
    } else {
        Err(SelectionError::NotOffered { kind })
    }
}

pub struct Shell<'a, R, W> {
    library: &'a Library,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(library: &'a Library, input: R, output: W) -> Self {
        Self {
            library,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// One full pass, then keep asking whether to leave until the answer is
    /// `y` or input runs out.
    pub fn run(&mut self) -> Result<()> {
        self.run_once()?;

        loop {
            let Some(answer) = self.prompt("Would you like to leave the library? (y/n)")? else {
                return Ok(());
            };
            match answer.to_lowercase().as_str() {
                "y" => return Ok(()),
                "n" => self.run_once()?,
                _ => self.say("Please enter y to leave, or n to stay. Please try again!")?,
            }
        }
    }

    pub fn run_once(&mut self) -> Result<()> {
        self.search_books()?;
        self.check_out_book()?;
        self.return_book()
    }

    pub fn search_books(&mut self) -> Result<()> {
        let authors = self.library.authors();
        if authors.is_empty() {
            return self.say("No authors found in the database.");
        }

        self.say("Select an author to search for books:")?;
        self.list(&authors)?;
        let Some(author_id) = self.select(
            "Enter the number corresponding to the author: ",
            &authors,
            "author",
        )?
        else {
            return Ok(());
        };

        let books = self.library.search_books_by_author(author_id);
        if books.is_empty() {
            return self.say("No books found for the selected author.");
        }

        self.say("\nMatching Books:")?;
        self.say("(book_id, book_title, author_name, publish_year, times_checked_out)")?;
        self.list(&books)
    }

    pub fn check_out_book(&mut self) -> Result<()> {
        let available = self.library.available_books();
        if available.is_empty() {
            return self.say("No available books.");
        }

        self.say("\nPlease Select an Available Book to Check Out:")?;
        self.list(&available)?;
        let Some(book_id) = self.select(
            "Enter the number corresponding to the book to check out: ",
            &available,
            "book",
        )?
        else {
            return Ok(());
        };

        let patrons = self.library.patrons();
        if patrons.is_empty() {
            return self.say("No patrons found.");
        }

        self.say("\nWhich Patron are You?:")?;
        self.list(&patrons)?;
        let Some(patron_id) = self.select(
            "Enter the number corresponding to the patron to check out the book: ",
            &patrons,
            "patron",
        )?
        else {
            return Ok(());
        };

        let outcome = self.library.check_out_book(patron_id, book_id);
        self.say(&outcome.message)
    }

    pub fn return_book(&mut self) -> Result<()> {
        let borrowed = self.library.borrowed_books();
        if borrowed.is_empty() {
            return self.say("No borrowed books.");
        }

        let Some(answer) = self.prompt("\nwould you like to return a book?(y/n): ")? else {
            return Ok(());
        };
        match answer.to_lowercase().as_str() {
            "y" => self.say("Continuing...")?,
            "n" => return self.say("Exiting..."),
            _ => return self.say("Invalid input. Please enter 'y' for Yes or 'n' for No."),
        }

        let patrons = self.library.patrons();
        if patrons.is_empty() {
            return self.say("No patrons found.");
        }

        self.say("\nPlease select which patron you are:")?;
        self.list(&patrons)?;
        let Some(patron_id) = self.select(
            "Enter the number corresponding to your name: ",
            &patrons,
            "patron",
        )?
        else {
            return Ok(());
        };

        self.say("\nList of Borrowed Books:")?;
        self.list(&borrowed)?;
        let Some(book_id) = self.select(
            "Enter the number corresponding to the book to return: ",
            &borrowed,
            "book",
        )?
        else {
            return Ok(());
        };

        let holders = self.library.patrons_with_book(book_id);
        if holders.is_empty() {
            return self.say("\nNo patrons found who borrowed this book.");
        }
        if !holders.iter().any(|holder| holder.id == patron_id) {
            self.say("\nYou have not checked out the selected book!")?;
            return self.say("You are currently only able to return books you have checked out :(");
        }

        let outcome = self.library.return_book(patron_id, book_id);
        self.say(&outcome.message)
    }

    /// Prompt for a choice among `offered`. `None` means the step is over,
    /// either because the answer was refused (and the reason printed) or
    /// because input ended.
    fn select<T: Selectable>(
        &mut self,
        question: &str,
        offered: &[T],
        kind: &'static str,
    ) -> Result<Option<i64>> {
        let Some(answer) = self.prompt(question)? else {
            return Ok(None);
        };
        match parse_selection(&answer, offered, kind) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                debug!(answer = %answer, kind, "selection refused");
                self.say(&err.to_string())?;
                Ok(None)
            }
        }
    }

    /// Print `question` and read one line. `None` at end of input.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}").context("failed to write prompt")?;
        self.output.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            writeln!(self.output).context("failed to write output")?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn list<T: std::fmt::Display>(&mut self, items: &[T]) -> Result<()> {
        for item in items {
            writeln!(self.output, "{item}").context("failed to write output")?;
        }
        Ok(())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}").context("failed to write output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Patron};

    fn authors() -> Vec<Author> {
        vec![
            Author {
                id: 1,
                name: "Jane Austen".to_string(),
            },
            Author {
                id: 4,
                name: "Mark Twain".to_string(),
            },
        ]
    }

    #[test]
    fn accepts_an_offered_id() {
        assert_eq!(parse_selection(" 4\n", &authors(), "author"), Ok(4));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert_eq!(
            parse_selection("four", &authors(), "author"),
            Err(SelectionError::NotANumber)
        );
        assert_eq!(
            SelectionError::NotANumber.to_string(),
            "Invalid input. Please enter a number."
        );
    }

    #[test]
    fn rejects_ids_that_were_not_offered() {
        let err = parse_selection("2", &authors(), "author").unwrap_err();
        assert_eq!(err.to_string(), "Invalid author selection.");

        let none: Vec<Patron> = Vec::new();
        assert_eq!(
            parse_selection("1", &none, "patron"),
            Err(SelectionError::NotOffered { kind: "patron" })
        );
    }
}
