//! Core library surface for the Library Desk console tool.
//!
//! Books, authors, patrons and checkout transactions live in an embedded
//! SQLite file. The `db` module holds the schema, demo seed and the
//! data-access handle; `shell` is the prompt loop that drives it.
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod shell;

pub use config::LibraryConfig;
pub use db::{ensure_schema, initialize, open_or_create, Library};
pub use error::{LibraryError, Status, TransactionOutcome};
pub use models::{Author, BookMatch, BookSummary, BorrowedBook, Patron};
pub use shell::Shell;

/// Install the stderr log subscriber shared by both binaries. `RUST_LOG`
/// overrides the default `warn` level.
pub fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}
