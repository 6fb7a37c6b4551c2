//! Binary entry point: read the configuration, make sure the tables exist,
//! and hand stdin/stdout to the prompt loop.
use std::io;

use library_desk::{ensure_schema, init_tracing, open_or_create, Library, LibraryConfig, Shell};

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = LibraryConfig::from_env()?;
    ensure_schema(&open_or_create(&config)?)?;

    let library = Library::new(config);
    let stdin = io::stdin();
    let mut shell = Shell::new(&library, stdin.lock(), io::stdout());
    shell.run()
}
