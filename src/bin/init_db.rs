//! Create the library database and seed demo rows into any empty table.
use library_desk::{init_tracing, initialize, LibraryConfig};

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = LibraryConfig::from_env()?;
    println!(
        "Initializing library database at {}...",
        config.database_path.display()
    );

    let seeded = initialize(&config)?;
    if seeded.is_empty() {
        println!("All tables already populated.");
    } else {
        for table in seeded {
            println!("Populated {table} table.");
        }
    }
    println!("Database initialization complete.");
    Ok(())
}
