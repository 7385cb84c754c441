use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "relint",
    about = "Relint: relational integrity checks over JSON table snapshots",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every structural, enum, relationship, and polymorphic check
    Verify {
        /// Directory of table files, one JSON object per table
        #[arg(long, default_value = "tables")]
        tables: String,

        /// Relationship-declaration document (JSON or TOML)
        #[arg(long, default_value = "schema.json")]
        schema: String,

        /// Enum-declaration document
        #[arg(long)]
        enums: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-table structural and enum checks only
    StructuralCheck {
        /// Directory of table files
        #[arg(long, default_value = "tables")]
        tables: String,

        /// Enum-declaration document
        #[arg(long)]
        enums: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Declared foreign-key checks only
    RelationshipCheck {
        /// Directory of table files
        #[arg(long, default_value = "tables")]
        tables: String,

        /// Relationship-declaration document (JSON or TOML)
        #[arg(long, default_value = "schema.json")]
        schema: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Polymorphic foreign-key checks and their summary only
    GenericCheck {
        /// Directory of table files
        #[arg(long, default_value = "tables")]
        tables: String,

        /// Relationship-declaration document (JSON or TOML)
        #[arg(long, default_value = "schema.json")]
        schema: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record-store operations
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Read one record through the data store
    Get {
        /// Table name
        table: String,

        /// Primary key
        id: String,

        /// Directory of table files
        #[arg(long, default_value = "tables")]
        tables: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
