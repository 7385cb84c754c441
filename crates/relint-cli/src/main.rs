//! Relint CLI: the `relint` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands, RecordCommands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            tables,
            schema,
            enums,
            output,
            json,
        } => commands::verify::run(tables, schema, enums, output, json),

        Commands::StructuralCheck {
            tables,
            enums,
            json,
        } => commands::structural_check::run(tables, enums, json),

        Commands::RelationshipCheck {
            tables,
            schema,
            json,
        } => commands::relationship_check::run(tables, schema, json),

        Commands::GenericCheck {
            tables,
            schema,
            json,
        } => commands::generic_check::run(tables, schema, json),

        Commands::Record { command } => match command {
            RecordCommands::Get {
                table,
                id,
                tables,
                json,
            } => commands::record::get(table, id, tables, json),
        },
    }
}
