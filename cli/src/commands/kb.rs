//! # Knowledge Base Command
//!
//! File: cli/src/commands/kb.rs
//!
//! Inspect the built-in knowledge base from the terminal.
//!
//! ```bash
//! edubot kb show admissions
//! edubot kb search hostel library
//! edubot kb offering PhD
//! ```
//!
use crate::bot::knowledge;
use crate::core::error::{EdubotError, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
pub struct KbArgs {
    #[command(subcommand)]
    command: KbCommand,
}

#[derive(Subcommand, Debug)]
enum KbCommand {
    /// Print one section as JSON (`all` for the college overview).
    Show {
        /// Section name.
        section: String,
    },
    /// Search the knowledge base by keyword.
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// List departments offering a program (e.g. `PhD`, `M.Tech`).
    Offering { program: String },
    /// List the section names `show` accepts.
    Sections,
}

pub async fn handle_kb(args: KbArgs) -> Result<()> {
    match args.command {
        KbCommand::Show { section } => {
            info!("Showing knowledge base section '{}'", section);
            let value = knowledge::section(&section).ok_or_else(|| EdubotError::UnknownSection {
                name: section.clone(),
            })?;
            print_json(&value)?;
        }
        KbCommand::Search { keywords } => {
            info!("Searching knowledge base for {:?}", keywords);
            let results = knowledge::search(&keywords);
            print_json(&Value::Array(results))?;
        }
        KbCommand::Offering { program } => {
            let departments = knowledge::departments_offering(&program);
            if departments.is_empty() {
                println!("No department offers '{}'.", program);
            }
            for department in departments {
                println!("{} ({})", department.name, department.programs.join(", "));
            }
        }
        KbCommand::Sections => {
            for name in knowledge::SECTIONS {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
