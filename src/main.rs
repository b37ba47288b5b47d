//! bb command line tools.
//!
//! `bb <input>` converts a document (or a file holding one) to JSON;
//! `bb syntax <input>` emits the classified token stream for editors;
//! `bb version` prints the version. Arguments are tried as file paths
//! first and fall back to literal input.

use std::error::Error;
use std::fs;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bb", about = "bb command line tools")]
struct Cli {
    /// Print diagnostics while lexing and parsing
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Document text, or a path to a file containing one
    input: Option<String>,

    /// View the interpretation of the input without converting
    #[arg(short, long)]
    preview: bool,

    /// Dump each token with its type and parsed record
    #[arg(short, long)]
    explain: bool,

    /// Extract bb snippets from the comments of a foreign-language file
    #[arg(short, long)]
    injection_mode: bool,

    /// Definitions (text or file path) prepended to the input
    #[arg(short, long)]
    definitions: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Emit each classified span as JSON for editor integration
    Syntax {
        /// Document text, or a path to a file containing one
        input: String,

        /// Extract bb snippets from the comments of a foreign-language file
        #[arg(short, long)]
        injection_mode: bool,

        /// Definitions (text or file path) prepended to the input
        #[arg(short, long)]
        definitions: Option<String>,
    },
    /// Print the bb version
    Version,
}

fn main() {
    let cli = Cli::parse();

    init_diagnostics(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("bb: {}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Some(Command::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Syntax { input, injection_mode, definitions }) => {
            let source = resolve_input(&input, definitions.as_deref(), injection_mode);
            println!("{}", serde_json::to_string(&bb::syntax(&source))?);
            Ok(())
        }
        None => {
            let input = match cli.input {
                Some(input) => input,
                None => {
                    println!(
                        "bb command line tools.\nUsage:\n  bb <input>\nUse \"bb help\" for more information."
                    );
                    return Ok(());
                }
            };
            let source = resolve_input(&input, cli.definitions.as_deref(), cli.injection_mode);
            if cli.preview {
                print!("{}", bb::preview(&source));
                println!();
            } else if cli.explain {
                print!("{}", bb::explain(&source));
            } else {
                let row = bb::parse(&source);
                println!("{}", serde_json::to_string(&row)?);
            }
            Ok(())
        }
    }
}

/// Turn a CLI argument into document text: read it as a file if one exists,
/// otherwise use it literally with `\n`/`\t` sequences replaced. Injection
/// mode extracts the bb snippets first; definitions resolve the same way as
/// the input and are prepended to the result.
fn resolve_input(argument: &str, definitions: Option<&str>, injection_mode: bool) -> String {
    let mut source = file_or_literal(argument);
    if injection_mode {
        source = bb::extract_injected(&source);
    }
    if let Some(definitions) = definitions {
        source = format!("{}\n{}", file_or_literal(definitions), source);
    }
    source
}

fn file_or_literal(argument: &str) -> String {
    match fs::read_to_string(argument) {
        Ok(contents) => contents,
        // command-line input carries raw escapes for newlines and tabs
        Err(_) => argument.replace("\\n", "\n").replace("\\t", "\t"),
    }
}

#[cfg(feature = "logging")]
fn init_diagnostics(verbose: bool) {
    if verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
}

#[cfg(not(feature = "logging"))]
fn init_diagnostics(_verbose: bool) {}
