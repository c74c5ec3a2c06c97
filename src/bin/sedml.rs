//! Command-line tool for checking and converting SED-ML documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use sedml::xml::write_mathml_string;
use sedml::{MathExpression, SedDocument, SedError, SedFileError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase logging verbosity (`-v` info, `-vv` debug, `-vvv` trace). Without the flag,
    /// `RUST_LOG` is used.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read and validate a document, printing every diagnostic.
    Validate {
        file: PathBuf,
        /// Reject unknown elements and attributes.
        #[arg(long)]
        strict: bool,
    },
    /// Print the object model of a document as JSON.
    Json {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Read a document and write it back as normalized SED-ML.
    Format {
        file: PathBuf,
        /// Spaces per nesting level.
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
    /// Parse an infix formula and print it as MathML.
    Formula { text: String },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default());
    match args.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Info);
        }
        2 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.init();
    log::debug!("Parsed arguments: {args:?}");

    match run(args.command) {
        Ok(code) => code,
        Err(error) => {
            log::error!("{error:#}");
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Validate { file, strict } => validate(&file, strict),
        Command::Json { file, pretty } => {
            let document = read(&file)?;
            let json = if pretty {
                document.to_json_string_pretty()?
            } else {
                document.to_json_string()?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Format { file, indent } => {
            let document = read(&file)?;
            let options = sedml::WriteOptions {
                indent,
                ..Default::default()
            };
            print!("{}", document.to_xml_string_with(&options));
            Ok(ExitCode::SUCCESS)
        }
        Command::Formula { text } => {
            let math = MathExpression::parse(&text)?;
            println!("{}", write_mathml_string(&math));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read(file: &Path) -> Result<SedDocument> {
    SedDocument::from_xml_file(file).with_context(|| format!("Cannot read `{}`", file.display()))
}

fn validate(file: &Path, strict: bool) -> Result<ExitCode> {
    let xml = std::fs::read_to_string(file).map_err(|source| SedFileError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let options = sedml::ReadOptions { strict };
    let diagnostics = match SedDocument::from_xml_string_with(&xml, &options) {
        Ok(document) => document.check(),
        Err(error) => vec![SedError::from(error)],
    };

    for diagnostic in &diagnostics {
        println!("{}: {diagnostic}", file.display());
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    println!(
        "{}: {errors} error(s), {warnings} warning(s)",
        file.display()
    );
    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
