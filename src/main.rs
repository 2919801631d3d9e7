use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use kiwi::ast_printer::AstPrinter;
use kiwi::error::KiwiError;
use kiwi::parser::Parser;
use kiwi::scanner::Scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Kiwi language parser", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to kiwi.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file (or stdin), printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses input from a file (or stdin) and prints its syntax tree
    Parse {
        filename: Option<PathBuf>,

        /// Print the statements as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
}

/// Reads the whole input from a file, or from stdin when none is given.
fn read_source(filename: Option<PathBuf>) -> Result<String> {
    let buf: Vec<u8> = match filename {
        Some(filename) => {
            info!("Reading file: {:?}", filename);

            let file =
                File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();

            let bytes = reader
                .read_to_end(&mut buf)
                .context(format!("Failed to read file {:?}", filename))?;

            info!("Read {} bytes from {:?}", bytes, filename);

            buf
        }
        None => {
            info!("Reading source from stdin");

            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;

            buf
        }
    };

    let source = String::from_utf8(buf)
        .map_err(KiwiError::from)
        .context("Input is not valid UTF-8")?;

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("kiwi.log").context("Failed to create kiwi.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'kiwi::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("kiwi::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}] [{}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to kiwi.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");

            let source = read_source(filename)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();

            for (token, lexeme) in Scanner::new(&source) {
                writeln!(out, "{} {}", token, lexeme)?;
            }

            info!("Tokenization completed");
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");

            let source = read_source(filename)?;
            let mut parser = Parser::new(Scanner::new(&source));

            match parser.parse() {
                Ok(program) => {
                    info!("Program parsed successfully");

                    if json {
                        println!("{}", serde_json::to_string_pretty(&program.stmts)?);
                    } else {
                        print!("{}", AstPrinter::print(&program));
                    }
                }

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }

            info!("Parse subcommand completed");
        }
    }

    Ok(())
}
