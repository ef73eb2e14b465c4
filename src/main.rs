use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use vantage::cli::{self, CheckOptions, CheckResult, CliError, ConvertOptions};

#[derive(ClapParser)]
#[command(name = "vantage")]
#[command(about = "Vantage - converts tabular queries into declarative view configurations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a query into its view configuration (JSON)
    Convert {
        /// The query to convert (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate a query without emitting a configuration
    Check {
        /// The query to validate (reads from stdin if not provided)
        query: Option<String>,

        /// Only validate syntax, don't run the transform
        #[arg(long)]
        syntax_only: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { query, pretty } => run_convert(query, pretty),
        Commands::Check { query, syntax_only } => run_check(query, syntax_only),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_query(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(q) => Ok(q),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Ok(buffer)
        }
        None => Err(CliError::NoQuery),
    }
}

fn run_convert(query: Option<String>, pretty: bool) -> Result<(), CliError> {
    let query = read_query(query)?;
    let options = ConvertOptions { query, pretty };
    let json = cli::execute_convert(&options)?;
    println!("{}", json);
    Ok(())
}

fn run_check(query: Option<String>, syntax_only: bool) -> Result<(), CliError> {
    let query = read_query(query)?;
    let options = CheckOptions { query, syntax_only };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Convertible => println!("Query converts cleanly"),
    }
    Ok(())
}
