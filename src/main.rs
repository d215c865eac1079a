use clap::{Parser as ClapParser, Subcommand};
use clove_expr::cli::{
    self, CheckOptions, CheckResult, CliError, OutputFormat, ParseOptions,
};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "clove-expr")]
#[command(about = "clove-expr - Parse expressions of a configurable language and report errors")]
#[command(version)]
struct Cli {
    /// Log parser activity (same as CLOVE_EXPR_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse text and print its expression tree
    Parse {
        /// The text to parse (reads from stdin if not provided)
        text: Option<String>,

        /// Language definition JSON (bundled C-like language if not provided)
        #[arg(short, long)]
        language: Option<PathBuf>,

        /// Output format: outline or json
        #[arg(short, long, default_value = "outline")]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Parse text and print its errors as line:column [code] message
    Check {
        /// The text to check (reads from stdin if not provided)
        text: Option<String>,

        /// Language definition JSON (bundled C-like language if not provided)
        #[arg(short, long)]
        language: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            text,
            language,
            format,
            pretty,
        } => run_parse(text, language, format, pretty),
        Commands::Check { text, language } => run_check(text, language),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("CLOVE_EXPR_LOG", default))
        .init();
}

fn read_text(text: Option<String>) -> Result<String, CliError> {
    match text {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

/// Returns `false` when the text has parse errors.
fn run_parse(
    text: Option<String>,
    language: Option<PathBuf>,
    format: OutputFormat,
    pretty: bool,
) -> Result<bool, CliError> {
    let language = cli::load_language(language.as_deref())?;
    let options = ParseOptions {
        text: read_text(text)?,
        format,
        pretty,
    };

    let output = cli::execute_parse(&options, &language)?;
    println!("{}", output.rendered);
    for diagnostic in &output.diagnostics {
        eprintln!("{}", diagnostic);
    }
    Ok(!output.has_errors())
}

fn run_check(text: Option<String>, language: Option<PathBuf>) -> Result<bool, CliError> {
    let language = cli::load_language(language.as_deref())?;
    let options = CheckOptions {
        text: read_text(text)?,
    };

    match cli::execute_check(&options, &language)? {
        CheckResult::Valid => {
            println!("No errors");
            Ok(true)
        }
        CheckResult::Invalid(found) => {
            for diagnostic in &found {
                println!("{}", diagnostic);
            }
            Ok(false)
        }
    }
}
