use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use phpsync_lsp::{Backend, Outcome};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "PHPSYNC_LOG";

#[derive(Parser)]
#[command(name = "phpsync_lsp")]
#[command(version)]
#[command(about = "Keep PHP class names, namespaces and references in sync with file names")]
struct Cli {
    /// Log level when PHPSYNC_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the language server over stdin/stdout (default)
    Serve,
    /// Rename the class in FILE to match its file name and update references
    Sync {
        /// The PHP file to refactor
        file: PathBuf,
        /// Workspace root (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the LSP transport.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let (service, socket) = LspService::new(Backend::new);
            Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
                .serve(service)
                .await;
            ExitCode::SUCCESS
        }
        Commands::Sync { file, root } => sync(file, root).await,
    }
}

async fn sync(file: PathBuf, root: Option<PathBuf>) -> ExitCode {
    let root = match root.map_or_else(std::env::current_dir, std::path::absolute) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("cannot determine workspace root: {err}");
            return ExitCode::FAILURE;
        }
    };
    let file = match std::path::absolute(&file) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("invalid path {}: {err}", file.display());
            return ExitCode::FAILURE;
        }
    };

    // The manual rename never asks for confirmation.
    let backend = Backend::new_headless(root, false);
    match backend.refactorer().refactor_file(&backend, &file).await {
        Outcome::Refactored(summary) => {
            println!("{}", summary.message());
            ExitCode::SUCCESS
        }
        Outcome::Aligned => {
            println!("Class name already matches filename.");
            ExitCode::SUCCESS
        }
        Outcome::NoClass => {
            eprintln!("No PHP class found in {}.", file.display());
            ExitCode::FAILURE
        }
        Outcome::InvalidName(name) => {
            eprintln!("{} does not name a valid PHP class ({name:?}).", file.display());
            ExitCode::FAILURE
        }
        Outcome::Declined => ExitCode::SUCCESS,
        Outcome::Failed(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
