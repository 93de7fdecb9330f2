use crate::applications::file::read_documents;
use crate::applications::LoanApplication;
use crate::demo::run_demo;
use crate::error::AppError;
use crate::server;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "loan-intake",
    about = "Accept loan applications and track their review status",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through the intake flow against an in-memory store
    Demo,
    /// Print the applications persisted in a store file
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Persist applications to this JSON file instead of memory
    #[arg(long)]
    pub(crate) store_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Store file written by `serve --store-path`
    #[arg(long)]
    store_path: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo => run_demo(),
        Command::List(args) => run_list(args),
    }
}

fn run_list(args: ListArgs) -> Result<(), AppError> {
    let applications: Vec<LoanApplication> = read_documents(&args.store_path)?
        .into_iter()
        .map(|document| document.application)
        .collect();
    let rendered = serde_json::to_string_pretty(&json!({ "applications": applications }))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["loan-intake"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "loan-intake",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--store-path",
            "applications.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.store_path, Some(PathBuf::from("applications.json")));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn list_requires_store_path() {
        assert!(Cli::try_parse_from(["loan-intake", "list"]).is_err());
    }
}
