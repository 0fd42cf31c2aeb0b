use crate::commands::{run_prompt, run_score, PromptArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kritis::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "kritis",
    about = "Score dialogue answers against the round rubric from the command line or over HTTP",
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
    /// Score a single request file and print the normalized result
    Score(ScoreArgs),
    /// Render the judge prompt for a request file
    Prompt(PromptArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Prompt(args) => run_prompt(args),
    }
}
