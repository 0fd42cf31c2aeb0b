use crate::infra::load_scoring_service;
use clap::Args;
use kritis::config::AppConfig;
use kritis::error::AppError;
use kritis::scoring::{PromptRequest, ScoreRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON score request; `-` reads from stdin
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Print the result on a single line
    #[arg(long)]
    pub(crate) compact: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PromptArgs {
    /// JSON prompt request; `-` reads from stdin
    #[arg(long)]
    pub(crate) request: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_scoring_service(&config.scoring)?;
    let request: ScoreRequest = read_request(&args.request)?;

    let result = service.score(request)?;
    print_json(&result, args.compact)
}

pub(crate) fn run_prompt(args: PromptArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = load_scoring_service(&config.scoring)?;
    let request: PromptRequest = read_request(&args.request)?;

    let messages = service.prompt(&request)?;
    print_json(&messages, false)
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), AppError> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
