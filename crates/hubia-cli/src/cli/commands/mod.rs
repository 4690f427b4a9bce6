use hubia_core::config::AppConfig;
use hubia_core::engine::QueryEngine;
use hubia_core::errors::QueryError;

use super::args::{Cli, Command, OutputFormat};

pub mod ask;
pub mod catalog;
pub mod chat;
pub mod history;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const QUERY_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli, cfg: &AppConfig) -> anyhow::Result<i32> {
    let engine = QueryEngine::from_config(cfg)?;

    match cli.cmd {
        Command::Ask(args) => ask::run(&engine, args, cli.format).await,
        Command::Chat => chat::run(&engine, cli.format).await,
        Command::Tables => catalog::tables(&engine, cli.format),
        Command::Describe(args) => catalog::describe(&engine, args, cli.format),
        Command::History(args) => history::run(&engine, args, cli.format),
    }
}

/// Storage failures are fatal; everything else is a failed question.
pub fn exit_code_for(err: &QueryError) -> i32 {
    match err {
        QueryError::Storage(_) => exit_codes::CONFIG_ERROR,
        _ => exit_codes::QUERY_FAILED,
    }
}

pub fn report_error(err: &QueryError, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                    "rephrasable": err.is_rephrasable(),
                }
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            eprintln!("Erro: {}", err);
            if err.is_rephrasable() {
                eprintln!("Tente reformular a pergunta.");
            }
        }
    }
    Ok(())
}
