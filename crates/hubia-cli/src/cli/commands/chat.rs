use hubia_core::engine::QueryEngine;
use hubia_core::errors::QueryError;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::ask::print_answer;
use super::{exit_codes, report_error};
use crate::cli::args::OutputFormat;

const QUIT_WORDS: &[&str] = &["sair", "exit"];

/// Failed questions are reported and the session continues; only storage
/// failures end it.
pub async fn run(engine: &QueryEngine, format: OutputFormat) -> anyhow::Result<i32> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("HuB-IA pronta. Digite sua pergunta (ou 'sair').");

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if QUIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        match engine.ask(question).await {
            Ok(answer) => print_answer(&answer, format)?,
            Err(e @ QueryError::Storage(_)) => {
                report_error(&e, format)?;
                return Ok(exit_codes::CONFIG_ERROR);
            }
            Err(e) => report_error(&e, format)?,
        }
    }
    Ok(exit_codes::OK)
}
