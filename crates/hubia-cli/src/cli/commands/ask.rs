use hubia_core::engine::QueryEngine;
use hubia_core::model::Answer;
use hubia_core::report::console::render_answer;

use super::{exit_code_for, exit_codes, report_error};
use crate::cli::args::{AskArgs, OutputFormat};

pub async fn run(engine: &QueryEngine, args: AskArgs, format: OutputFormat) -> anyhow::Result<i32> {
    match engine.ask(&args.question).await {
        Ok(answer) => {
            print_answer(&answer, format)?;
            Ok(exit_codes::OK)
        }
        Err(e) => {
            report_error(&e, format)?;
            Ok(exit_code_for(&e))
        }
    }
}

pub fn print_answer(answer: &Answer, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(answer)?),
        OutputFormat::Text => print!("{}", render_answer(answer)),
    }
    Ok(())
}
