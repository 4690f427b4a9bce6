use hubia_core::engine::QueryEngine;
use hubia_core::report::console::render_history;

use super::exit_codes;
use crate::cli::args::{HistoryArgs, OutputFormat};

pub fn run(engine: &QueryEngine, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<i32> {
    let entries = engine.history().recent(args.limit)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => print!("{}", render_history(&entries)),
    }
    Ok(exit_codes::OK)
}
