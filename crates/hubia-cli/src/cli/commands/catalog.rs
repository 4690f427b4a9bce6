use hubia_core::engine::QueryEngine;
use hubia_core::report::console::render_columns;

use super::{exit_code_for, exit_codes, report_error};
use crate::cli::args::{DescribeArgs, OutputFormat};

pub fn tables(engine: &QueryEngine, format: OutputFormat) -> anyhow::Result<i32> {
    let tables = match engine.inspector().list_tables() {
        Ok(t) => t,
        Err(e) => {
            report_error(&e, format)?;
            return Ok(exit_code_for(&e));
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        OutputFormat::Text => {
            for t in &tables {
                println!("{}", t);
            }
        }
    }
    Ok(exit_codes::OK)
}

pub fn describe(engine: &QueryEngine, args: DescribeArgs, format: OutputFormat) -> anyhow::Result<i32> {
    let columns = match engine.inspector().describe_table(&args.table) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e, format)?;
            return Ok(exit_code_for(&e));
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&columns)?),
        OutputFormat::Text => print!("{}", render_columns(&args.table, &columns)),
    }

    if columns.is_empty() {
        Ok(exit_codes::QUERY_FAILED)
    } else {
        Ok(exit_codes::OK)
    }
}
