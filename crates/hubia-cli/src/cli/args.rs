use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "hubia",
    version,
    about = "Ask questions in natural language about the Fecomércio analytical database"
)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a single question
    Ask(AskArgs),
    /// Read questions from stdin, one per line, until EOF or `sair`
    Chat,
    /// List the tables of the analytical database
    Tables,
    /// Show the columns of one table
    Describe(DescribeArgs),
    /// Show the most recent conversation turns
    History(HistoryArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct AskArgs {
    pub question: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DescribeArgs {
    pub table: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}
