use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "indicator-atlas")]
#[command(about = "Compare World Bank country indicators over a year range")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to TOML configuration file (built-in defaults when omitted)")]
    pub config: Option<String>,

    #[arg(short, long, help = "Indicator label to map (defaults to the first configured indicator)")]
    pub indicator: Option<String>,

    #[arg(long, help = "First year of the range (defaults to the configured start)")]
    pub from: Option<i32>,

    #[arg(long, help = "Last year of the range (defaults to --from)")]
    pub to: Option<i32>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[arg(long, help = "Keep refreshing on the configured interval and print each new map")]
    pub watch: bool,

    #[arg(long, help = "Write the cached dataset as a JSON record list to this path")]
    pub snapshot: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}
