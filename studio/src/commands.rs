use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "studio", version, about = "Studio configuration and package tools")]
pub struct Cli {
    /// Settings file (TOML); defaults apply when it does not exist
    #[arg(long, global = true, default_value = "studio.toml")]
    pub settings: PathBuf,
    /// Overrides the configuration directory from the settings
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Fetches one package tab and prints the resolved entries
    Packages {
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long, default_value = "updates")]
        tab: String,
        #[arg(long, default_value_t = 30)]
        timeout_seconds: u64,
    },
    Expr {
        #[command(subcommand)]
        command: ExprCommands,
    },
    Style {
        #[command(subcommand)]
        command: StyleCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    Types,
    List {
        type_id: String,
        #[arg(long, alias = "jq")]
        json_query: bool,
    },
    Show {
        type_id: String,
        name: String,
        #[arg(long, alias = "jq")]
        json_query: bool,
    },
    Create {
        type_id: String,
        name: String,
        /// key=value, repeatable
        #[arg(long = "param")]
        params: Vec<String>,
    },
    Remove {
        type_id: String,
        name: String,
    },
    Export {
        type_id: String,
    },
    Import {
        type_id: String,
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ExprCommands {
    ReplaceRegex {
        text: String,
        what: String,
        by: String,
    },
}

#[derive(Subcommand)]
pub enum StyleCommands {
    Show,
    Select { index: usize },
}
