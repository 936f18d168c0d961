use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kanban", about = concat!("kanban v", env!("CARGO_PKG_VERSION"), " - a task board of markdown files"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Board directory (overrides board_dir from the config)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file (default: .kanban/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List columns and their tickets
    List(ListArgs),
    /// Create a ticket and print its path
    Add(AddArgs),
    /// Move a ticket file to another column
    Mv(MoveArgs),
    /// Delete a ticket file
    Rm(RemoveArgs),
    /// Print the agent prompt for a ticket, or for the first column with --batch
    Prompt(PromptArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list this column (directory name)
    #[arg(long)]
    pub column: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Ticket title
    pub title: String,
    /// Column directory (default: first column)
    #[arg(long)]
    pub column: Option<String>,
    /// Tag to attach (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Ticket body
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Ticket file (absolute, or relative to the board directory)
    pub file: PathBuf,
    /// Target column directory
    pub column: String,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Ticket file (absolute, or relative to the board directory)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct PromptArgs {
    /// Ticket file (absolute, or relative to the board directory)
    #[arg(required_unless_present = "batch", conflicts_with = "batch")]
    pub file: Option<PathBuf>,
    /// Prompt for every ticket in the first column
    #[arg(long)]
    pub batch: bool,
    /// Copy to the clipboard instead of printing
    #[arg(long)]
    pub copy: bool,
}
