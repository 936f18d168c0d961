use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::ticket_store::{StoreError, TicketStore, read_ticket};
use crate::model::board::Board;
use crate::model::config::BoardConfig;
use crate::model::ticket::{Ticket, is_ticket_path};
use crate::ops::board_ops::{self, BoardError};
use crate::ops::prompt_ops;
use crate::util::clipboard::clipboard_set;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Load the config (applying `--config` and `--dir`) and run the command.
/// No command launches the terminal board.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::resolve_config(cli.config.as_deref(), cli.dir.as_deref())?;

    match cli.command {
        None => crate::tui::run(config),
        Some(cmd) => match cmd {
            Commands::List(args) => cmd_list(&config, args),
            Commands::Add(args) => cmd_add(&config, args),
            Commands::Mv(args) => cmd_mv(&config, args),
            Commands::Rm(args) => cmd_rm(&config, args),
            Commands::Prompt(args) => cmd_prompt(&config, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list(config: &BoardConfig, args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref dir) = args.column {
        require_column(config, dir)?;
    }
    let store = TicketStore::new(&config.board_dir);

    let mut results = Vec::new();
    for column in &config.columns {
        if args.column.as_ref().is_some_and(|c| *c != column.dir) {
            continue;
        }
        let scan = store.scan(&column.dir)?;
        for skipped in &scan.skipped {
            eprintln!("warning: skipped {}: {}", skipped.path.display(), skipped.error);
        }
        results.push((column, scan.tickets));
    }

    if args.json {
        let columns: Vec<ColumnJson> = results
            .iter()
            .map(|(column, tickets)| ColumnJson {
                name: column.name.clone(),
                dir: column.dir.clone(),
                tickets: tickets.iter().map(ticket_to_json).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    let mut first = true;
    for (column, tickets) in &results {
        if !first {
            println!();
        }
        first = false;
        println!("{} ({}) {}", column.name, column.dir, tickets.len());
        for ticket in tickets {
            println!("{}", format_ticket_line(ticket));
        }
    }
    Ok(())
}

fn cmd_add(config: &BoardConfig, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let column = match args.column {
        Some(dir) => {
            require_column(config, &dir)?;
            dir
        }
        None => config
            .columns
            .first()
            .map(|c| c.dir.clone())
            .ok_or_else(|| BoardError::UnknownColumn(String::new()))?,
    };

    let store = TicketStore::new(&config.board_dir);
    let mut board = Board::new(&config.columns);
    let ticket = board_ops::create_ticket_in(
        &mut board,
        &store,
        &column,
        &args.title,
        &args.tags,
        args.body.as_deref().unwrap_or_default(),
    )?;
    println!("{}", ticket.path.display());
    Ok(())
}

fn cmd_mv(config: &BoardConfig, args: MoveArgs) -> Result<(), Box<dyn std::error::Error>> {
    require_column(config, &args.column)?;
    let store = TicketStore::new(&config.board_dir);
    let mut ticket = load_ticket_file(&store, &args.file)?;

    if ticket.column == args.column {
        println!("{}", ticket.path.display());
        return Ok(());
    }
    store.move_ticket(&mut ticket, &args.column)?;
    println!("{}", ticket.path.display());
    Ok(())
}

fn cmd_rm(config: &BoardConfig, args: RemoveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TicketStore::new(&config.board_dir);
    let ticket = load_ticket_file(&store, &args.file)?;
    store.delete(&ticket)?;
    println!("deleted {}", ticket.path.display());
    Ok(())
}

fn cmd_prompt(config: &BoardConfig, args: PromptArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TicketStore::new(&config.board_dir);
    let (text, label) = match args.file {
        Some(file) => {
            let mut path = store.resolve(&file);
            if path.is_relative() {
                path = std::env::current_dir()?.join(path);
            }
            let ticket = read_ticket(&path)?;
            let text = prompt_ops::render_ticket_prompt(&ticket, config)?;
            (text, format!("prompt for {}", ticket.title))
        }
        None => {
            let first = config
                .columns
                .first()
                .ok_or_else(|| BoardError::UnknownColumn(String::new()))?;
            let tickets = store.list(&first.dir)?;
            if tickets.is_empty() {
                return Err(format!("no tickets in {}", first.dir).into());
            }
            let text = prompt_ops::render_batch_prompt(&tickets, config)?;
            (text, format!("prompt for {} ticket(s)", tickets.len()))
        }
    };

    if args.copy {
        clipboard_set(&text).map_err(|e| format!("could not copy to clipboard: {}", e))?;
        println!("copied {}", label);
    } else {
        print!("{}", text);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_column(config: &BoardConfig, dir: &str) -> Result<(), BoardError> {
    match config.column_index(dir) {
        Some(_) => Ok(()),
        None => Err(BoardError::UnknownColumn(dir.to_string())),
    }
}

/// Read a ticket named on the command line. A file whose header cannot be
/// parsed is still returned (untitled) so it can be moved or removed.
fn load_ticket_file(store: &TicketStore, file: &Path) -> Result<Ticket, Box<dyn std::error::Error>> {
    let path = store.resolve(file);
    if !is_ticket_path(&path) {
        return Err(format!("not a ticket file: {}", path.display()).into());
    }
    match read_ticket(&path) {
        Ok(ticket) => Ok(ticket),
        Err(StoreError::Parse { .. }) => {
            let mut ticket = Ticket::new("", "");
            ticket.set_path(path);
            Ok(ticket)
        }
        Err(e) => Err(e.into()),
    }
}
