//! `sdstock` - SD card inventory tracker
//!
//! This binary runs the interactive check-out/return session and offers the
//! same store operations as one-shot subcommands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sdstock::cli::{
    CardsCommand, CheckoutCommand, Cli, Command, ConfigCommand, ReturnCommand, StatusFilter,
};
use sdstock::ui::{render, Terminal};
use sdstock::workflow::{CheckoutForm, Controller};
use sdstock::{init_logging, Config, Error, InventoryStore, SeedPlan};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Config(config_cmd) => handle_config(&config, config_cmd, &mut out),
        command => {
            let mut store = open_store(&config)?;
            run(&mut store, &config, command, &mut out)
        }
    }
}

fn open_store(config: &Config) -> Result<InventoryStore> {
    let path = config.database_path();
    let mut store = InventoryStore::open(&path)
        .with_context(|| format!("opening inventory at {}", path.display()))?;

    if config.storage.seed_on_open {
        let inserted = store.seed_if_empty(&SeedPlan::default())?;
        if inserted > 0 {
            info!(inserted, "Seeded empty inventory");
        }
    }
    Ok(store)
}

fn run<W: Write>(
    store: &mut InventoryStore,
    config: &Config,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut controller = Controller::new(store, config.display.clone());
            let mut terminal = Terminal::new(stdin.lock(), out);
            terminal.run(&mut controller)?;
        }
        Command::Containers => {
            for container in store.list_containers()? {
                writeln!(out, "{container}")?;
            }
        }
        Command::Cards(cmd) => handle_cards(store, config, &cmd, out)?,
        Command::Checkout(cmd) => handle_checkout(store, &cmd, out)?,
        Command::Return(cmd) => handle_return(store, &cmd, out)?,
        Command::Seed => {
            let inserted = store.seed_if_empty(&SeedPlan::default())?;
            if inserted == 0 {
                writeln!(out, "Inventory already seeded ({} cards).", store.count()?)?;
            } else {
                writeln!(out, "Seeded {inserted} cards.")?;
            }
        }
        Command::Status(cmd) => handle_status(store, cmd.json, out)?,
        Command::Config(cmd) => handle_config(config, cmd, out)?,
    }
    Ok(())
}

fn handle_cards<W: Write>(
    store: &InventoryStore,
    config: &Config,
    cmd: &CardsCommand,
    out: &mut W,
) -> Result<()> {
    let cards = match cmd.status {
        StatusFilter::Available => store.list_available(&cmd.container)?,
        StatusFilter::CheckedOut => store.list_checked_out(&cmd.container)?,
        StatusFilter::All => store.list_all(&cmd.container)?,
    };
    if cards.is_empty() && !store.list_containers()?.contains(&cmd.container) {
        anyhow::bail!("unknown container: {}", cmd.container);
    }

    let rows: Vec<_> = cards
        .iter()
        .map(|card| card.to_listing(&config.display.date_format))
        .collect();
    if cmd.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        render::listing_table(out, &rows)?;
    }
    Ok(())
}

fn handle_checkout<W: Write>(
    store: &mut InventoryStore,
    cmd: &CheckoutCommand,
    out: &mut W,
) -> Result<()> {
    let ids = store.resolve_labels(&cmd.labels)?;
    let container = match cmd.labels.first() {
        Some(label) => store.find_by_label(label)?.map(|card| card.container),
        None => None,
    };

    let ticket = CheckoutForm {
        borrower: cmd.borrower.clone(),
        equipment: cmd.equipment.clone(),
        container,
        note: cmd.note.clone(),
    }
    .validate()?;

    let labels = store.checkout(&ids, &ticket.request)?;
    writeln!(
        out,
        "Checked out {} to {}: {}",
        labels.len(),
        ticket.request.borrower,
        labels.join(", ")
    )?;
    Ok(())
}

fn handle_return<W: Write>(
    store: &mut InventoryStore,
    cmd: &ReturnCommand,
    out: &mut W,
) -> Result<()> {
    let card = store
        .find_by_label(&cmd.label)?
        .ok_or_else(|| Error::UnknownLabel(cmd.label.clone()))?;
    let label = store.return_card(card.id)?;
    writeln!(out, "Returned {label}")?;
    Ok(())
}

fn handle_status<W: Write>(store: &InventoryStore, json: bool, out: &mut W) -> Result<()> {
    let stats = store.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "total": stats.total,
            "checked_out": stats.checked_out,
            "db_size_bytes": stats.db_size_bytes,
            "containers": stats.containers,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
    } else {
        writeln!(out, "sdstock status")?;
        writeln!(out, "--------------")?;
        writeln!(out, "Database:      {}", store.path().display())?;
        writeln!(out, "Size:          {} bytes", stats.db_size_bytes)?;
        writeln!(
            out,
            "Cards:         {} ({} checked out)",
            stats.total, stats.checked_out
        )?;
        writeln!(out)?;
        for container in &stats.containers {
            writeln!(
                out,
                "  {:<10} {:>3} total  {:>3} available  {:>3} checked out",
                container.container, container.total, container.available, container.checked_out
            )?;
        }
    }
    Ok(())
}

fn handle_config<W: Write>(config: &Config, cmd: ConfigCommand, out: &mut W) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
            } else {
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Storage]")?;
                writeln!(
                    out,
                    "  Database path:  {}",
                    config.database_path().display()
                )?;
                writeln!(out, "  Seed on open:   {}", config.storage.seed_on_open)?;
                writeln!(out)?;
                writeln!(out, "[Display]")?;
                writeln!(out, "  Date format:    {}", config.display.date_format)?;
                writeln!(out, "  Cards per row:  {}", config.display.cards_per_row)?;
            }
        }
        ConfigCommand::Path => {
            writeln!(out, "{}", Config::default_config_path().display())?;
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            writeln!(out, "Validating configuration: {}", path.display())?;
            Config::load_from(Some(path))?;
            writeln!(out, "Configuration is valid.")?;
        }
    }
    Ok(())
}
