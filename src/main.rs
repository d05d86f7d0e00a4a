mod api;
mod cli;
mod config;
mod error;
mod export;
mod ledger;
mod store;

use crate::cli::entry::run_entry_loop;
use crate::cli::{Cli, Commands, ConfigCommands, HotelFilterArgs};
use crate::config::Config;
use crate::error::LedgerError;
use crate::ledger::model::{Category, Hotel, NewEntry};
use crate::ledger::summary::{format_grouped, render_summary};
use crate::ledger::{Session, View};
use crate::store::LedgerStore;
use anyhow::{Context, Result, bail};
use clap::Parser;
use dialoguer::Confirm;
use std::fs;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            hotel,
            area,
            category,
            sqm,
            cost_per_sqm,
        } => handle_add(hotel, area, category, sqm, cost_per_sqm),
        Commands::Entry => {
            let mut session = open_session(&load_config()?);
            run_entry_loop(&mut session)?;
            print_view(&session.refresh());
            Ok(())
        }
        Commands::List { filter } => handle_list(&filter),
        Commands::Summary { filter } => handle_summary(&filter),
        Commands::Edit { file } => handle_edit(&file),
        Commands::Undo => handle_undo(),
        Commands::Clear { yes } => handle_clear(yes),
        Commands::Export {
            format,
            filter,
            out,
        } => {
            let config = load_config()?;
            let mut session = open_session(&config);
            session.set_hotel_filter(filter.selection()?);
            let view = session.refresh();
            let dir = out.unwrap_or_else(|| config.export_dir.clone());

            let path = export::save_export(format, &view.records, &config.report_options(), &dir)?;
            println!(
                "Exported {} row(s) as {format}: {}",
                view.records.len(),
                path.display()
            );
            Ok(())
        }
        Commands::Serve => {
            let config = load_config()?;
            let session = open_session(&config);
            run_service(config, session).await
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Doctor => handle_doctor(),
    }
}

fn handle_add(
    hotel: Hotel,
    area: String,
    category: Option<Category>,
    sqm: f64,
    cost_per_sqm: Option<f64>,
) -> Result<()> {
    let mut session = open_session(&load_config()?);
    let entry = NewEntry {
        hotel_name: hotel,
        area_name: area,
        category: category.unwrap_or_else(|| session.default_category()),
        coverage_sqm: sqm,
        cost_per_sqm,
    };

    match session.append(entry) {
        Ok(_) => {
            print_view(&session.refresh());
            Ok(())
        }
        Err(error @ LedgerError::Validation { .. }) => {
            bail!("{error}. Please provide Area Name and SQM.")
        }
        Err(error) => Err(error.into()),
    }
}

fn handle_list(filter: &HotelFilterArgs) -> Result<()> {
    let mut session = open_session(&load_config()?);
    session.set_hotel_filter(filter.selection()?);

    print_view(&session.refresh());
    Ok(())
}

fn handle_summary(filter: &HotelFilterArgs) -> Result<()> {
    let mut session = open_session(&load_config()?);
    session.set_hotel_filter(filter.selection()?);

    print!("{}", render_summary(&session.refresh().summary));
    Ok(())
}

fn handle_edit(file: &std::path::Path) -> Result<()> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read edited table: {}", file.display()))?;
    let table = export::parse_csv(&bytes)
        .with_context(|| format!("Failed to parse edited table: {}", file.display()))?;

    let mut session = open_session(&load_config()?);
    if session.edit_in_place(table).changed {
        print_view(&session.refresh());
    } else {
        println!("No changes.");
    }
    Ok(())
}

fn handle_undo() -> Result<()> {
    let mut session = open_session(&load_config()?);

    match session.undo_last() {
        Ok(_) => print_view(&session.refresh()),
        Err(error) => println!("{error}"),
    }
    Ok(())
}

fn handle_clear(yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Clear the whole assessment?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    let mut session = open_session(&load_config()?);
    if session.clear_all()?.changed {
        println!("Assessment cleared.");
    } else {
        println!("Assessment was already empty.");
    }
    Ok(())
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default()?;
            config.set_value(&key, &value)?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path();
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[OK] config.json not found, using defaults: {}", config_path.display());
    }

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(error) => {
            println!("[WARN] config.json unreadable: {error:#}");
            issues.push("config unreadable".to_string());
            Config::default()
        }
    };

    if !config.persist {
        println!("[OK] persistence disabled, assessment lives in memory only");
    } else if !config.ledger_path.exists() {
        println!("[OK] no snapshot yet: {}", config.ledger_path.display());
    } else {
        match fs::read(&config.ledger_path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| export::parse_csv(&bytes))
        {
            Ok(records) => println!(
                "[OK] snapshot readable: {} ({} rows)",
                config.ledger_path.display(),
                records.len()
            ),
            Err(error) => {
                println!("[WARN] snapshot unreadable, it will load as empty: {error:#}");
                issues.push("snapshot unreadable".to_string());
            }
        }
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

async fn run_service(config: Config, session: Session) -> Result<()> {
    let shared_config = Arc::new(config);

    info!("Virtual360 service started");

    tokio::select! {
        api_result = api::run_server(shared_config, session) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn print_view(view: &View) {
    if view.records.is_empty() {
        println!("No assessment rows in view.");
        return;
    }

    println!(
        "{:<10}  {:<12}  {:<24}  {:<16}  {:>10}  {:>10}  {:>12}",
        "Date", "Hotel", "Area", "Category", "SQM", "Cost/SQM", "Total"
    );
    for record in &view.records {
        println!(
            "{:<10}  {:<12}  {:<24}  {:<16}  {:>10}  {:>10}  {:>12}",
            record.date_added.format("%Y-%m-%d"),
            record.hotel_name.as_str(),
            record.area_name,
            record.category.as_str(),
            format_grouped(record.coverage_sqm, 1),
            record
                .cost_per_sqm
                .map(|unit| format_grouped(unit, 2))
                .unwrap_or_default(),
            record
                .total_cost()
                .map(|total| format_grouped(total, 2))
                .unwrap_or_default()
        );
    }
    println!();
    print!("{}", render_summary(&view.summary));
}

fn open_session(config: &Config) -> Session {
    if config.persist {
        Session::with_store(LedgerStore::new(&config.ledger_path))
    } else {
        Session::new()
    }
}

fn load_config() -> Result<Config> {
    Config::load_or_default().with_context(|| {
        format!(
            "Config file is invalid: {}. Fix it or run `Virtual360 config set`.",
            Config::config_path().display()
        )
    })
}
