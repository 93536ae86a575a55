use anyhow::Context;
use clap::Parser;
use parcel_track::app::display;
use parcel_track::config::cli::{Command, LogFormat};
use parcel_track::core::identification::normalize;
use parcel_track::utils::{logger, validation::Validate};
use parcel_track::{
    CliConfig, CourierRegistry, HistoryStore, LocalStorage, Package, SearchOutcome, TrackError,
    TrackerConfig, TrackingEngine,
};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

type History = HistoryStore<LocalStorage>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting parcel-track CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match load_config(cli.config.as_ref()).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let history_path = cli
        .history_file
        .clone()
        .unwrap_or_else(|| config.history_path());
    tracing::debug!("History file: {}", history_path.display());
    let history = HistoryStore::at_path(&history_path);

    let registry = Arc::new(CourierRegistry::from_config(&config)?);
    let engine = TrackingEngine::new(registry, config.timeout());

    let exit_code = match run(cli.command, &engine, &history).await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<TrackError>() {
            Some(track_error) => {
                tracing::error!("❌ {}", track_error);
                eprintln!("❌ {}", track_error.user_friendly_message());
                track_error.exit_code()
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        },
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// 未指定 --config 時，使用預設位置的設定檔 (若存在)
fn load_config(path: Option<&PathBuf>) -> parcel_track::Result<TrackerConfig> {
    if let Some(path) = path {
        return TrackerConfig::from_file(path);
    }

    match dirs::config_dir().map(|dir| dir.join("parcel-track").join("config.toml")) {
        Some(default_path) if default_path.exists() => {
            tracing::debug!("Using configuration {}", default_path.display());
            TrackerConfig::from_file(default_path)
        }
        _ => Ok(TrackerConfig::default()),
    }
}

async fn run(command: Command, engine: &TrackingEngine, history: &History) -> anyhow::Result<i32> {
    match command {
        Command::List => {
            println!("{}", display::render_courier_list(&engine.registry().list_all()));
        }
        Command::Identify { tracking_number } => {
            let plan = engine.plan(&tracking_number);
            if plan.detected {
                println!("Detected potential couriers: {}", plan.couriers.join(", "));
            } else {
                println!(
                    "Could not identify courier format. All couriers would be checked: {}",
                    plan.couriers.join(", ")
                );
            }
        }
        Command::Track {
            tracking_number,
            courier,
            json,
            save,
            no_save,
        } => {
            // 歷史紀錄存放與快遞查詢相同的號碼
            let tracking_number = normalize(&tracking_number);
            let found_courier = match courier {
                Some(courier) => {
                    let package = engine.track_directed(&tracking_number, &courier).await?;
                    print_package(&package, json)?;
                    package.found().then(|| courier.trim().to_lowercase())
                }
                None => match search(engine, &tracking_number, json).await? {
                    Some(courier) => Some(courier),
                    None => {
                        eprintln!(
                            "❌ Could not find tracking number {} in any supported courier.",
                            tracking_number
                        );
                        return Ok(1);
                    }
                },
            };

            if let Some(courier) = found_courier {
                handle_history_save(history, &tracking_number, &courier, save, no_save, json)
                    .await?;
            }
        }
        Command::History => {
            let entries = history.load().await?;
            if entries.is_empty() {
                println!("No tracking history found.");
            } else {
                println!("{}", display::render_history(&entries));
            }
        }
        Command::Forget { tracking_number } => {
            let tracking_number = normalize(&tracking_number);
            if history.remove(&tracking_number).await? {
                println!("Removed {} from history.", tracking_number);
            } else {
                println!("Tracking number {} not found in history.", tracking_number);
            }
        }
        Command::Rename {
            tracking_number,
            alias,
        } => {
            let tracking_number = normalize(&tracking_number);
            if history.rename(&tracking_number, &alias).await? {
                println!("Assigned alias '{}' to {}.", alias, tracking_number);
            } else {
                println!("Tracking number {} not found in history.", tracking_number);
                return Ok(1);
            }
        }
        Command::Refresh => refresh(engine, history).await?,
    }

    Ok(0)
}

/// Undirected search; returns the id of the courier that found the package.
async fn search(
    engine: &TrackingEngine,
    tracking_number: &str,
    json: bool,
) -> anyhow::Result<Option<String>> {
    let plan = engine.plan(tracking_number);
    if !json {
        if plan.detected {
            eprintln!("Detected potential couriers: {}", plan.couriers.join(", "));
        } else {
            eprintln!("Could not identify courier format. Checking all...");
        }
    }

    match engine.search_couriers(tracking_number, &plan.couriers).await {
        SearchOutcome::Matched { courier, package } => {
            print_package(&package, json)?;
            Ok(Some(courier))
        }
        SearchOutcome::Exhausted { queried } => {
            tracing::debug!("Queried {} without a match", queried.join(", "));
            Ok(None)
        }
    }
}

fn print_package(package: &Package, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", display::render_package_json(package)?);
    } else {
        println!("{}", display::render_package(package));
    }
    Ok(())
}

async fn handle_history_save(
    history: &History,
    tracking_number: &str,
    courier: &str,
    save: bool,
    no_save: bool,
    json: bool,
) -> anyhow::Result<()> {
    if no_save || (json && !save) {
        return Ok(());
    }

    let confirmed = save || (std::io::stdin().is_terminal() && confirm_save(tracking_number)?);
    if !confirmed {
        return Ok(());
    }

    if history.add(tracking_number, courier).await? {
        println!("Saved {} to history.", tracking_number);
    } else {
        println!("Updated {} in history.", tracking_number);
    }
    Ok(())
}

fn confirm_save(tracking_number: &str) -> anyhow::Result<bool> {
    print!("Save {} to history? [y/N] ", tracking_number);
    std::io::stdout().flush().context("failed to flush prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read answer")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn refresh(engine: &TrackingEngine, history: &History) -> anyhow::Result<()> {
    let entries = history.load().await?;
    if entries.is_empty() {
        println!("No tracking history found.");
        return Ok(());
    }

    for entry in entries {
        let display_name = if entry.alias.is_empty() {
            entry.tracking_number.clone()
        } else {
            format!("{} ({})", entry.alias, entry.tracking_number)
        };
        println!("\nChecking {}...", display_name);

        match engine
            .track_directed(&entry.tracking_number, &entry.courier)
            .await
        {
            Ok(package) => println!("{}", display::render_package(&package)),
            Err(TrackError::UnknownCourier { name }) => {
                println!("Courier {} not found.", name);
            }
            Err(e) => println!("Error tracking {}: {}", entry.tracking_number, e),
        }
    }
    Ok(())
}
