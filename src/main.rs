use std::error::Error;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use market_chat::common::ChatCommand;
use market_chat::config::{self, AppConfig};
use market_chat::engine::{self, ChatState, EngineHandles};
use market_chat::repl;
use market_chat::storage;
use market_chat::ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "market_chat",
    version,
    about = "Buyer/seller chat for a book marketplace"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// JSON seed with users, chats and messages (overrides the config file)
    #[arg(long, value_name = "FILE")]
    seed: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run without a window, reading commands from stdin
    Headless,
    /// Print the effective seed data as JSON and exit
    DumpSeed,
    /// Write the effective configuration to the --config path and exit
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_env_overrides();
    if let Some(seed) = cli.seed.clone() {
        app_config.seed_path = Some(seed);
    }
    app_config.validate()?;

    if cli.mode == Some(Mode::InitConfig) {
        config::save_config(&cli.config, &app_config)?;
        log::info!("Wrote configuration to {}", cli.config);
        return Ok(());
    }

    let seed = storage::load_seed(app_config.seed_path.as_deref())?;
    if cli.mode == Some(Mode::DumpSeed) {
        println!("{}", serde_json::to_string_pretty(&seed)?);
        return Ok(());
    }

    let state = ChatState::from_config(&app_config, seed)?;
    let handles = engine::spawn_engine(state, app_config.event_buffer);

    match cli.mode {
        Some(Mode::Headless) => repl::run(handles).await?,
        _ => run_desktop(handles, &app_config)?,
    }
    Ok(())
}

fn run_desktop(handles: EngineHandles, app_config: &AppConfig) -> Result<(), eframe::Error> {
    let EngineHandles {
        handle,
        events,
        task: _,
    } = handles;
    let options = eframe::NativeOptions::default();
    let mut events = Some(events);
    let viewer_id = app_config.viewer_id.clone();
    let shutdown = handle.clone();

    let result = eframe::run_native(
        "Market Chat",
        options,
        Box::new(move |cc| {
            let event_receiver = events.take().ok_or("ChatApp initialised twice")?;
            log::info!("Desktop client started for {viewer_id}");
            Ok(Box::new(ChatApp::new(cc, handle.clone(), event_receiver)))
        }),
    );

    if let Err(err) = shutdown.try_dispatch(ChatCommand::Shutdown) {
        log::debug!("Engine already stopped on exit: {err}");
    }
    result
}
