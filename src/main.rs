use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use arena_snake::game::{Command, GameConfig, GameEngine, GameMode};
use arena_snake::modes::PlayMode;
use arena_snake::session::{BestScoreStore, MonotonicClock, Session};
use clap::{Parser, ValueEnum};
use log::info;

#[derive(Parser)]
#[command(name = "arena_snake")]
#[command(version, about = "Grid Snake with single-player survival and two-player duels")]
struct Cli {
    /// Screen to open on
    #[arg(long, default_value = "menu")]
    start: Start,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding timer cadences and drop chances
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the best score is kept
    #[arg(long, default_value = "best_score.json")]
    best_score_file: PathBuf,

    /// Log output file (the terminal belongs to the game)
    #[arg(long, default_value = "arena_snake.log")]
    log_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Start {
    /// Mode selection screen
    Menu,
    /// Jump straight into a single-player game
    Single,
    /// Jump straight into a two-player round
    Multi,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&json).context("Failed to deserialize game config")?
        }
        None => GameConfig::default(),
    };
    config
        .validate()
        .map_err(|e| anyhow!("Invalid game config: {}", e))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = load_config(cli.config.as_deref())?;
    let engine = match cli.seed {
        Some(seed) => GameEngine::seeded(config, seed),
        None => GameEngine::new(config),
    };
    let store = BestScoreStore::load(&cli.best_score_file)?;
    info!("Loaded best score {}", store.best());

    let mut session = Session::new(engine, MonotonicClock::new(), store);
    match cli.start {
        Start::Menu => {}
        Start::Single => session.dispatch(Command::Start(GameMode::Single)),
        Start::Multi => session.dispatch(Command::Start(GameMode::Multi)),
    }

    let mut play_mode = PlayMode::new(session);
    play_mode.run().await?;

    Ok(())
}
