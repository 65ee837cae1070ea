//! Tactoe - command-line front end
//!
//! Interactive play, history listing, replay and move suggestions.

#![warn(missing_docs)]

mod cli;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, PLAY_HELP, PlayCommand, parse_cells};
use tactoe::{GameConfig, GameSession, SessionDelays, SessionEvent, SqliteStore};
use tactoe_core::{
    Board, GameController, HistoryStore, InMemoryStore, KeyValueStore, Outcome, Replay, Searcher,
    Symbol, outcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

type DynStore = Box<dyn KeyValueStore + Send>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tactoe=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Play => run_play(config).await,
        Command::History => run_history(&config),
        Command::Replay { index, all } => run_replay(&config, index, all).await,
        Command::Clear { all } => run_clear(&config, all),
        Command::Suggest { moves } => run_suggest(&config, &moves),
    }
}

/// Merges the config file with command-line overrides.
#[instrument(skip(cli))]
fn resolve_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = GameConfig::load(cli.config.as_deref())?;
    if let Some(n) = cli.grid_size {
        config = config.with_grid_size(n)?;
    }
    if let Some(depth) = cli.depth {
        config = config.with_depth_limit(depth);
    }
    if cli.assist {
        config = config.with_assist_mode(true);
    }
    if let Some(db) = &cli.db {
        config = config.with_history_db(db.clone());
    }
    info!(?config, "Configuration resolved");
    Ok(config)
}

/// Opens the configured history store.
fn open_store(config: &GameConfig) -> Result<DynStore> {
    if config.history_db() == ":memory:" {
        return Ok(Box::new(InMemoryStore::new()));
    }
    let store = SqliteStore::open(config.history_db())
        .with_context(|| format!("opening history database '{}'", config.history_db()))?;
    info!(path = store.db_path(), "History store ready");
    Ok(Box::new(store))
}

/// Interactive game on stdin/stdout.
async fn run_play(config: GameConfig) -> Result<()> {
    let history = HistoryStore::new(open_store(&config)?);
    let controller = GameController::new(config.controller_config(), history);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = GameSession::with_events(controller, SessionDelays::from_config(&config), event_tx);
    session.start();

    let printer = tokio::spawn(render_events(
        session.clone(),
        config.reset_delay(),
        event_rx,
    ));

    println!("{PLAY_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match PlayCommand::parse(&line) {
            Some(PlayCommand::Move(row, col)) => {
                if let Err(e) = session.submit_move(row, col) {
                    println!("Rejected: {e}");
                }
            }
            Some(PlayCommand::Reset) => session.reset(),
            Some(PlayCommand::Assist(enabled)) => {
                session.set_assist_mode(enabled);
                println!("Assist mode {}", if enabled { "on" } else { "off" });
            }
            Some(PlayCommand::Depth(depth)) => {
                session.set_depth_limit(depth);
                println!("Computer searches {depth} plies");
            }
            Some(PlayCommand::Board) => {
                let snapshot = session.snapshot();
                print_board(&snapshot.board, snapshot.outcome);
            }
            Some(PlayCommand::Help) => println!("{PLAY_HELP}"),
            Some(PlayCommand::Quit) => break,
            None => println!("Unknown command. Type 'help'."),
        }
    }

    printer.abort();
    info!("Leaving game");
    Ok(())
}

/// Prints session events as they arrive.
async fn render_events(
    session: GameSession<DynStore>,
    reset_delay: Duration,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        let snapshot = session.snapshot();
        match event {
            SessionEvent::MoveMade {
                mv,
                outcome,
                by_computer,
            } => {
                let who = if by_computer { "Computer" } else { "You" };
                println!("\n{who} played {} at {} {}", mv.symbol, mv.row, mv.col);
                print_board(&snapshot.board, outcome);
                if outcome.is_terminal() {
                    println!("New game in {:.1}s", reset_delay.as_secs_f32());
                }
            }
            SessionEvent::GameReset { epoch } => {
                println!("\nGame {epoch} ({})", snapshot.board.size());
                print_board(&snapshot.board, snapshot.outcome);
            }
        }
    }
}

fn print_board(board: &Board, outcome: Outcome) {
    println!("{board}");
    if outcome.is_terminal() {
        println!("{outcome}");
    }
}

/// Lists stored games.
fn run_history(config: &GameConfig) -> Result<()> {
    let history = HistoryStore::new(open_store(config)?);
    let games = history.load_or_empty();
    if games.is_empty() {
        println!("No games recorded");
        return Ok(());
    }

    for (i, game) in games.iter().enumerate() {
        match game.to_record() {
            Ok(record) => println!(
                "{i:>3}  {}  {:<13} {} moves",
                record.grid_size(),
                record.result_text(),
                record.moves().len()
            ),
            Err(e) => println!("{i:>3}  unreadable ({e})"),
        }
    }
    println!("{}", history.summary());
    Ok(())
}

/// Steps through a stored game.
async fn run_replay(config: &GameConfig, index: usize, all: bool) -> Result<()> {
    let history = HistoryStore::new(open_store(config)?);
    let games = history.load()?;
    let Some(stored) = games.get(index) else {
        bail!("no game at index {index}; {} stored", games.len());
    };

    let mut replay = Replay::from_stored(stored);
    println!("Result: {}", replay.result_text());
    println!("{}\n{}", replay.board(), replay.status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !replay.is_finished() {
        if !all {
            println!("(Enter for next move)");
            if lines.next_line().await?.is_none() {
                break;
            }
        }
        match replay.step() {
            Ok(_) => println!("\n{}\n{}", replay.board(), replay.status()),
            Err(e) => {
                warn!(error = %e, "Replay stopped");
                println!("{e}");
                break;
            }
        }
    }
    Ok(())
}

/// Deletes history or the whole store.
fn run_clear(config: &GameConfig, all: bool) -> Result<()> {
    let mut history = HistoryStore::new(open_store(config)?);
    if all {
        history.clear_all()?;
        println!("All stored data cleared");
    } else {
        history.clear_history()?;
        println!("Game history cleared");
    }
    Ok(())
}

/// Prints the search engine's choice for the side to move.
fn run_suggest(config: &GameConfig, moves: &str) -> Result<()> {
    let cells = parse_cells(moves).map_err(anyhow::Error::msg)?;
    let mut board = Board::new(*config.grid_size());
    let mut symbol = Symbol::First;
    for (row, col) in cells {
        board
            .apply_move(row, col, symbol)
            .with_context(|| format!("applying {symbol} at {row},{col}"))?;
        symbol = symbol.opponent();
    }
    println!("{board}");

    let result = outcome(&board);
    if result.is_terminal() {
        println!("{result}");
        return Ok(());
    }

    let mut searcher = Searcher::new(*config.depth_limit());
    match searcher.best_move(&mut board, symbol, symbol.opponent()) {
        Some(choice) => println!(
            "{symbol} should play {} {} (score {}, {} nodes)",
            choice.row,
            choice.col,
            choice.score,
            searcher.nodes()
        ),
        None => println!("No moves available"),
    }
    Ok(())
}
