use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use directories::ProjectDirs;
use sapper_core::{Difficulty, GameSession, HighScores, JsonFileStore, Secs};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use app::{App, Flow};
use command::Command;

mod app;
mod command;
mod view;

/// Play minesweeper in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board preset to start with
    #[arg(short, long, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// High-score file, defaults to the per-user data directory
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

/// Per-user data directory, falling back to the working directory.
fn default_scores_path() -> PathBuf {
    const FILE_NAME: &str = "highscores.json";
    match ProjectDirs::from("dev", "sugoijan", "sapper") {
        Some(dirs) => dirs.data_dir().join(FILE_NAME),
        None => {
            log::warn!("No home directory found, keeping high scores in the working directory");
            PathBuf::from(FILE_NAME)
        }
    }
}

/// Reads one line, `None` on end of input.
fn read_line(stdin: &io::Stdin) -> io::Result<Option<String>> {
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end().to_string()))
}

fn prompt(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", text)?;
    stdout.flush()
}

fn ask_name(stdin: &io::Stdin, time: Secs) -> Option<String> {
    const DEFAULT_NAME: &str = "Player";
    if let Err(err) = prompt(&format!(
        "Congratulations! {}s is a high score.\nEnter your name [{}]: ",
        time, DEFAULT_NAME
    )) {
        log::warn!("Could not prompt for a name: {}", err);
        return None;
    }
    match read_line(stdin) {
        Ok(Some(name)) if name.trim().is_empty() => Some(DEFAULT_NAME.to_string()),
        Ok(name) => name,
        Err(err) => {
            log::warn!("Could not read a name: {}", err);
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let scores_path = args.scores.unwrap_or_else(default_scores_path);
    log::info!("High scores at {}", scores_path.display());
    let scores = HighScores::load_or_default(JsonFileStore::new(scores_path));

    let session = match args.seed {
        Some(seed) => GameSession::with_seed(args.difficulty, seed),
        None => GameSession::new(args.difficulty),
    };
    let mut app = App::new(session, scores);

    let stdin = io::stdin();
    let mut screen = app.render();
    screen.push_str("Type \"h\" for help.\n");
    loop {
        prompt(&screen).context("Could not write to the terminal")?;
        prompt("> ").context("Could not write to the terminal")?;
        screen.clear();

        let Some(line) = read_line(&stdin).context("Could not read input")? else {
            break;
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(command::ParseCommandError::Empty) => continue,
            Err(err) => {
                screen = format!("{}\n", err);
                continue;
            }
        };

        if app.handle(command, &mut screen, |time| ask_name(&stdin, time)) == Flow::Quit {
            break;
        }
    }

    log::info!("Bye");
    Ok(())
}
