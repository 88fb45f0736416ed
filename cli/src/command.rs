use sapper_core::{Coord, Coord2, Difficulty};
use std::str::FromStr;

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Reveal(Coord2),
    Flag(Coord2),
    NewGame,
    SetDifficulty(Difficulty),
    Scores,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, type \"help\" for a list")]
    Unknown(String),
    #[error("expected a row and a column, e.g. \"{0} 3 5\"")]
    MissingCoords(&'static str),
    #[error("{0:?} is not a row or column number")]
    BadNumber(String),
    #[error(transparent)]
    Difficulty(#[from] sapper_core::ParseDifficultyError),
}

/// Parses a 1-based number as typed by the player into a 0-based coordinate.
fn parse_axis(word: &str) -> Result<Coord, ParseCommandError> {
    word.parse::<Coord>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| ParseCommandError::BadNumber(word.to_string()))
}

fn parse_coords<'a>(
    verb: &'static str,
    mut words: impl Iterator<Item = &'a str>,
) -> Result<Coord2, ParseCommandError> {
    let (Some(row), Some(col)) = (words.next(), words.next()) else {
        return Err(ParseCommandError::MissingCoords(verb));
    };
    Ok((parse_axis(row)?, parse_axis(col)?))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseCommandError::Empty)?;

        Ok(match verb.to_ascii_lowercase().as_str() {
            "r" | "reveal" => Command::Reveal(parse_coords("r", words)?),
            "f" | "flag" => Command::Flag(parse_coords("f", words)?),
            "n" | "new" | "reset" => Command::NewGame,
            "d" | "difficulty" => {
                Command::SetDifficulty(words.next().unwrap_or_default().parse()?)
            }
            "s" | "scores" => Command::Scores,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(verb.to_string())),
        })
    }
}
