use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::*;

pub use chrono::NaiveDate;

/// How many best times are kept per difficulty.
pub const LEDGER_CAPACITY: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub time: Secs,
    pub date: NaiveDate,
}

impl HighScoreEntry {
    pub fn new(name: impl Into<String>, time: Secs, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            time,
            date,
        }
    }
}

/// Local calendar date used to stamp new entries.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Best completion times, at most [`LEDGER_CAPACITY`] per difficulty, fastest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScoreLedger {
    easy: Vec<HighScoreEntry>,
    hard: Vec<HighScoreEntry>,
}

impl HighScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, difficulty: Difficulty) -> &[HighScoreEntry] {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Hard => &self.hard,
        }
    }

    fn entries_mut(&mut self, difficulty: Difficulty) -> &mut Vec<HighScoreEntry> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// A time qualifies while the list has room, or when it beats the slowest entry.
    pub fn qualifies(&self, difficulty: Difficulty, time: Secs) -> bool {
        let entries = self.entries(difficulty);
        entries.len() < LEDGER_CAPACITY
            || entries
                .iter()
                .map(|entry| entry.time)
                .max()
                .is_some_and(|slowest| time < slowest)
    }

    /// Inserts a qualifying entry, returning its zero-based rank.
    ///
    /// Equal times keep their arrival order, so an older record is never pushed below
    /// a newer one with the same time.
    pub fn record(&mut self, difficulty: Difficulty, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(difficulty, entry.time) {
            return None;
        }
        let entries = self.entries_mut(difficulty);
        let rank = entries.iter().filter(|e| e.time <= entry.time).count();
        entries.push(entry);
        // stable sort keeps the new entry after any equal times
        entries.sort_by_key(|entry| entry.time);
        entries.truncate(LEDGER_CAPACITY);
        debug_assert!(rank < LEDGER_CAPACITY);
        Some(rank)
    }

    /// Sorts and truncates lists read from storage, reporting whether anything changed.
    fn normalize(&mut self) -> bool {
        let mut changed = false;
        for difficulty in Difficulty::ALL {
            let entries = self.entries_mut(difficulty);
            if !entries.is_sorted_by_key(|entry| entry.time) {
                entries.sort_by_key(|entry| entry.time);
                changed = true;
            }
            if entries.len() > LEDGER_CAPACITY {
                entries.truncate(LEDGER_CAPACITY);
                changed = true;
            }
        }
        changed
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let mut ledger: Self = serde_json::from_str(json)?;
        if ledger.normalize() {
            log::warn!("High scores were out of order or over capacity, normalized");
        }
        Ok(ledger)
    }
}

/// Durable home of the ledger.
pub trait LedgerStore {
    /// Reads the stored ledger, an absent store is an empty ledger.
    fn load(&self) -> LedgerResult<HighScoreLedger>;

    fn save(&mut self, ledger: &HighScoreLedger) -> LedgerResult<()>;
}

/// Ledger kept as pretty-printed JSON in a single file.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> LedgerResult<HighScoreLedger> {
        match fs::read_to_string(&self.path) {
            Ok(json) => HighScoreLedger::from_json(&json),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No high scores at {}, starting empty", self.path.display());
                Ok(HighScoreLedger::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, ledger: &HighScoreLedger) -> LedgerResult<()> {
        let json = ledger.to_json()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        log::debug!("Saved high scores to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the serialized ledger in memory, for embedders without a filesystem.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> LedgerResult<HighScoreLedger> {
        self.json
            .as_deref()
            .map_or_else(|| Ok(HighScoreLedger::default()), HighScoreLedger::from_json)
    }

    fn save(&mut self, ledger: &HighScoreLedger) -> LedgerResult<()> {
        self.json = Some(ledger.to_json()?);
        Ok(())
    }
}

/// Result of offering a finished time to the ledger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    NotQualifying,
    /// The time qualified but the player gave no name.
    Declined,
    Recorded { rank: usize },
}

/// Ledger bound to its store, saving after every successful update.
#[derive(Debug)]
pub struct HighScores<S> {
    ledger: HighScoreLedger,
    store: S,
}

impl<S: LedgerStore> HighScores<S> {
    /// Never fails: unreadable or corrupt storage starts an empty ledger.
    pub fn load_or_default(store: S) -> Self {
        let ledger = store.load().unwrap_or_else(|err| {
            log::warn!("Could not load high scores, starting empty: {}", err);
            HighScoreLedger::default()
        });
        Self { ledger, store }
    }

    pub fn ledger(&self) -> &HighScoreLedger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn qualifies(&self, difficulty: Difficulty, time: Secs) -> bool {
        self.ledger.qualifies(difficulty, time)
    }

    /// Offers `time` to the ledger, asking `ask_name` only when it qualifies.
    ///
    /// The in-memory ledger keeps the new entry even if saving fails; the error is
    /// returned so the caller can tell the player.
    pub fn record_if_qualifying(
        &mut self,
        difficulty: Difficulty,
        time: Secs,
        date: NaiveDate,
        ask_name: impl FnOnce() -> Option<String>,
    ) -> LedgerResult<RecordOutcome> {
        if !self.qualifies(difficulty, time) {
            return Ok(RecordOutcome::NotQualifying);
        }

        let Some(name) = ask_name()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
        else {
            log::info!("High score of {}s on {} declined", time, difficulty);
            return Ok(RecordOutcome::Declined);
        };

        let entry = HighScoreEntry::new(name, time, date);
        let Some(rank) = self.ledger.record(difficulty, entry) else {
            return Ok(RecordOutcome::NotQualifying);
        };
        log::info!("New {} high score: {}s at rank {}", difficulty, time, rank + 1);

        self.store.save(&self.ledger)?;
        Ok(RecordOutcome::Recorded { rank })
    }
}
