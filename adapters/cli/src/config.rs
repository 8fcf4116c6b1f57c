//! Session settings read from an optional TOML file and command-line flags.

use std::{fs, path::Path};

use ant_factory_core::{Direction, Intent};
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Turns simulated when neither the flags nor the file say otherwise.
pub(crate) const DEFAULT_TURNS: u32 = 12;
/// Filter applied when neither `RUST_LOG` nor the session sets one.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

/// Contents of a session file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    /// Number of turns to simulate.
    pub(crate) turns: Option<u32>,
    /// Scripted intents, one character per turn.
    pub(crate) moves: Option<String>,
    /// Tracing filter directive.
    pub(crate) log_filter: Option<String>,
    /// Level to start on.
    pub(crate) level: Option<String>,
}

impl SessionConfig {
    /// Reads and parses the session file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse session file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid session toml")
    }

    /// Fills every unset key from `fallback`.
    #[must_use]
    pub(crate) fn or(self, fallback: SessionConfig) -> Self {
        Self {
            turns: self.turns.or(fallback.turns),
            moves: self.moves.or(fallback.moves),
            log_filter: self.log_filter.or(fallback.log_filter),
            level: self.level.or(fallback.level),
        }
    }

    /// Scripted intents; turns past the end of the script idle.
    pub(crate) fn intents(&self) -> Result<Vec<Intent>> {
        parse_moves(self.moves.as_deref().unwrap_or_default())
    }

    /// Number of turns to run, defaulting to the script length.
    #[must_use]
    pub(crate) fn turn_count(&self) -> u32 {
        self.turns.unwrap_or_else(|| {
            self.moves
                .as_deref()
                .map(|moves| {
                    let count = moves.chars().filter(|symbol| !symbol.is_whitespace()).count();
                    u32::try_from(count).unwrap_or(u32::MAX)
                })
                .filter(|count| *count > 0)
                .unwrap_or(DEFAULT_TURNS)
        })
    }
}

/// Parses `U`, `D`, `L`, `R` and `.` into intents, ignoring whitespace.
pub(crate) fn parse_moves(script: &str) -> Result<Vec<Intent>> {
    script
        .chars()
        .filter(|symbol| !symbol.is_whitespace())
        .enumerate()
        .map(|(turn, symbol)| {
            Ok(match symbol.to_ascii_uppercase() {
                'U' => Intent::step(Direction::Up),
                'D' => Intent::step(Direction::Down),
                'L' => Intent::step(Direction::Left),
                'R' => Intent::step(Direction::Right),
                '.' => Intent::Idle,
                other => bail!("unexpected move `{other}` at turn {}", turn + 1),
            })
        })
        .collect()
}
