#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Explicit registry of named levels and the warps between them.
//!
//! Stages never look each other up. Whoever drives the game owns a
//! [`LevelRegistry`] and asks it to follow the warp under the controlled ant;
//! the registry switches the current level and re-resolves the passages of
//! the level it lands in. Passage openness is therefore a snapshot taken at
//! the moment of transition and may go stale until the next one.

use std::collections::BTreeMap;

use ant_factory_core::Position;
use ant_factory_stage::Stage;
use thiserror::Error;

/// Failures raised while switching levels.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WarpError {
    /// No level is registered under the requested name.
    #[error("unknown level `{0}`")]
    UnknownLevel(String),
}

/// Outcome of following a warp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    from: String,
    to: String,
    arrival: Option<Position>,
    open_passages: usize,
}

impl Transition {
    /// Level that was left.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Level that is now current.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Cell the controlled ant was placed on, when the warp pinned one and
    /// the cell could take it.
    #[must_use]
    pub const fn arrival(&self) -> Option<Position> {
        self.arrival
    }

    /// Passages found open in the destination level.
    #[must_use]
    pub const fn open_passages(&self) -> usize {
        self.open_passages
    }
}

/// Named stages plus the name of the one currently being played.
#[derive(Debug, Default)]
pub struct LevelRegistry {
    levels: BTreeMap<String, Stage>,
    current: Option<String>,
}

impl LevelRegistry {
    /// Registers `stage` under `name`, returning any stage it replaces.
    ///
    /// The first level inserted becomes current.
    pub fn insert(&mut self, name: impl Into<String>, stage: Stage) -> Option<Stage> {
        let name = name.into();
        if self.current.is_none() {
            self.current = Some(name.clone());
        }
        self.levels.insert(name, stage)
    }

    /// Stage registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Stage> {
        self.levels.get(name)
    }

    /// Mutable stage registered under `name`.
    #[must_use]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Stage> {
        self.levels.get_mut(name)
    }

    /// Names of every registered level, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// Name of the level being played.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Stage being played.
    #[must_use]
    pub fn current(&self) -> Option<&Stage> {
        self.current.as_deref().and_then(|name| self.levels.get(name))
    }

    /// Mutable stage being played.
    #[must_use]
    pub fn current_mut(&mut self) -> Option<&mut Stage> {
        let name = self.current.as_deref()?;
        self.levels.get_mut(name)
    }

    /// Switches play to `name` and resolves its passages.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::UnknownLevel`] when `name` is not registered.
    pub fn set_current(&mut self, name: &str) -> Result<(), WarpError> {
        if !self.levels.contains_key(name) {
            return Err(WarpError::UnknownLevel(name.to_owned()));
        }
        self.current = Some(name.to_owned());
        let _ = self.resolve_passages(name)?;
        Ok(())
    }

    /// Follows the warp or open passage under the current level's
    /// controlled ant, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::UnknownLevel`] when the warp points at a level
    /// that was never registered; the current level is left unchanged.
    pub fn follow_warp(&mut self) -> Result<Option<Transition>, WarpError> {
        let Some(from) = self.current.clone() else {
            return Ok(None);
        };
        let Some(target) = self.levels.get(&from).and_then(Stage::active_warp) else {
            return Ok(None);
        };

        let to = target.level().to_owned();
        let stage = self
            .levels
            .get_mut(&to)
            .ok_or_else(|| WarpError::UnknownLevel(to.clone()))?;
        let arrival = match target.position() {
            Some(position) if stage.teleport_controlled(position) => Some(position),
            _ => None,
        };

        self.current = Some(to.clone());
        let open_passages = self.resolve_passages(&to)?;
        tracing::debug!(%from, %to, ?arrival, open_passages, "followed warp");

        Ok(Some(Transition {
            from,
            to,
            arrival,
            open_passages,
        }))
    }

    /// Opens every passage of level `name` whose destination could receive
    /// an ant right now and closes the rest. Returns the number left open.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::UnknownLevel`] when `name` is not registered.
    pub fn resolve_passages(&mut self, name: &str) -> Result<usize, WarpError> {
        let stage = self
            .levels
            .get(name)
            .ok_or_else(|| WarpError::UnknownLevel(name.to_owned()))?;

        let resolved: Vec<_> = stage
            .passages()
            .into_iter()
            .map(|site| {
                let target = site.target();
                let open = self
                    .levels
                    .get(target.level())
                    .map_or(false, |level| match target.position() {
                        Some(position) => level.can_receive(position),
                        None => true,
                    });
                (site.address(), open)
            })
            .collect();

        let mut open_count = 0;
        if let Some(stage) = self.levels.get_mut(name) {
            for (address, open) in resolved {
                if stage.set_passage_open(address, open) && open {
                    open_count += 1;
                }
            }
        }
        tracing::trace!(level = name, open = open_count, "passages resolved");
        Ok(open_count)
    }
}
