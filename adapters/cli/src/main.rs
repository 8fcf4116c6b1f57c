#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless driver that plays the Ant Factory demo levels turn by turn.

mod config;
mod demo;
mod render;

use std::path::PathBuf;

use ant_factory_core::{Event, Intent};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::config::{SessionConfig, DEFAULT_LOG_FILTER};

/// Command-line flags; each overrides the matching session file key.
#[derive(Debug, Parser)]
#[command(name = "ant-factory", about = "Plays the Ant Factory demo levels headlessly")]
struct Args {
    /// TOML session file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of turns to simulate.
    #[arg(long)]
    turns: Option<u32>,
    /// Scripted moves for the controlled ant: U, D, L, R or `.` to wait.
    #[arg(long)]
    moves: Option<String>,
    /// Level to start on.
    #[arg(long)]
    level: Option<String>,
    /// Tracing filter, used when RUST_LOG is unset.
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn session(&self) -> Result<SessionConfig> {
        let flags = SessionConfig {
            turns: self.turns,
            moves: self.moves.clone(),
            log_filter: self.log_filter.clone(),
            level: self.level.clone(),
        };
        match &self.config {
            Some(path) => Ok(flags.or(SessionConfig::load(path)?)),
            None => Ok(flags),
        }
    }
}

/// Entry point for the Ant Factory command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let session = args.session()?;
    init_tracing(session.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER));

    let mut registry = demo::registry()?;
    if let Some(level) = &session.level {
        registry
            .set_current(level)
            .with_context(|| format!("starting on level `{level}`"))?;
    }

    let intents = session.intents()?;
    for turn in 0..session.turn_count() {
        let intent = usize::try_from(turn)
            .ok()
            .and_then(|index| intents.get(index).copied())
            .unwrap_or(Intent::Idle);
        let stage = registry
            .current_mut()
            .context("no level is being played")?;
        let mut events = Vec::new();
        ant_factory_stage::apply(stage, intent, &mut events);
        for event in &events {
            log_event(stage.turn(), event);
        }

        if let Some(transition) = registry.follow_warp()? {
            info!(
                from = transition.from(),
                to = transition.to(),
                open_passages = transition.open_passages(),
                "warped"
            );
        }
    }

    let name = registry.current_name().unwrap_or_default().to_owned();
    let stage = registry.current().context("no level is being played")?;
    println!("{name} after {} turns", stage.turn());
    print!("{}", render::render(stage));
    if let Some(help) = stage.active_help() {
        println!("{help}");
    }
    Ok(())
}

fn init_tracing(fallback: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn log_event(turn: u64, event: &Event) {
    match event {
        Event::AntMoved { ant, from, to } => info!(
            turn,
            ant = ant.get(),
            from = ?(from.x(), from.y()),
            to = ?(to.x(), to.y()),
            "ant moved"
        ),
        Event::AntKilled { ant, cell, hazard } => info!(
            turn,
            ant = ant.get(),
            cell = ?(cell.x(), cell.y()),
            ?hazard,
            "ant killed"
        ),
        Event::ControlTransferred { from, to } => info!(
            turn,
            from = ?from.map(|ant| ant.get()),
            to = ?to.map(|ant| ant.get()),
            "control transferred"
        ),
        Event::NetworkChanged { network, active } => {
            info!(turn, network = network.get(), active, "network changed");
        }
        Event::LaserChanged { cell, mask } => tracing::debug!(
            turn,
            cell = ?(cell.x(), cell.y()),
            mask = mask.bits(),
            "beam changed"
        ),
        Event::LaserHit { cell, mask } => tracing::debug!(
            turn,
            cell = ?(cell.x(), cell.y()),
            mask = mask.bits(),
            "beam hit"
        ),
        Event::ItemMoved { item, from, to } => info!(
            turn,
            item = item.name(),
            from = ?(from.x(), from.y()),
            to = ?(to.x(), to.y()),
            "item moved"
        ),
    }
}
