#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless wave-survival session.

mod layout;
mod logging;
mod session;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use horde_core::GameConfig;

use crate::layout::Layout;
use crate::session::Session;

/// Simulates waves of enemies against an automated player.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// ASCII map file; the built-in arena is used when omitted.
    #[arg(long)]
    map: Option<PathBuf>,
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Length of a tick in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Overrides the wave and progression seeds.
    #[arg(long)]
    seed: Option<u64>,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.waves.seed = seed;
        config.progression.seed = seed.rotate_left(32);
    }
    let config = config.validate().context("invalid configuration")?;
    let layout = load_layout(cli.map.as_deref())?;

    let dt = Duration::from_millis(cli.tick_ms);
    let mut session = Session::new(&config, &layout);
    let mut ticks = 0;
    while ticks < cli.ticks && !session.is_over() {
        session.tick(dt);
        ticks += 1;
    }
    log::info!("stopped after {ticks} tick(s)");

    println!("{}", session.summary());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn load_layout(path: Option<&Path>) -> Result<Layout> {
    let Some(path) = path else {
        return layout::parse(layout::BUILTIN_MAP).context("built-in map is invalid");
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file {}", path.display()))?;
    layout::parse(&contents).with_context(|| format!("invalid map file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sample_config_is_valid() {
        let config: GameConfig =
            toml::from_str(include_str!("../horde.toml")).expect("sample config parses");
        let config = config.validate().expect("sample config validates");
        assert_eq!(config.waves.table.len(), 3);
        assert_eq!(config.progression.ammo, 12);
        assert_eq!(config.ranged, GameConfig::default().ranged);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["horde", "--ticks", "10", "--tick-ms", "20", "--seed", "9"]);
        assert_eq!(cli.ticks, 10);
        assert_eq!(cli.tick_ms, 20);
        assert_eq!(cli.seed, Some(9));
        assert!(Cli::try_parse_from(["horde", "--tick-ms", "0"]).is_err());
    }
}
