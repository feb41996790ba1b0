mod logging;
mod renderer;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use floormap_core::MapEngine;
use floormap_runtime::{MapConfig, Timing};

const OFFICE_MAP: &str = include_str!("../../../assets/office.svg");

const USAGE: &str = "\
Usage: floormap [--map FILE] [--config FILE]
       floormap replay SCRIPT [--map FILE] [--config FILE] [--out FILE]";

#[derive(Debug, PartialEq)]
enum Mode {
    Interactive,
    Replay { script: PathBuf, out: Option<PathBuf> },
}

#[derive(Debug, PartialEq)]
struct Args {
    mode: Mode,
    map: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut map = None;
        let mut config = None;
        let mut out = None;
        let mut replay = false;
        let mut script = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--map" => map = Some(value(&mut args, "--map")?),
                "--config" => config = Some(value(&mut args, "--config")?),
                "--out" => out = Some(value(&mut args, "--out")?),
                "-h" | "--help" => bail!("{USAGE}"),
                "replay" if !replay => replay = true,
                other if replay && script.is_none() && !other.starts_with('-') => {
                    script = Some(PathBuf::from(other));
                }
                other => bail!("unexpected argument {other:?}\n{USAGE}"),
            }
        }

        let mode = match (replay, script) {
            (true, Some(script)) => Mode::Replay { script, out },
            (true, None) => bail!("replay needs a SCRIPT\n{USAGE}"),
            (false, _) if out.is_some() => bail!("--out only applies to replay\n{USAGE}"),
            (false, _) => Mode::Interactive,
        };
        Ok(Self { mode, map, config })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .with_context(|| format!("{flag} needs a value\n{USAGE}"))
}

/// Map description, configuration, and an engine with the configured style
/// overrides installed.
struct Setup {
    map: String,
    config: MapConfig,
    engine: MapEngine,
    timing: Timing,
}

impl Setup {
    fn load(args: &Args) -> Result<Self> {
        let map = match &args.map {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading map {}", path.display()))?,
            None => OFFICE_MAP.to_owned(),
        };
        let config = match &args.config {
            Some(path) => MapConfig::load(path)?,
            None => MapConfig::office(),
        };
        let mut engine = MapEngine::new();
        config.apply_engine_styles(&mut engine)?;
        Ok(Self {
            map,
            config,
            engine,
            timing: Timing::from_env(),
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    let setup = Setup::load(&args)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match args.mode {
        Mode::Interactive => {
            let _guard = logging::init_file()?;
            runtime.block_on(renderer::run_interactive(setup))
        }
        Mode::Replay { script, out } => {
            logging::init_stderr();
            runtime.block_on(replay::run(setup, &script, out))
        }
    }
}
