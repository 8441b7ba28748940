//! Frame Fight headless runner
//!
//! Runs one round between two characters, driven either by a recorded replay
//! or by the seeded input fuzzer, and prints the final snapshot as JSON.

use anyhow::{Context, bail};

use frame_fight::replay::{InputFuzzer, Replay};
use frame_fight::roster;
use frame_fight::settings::Settings;
use frame_fight::sim::{CombatEvent, Fight, MatchSetup};

const USAGE: &str = "usage: frame-fight [--ticks N] [--seed N] [--replay FILE] [--record FILE] [--settings FILE] [P1] [P2]";

struct Args {
    ticks: usize,
    seed: u64,
    replay: Option<String>,
    record: Option<String>,
    settings: Option<String>,
    fighters: [String; 2],
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut args = Args {
            ticks: 60 * 99,
            seed: 1,
            replay: None,
            record: None,
            settings: None,
            fighters: ["kaze".to_string(), "tetsu".to_string()],
        };
        let mut positional = Vec::new();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| iter.next().with_context(|| format!("{flag} needs a value\n{USAGE}"));
            match arg.as_str() {
                "--ticks" => args.ticks = value("--ticks")?.parse().context("--ticks")?,
                "--seed" => args.seed = value("--seed")?.parse().context("--seed")?,
                "--replay" => args.replay = Some(value("--replay")?),
                "--record" => args.record = Some(value("--record")?),
                "--settings" => args.settings = Some(value("--settings")?),
                "-h" | "--help" => {
                    println!("{USAGE}");
                    println!("built-in characters: {}", roster::names().collect::<Vec<_>>().join(", "));
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown option `{flag}`\n{USAGE}"),
                _ => positional.push(arg),
            }
        }
        if positional.len() > 2 {
            bail!("at most two fighters\n{USAGE}");
        }
        for (slot, name) in positional.into_iter().enumerate() {
            args.fighters[slot] = name;
        }
        Ok(args)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse()?;
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let [p1, p2] = &args.fighters;
    let p1 = roster::resolve(p1).with_context(|| format!("loading P1 `{p1}`"))?;
    let p2 = roster::resolve(p2).with_context(|| format!("loading P2 `{p2}`"))?;
    let mut fight = Fight::new(MatchSetup::new(p1, p2, settings)?);

    let replay = match &args.replay {
        Some(path) => Replay::load(path)?,
        None => {
            log::info!("Generating {} ticks of input with seed {}", args.ticks, args.seed);
            InputFuzzer::new(args.seed).record(args.ticks)
        }
    };

    let mut played = Replay::default();
    for inputs in &replay.frames {
        played.push(*inputs);
        for event in fight.step(*inputs) {
            log_event(&fight, &event);
        }
        if let Some(winner) = fight.winner() {
            log::info!("{:?} wins at tick {}", winner, fight.state().time_ticks);
            break;
        }
    }

    if let Some(path) = &args.record {
        std::fs::write(path, played.to_json()?).with_context(|| format!("writing replay to {path}"))?;
        log::info!("Recorded {} frames to {}", played.len(), path);
    }

    println!("{}", fight.snapshot().to_json()?);
    Ok(())
}

fn log_event(fight: &Fight, event: &CombatEvent) {
    let tick = fight.state().time_ticks;
    match event {
        CombatEvent::MoveStarted { combatant, move_id } => {
            let name = fight.setup().table(*combatant).name_of(*move_id);
            log::debug!("[{tick}] {combatant:?} {name}");
        }
        CombatEvent::HitLanded {
            attacker,
            defender,
            damage,
        } => {
            let health = fight.state().combatant(*defender).health;
            log::info!("[{tick}] {attacker:?} hits {defender:?} for {damage} ({health} left)");
        }
        CombatEvent::AttackBlocked { attacker, defender } => {
            log::debug!("[{tick}] {defender:?} blocks {attacker:?}");
        }
        CombatEvent::ComboExtended { attacker, count } => {
            log::info!("[{tick}] {attacker:?} {count} hit combo");
        }
        CombatEvent::HazardSpawned { owner, hazard } => {
            log::debug!("[{tick}] {owner:?} hazard {}", hazard.0);
        }
        CombatEvent::CombatantDefeated { combatant } => {
            log::info!("[{tick}] {combatant:?} is defeated");
        }
    }
}
