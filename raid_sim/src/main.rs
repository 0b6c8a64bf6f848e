//! raid_sim - Run one encounter headless and print the outcome

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use raid_core::config::load_toml;
use raid_core::prelude::*;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "raid_sim")]
#[command(about = "Simulate a raid encounter with AI healers")]
#[command(version)]
struct Args {
    /// Boss id from the boss table (e.g. "lucifron")
    #[arg(short, long, default_value = "lucifron")]
    boss: String,

    /// RNG seed; the same seed replays the same fight
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Directory holding constants/spells/debuffs/bosses/items TOML files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Roster TOML (defaults to the standard forty)
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Stop after this much simulated time even if nobody has won
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// Override the simulation step
    #[arg(long)]
    tick_ms: Option<Millis>,

    /// Print the score report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Combat log lines to print after the fight
    #[arg(long, default_value_t = 20)]
    log_lines: usize,

    /// Write the raid save (roster, DKP, gear) here afterwards
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut data = match &args.data_dir {
        Some(dir) => GameData::load_dir(dir)
            .with_context(|| format!("loading game data from {}", dir.display()))?,
        None => GameData::builtin(),
    };
    if let Some(tick_ms) = args.tick_ms {
        if tick_ms == 0 {
            bail!("--tick-ms must be positive");
        }
        data.constants.timing.tick_ms = tick_ms;
    }

    let roster = match &args.roster {
        Some(path) => load_toml::<RosterConfig>(path)
            .with_context(|| format!("loading roster from {}", path.display()))?,
        None => RosterConfig::default_raid(),
    };
    let raid = roster.build()?;
    info!(members = raid.members.len(), boss = %args.boss, seed = args.seed, "starting");

    let mut sim = Simulation::new(data, raid, &args.boss, &[], args.seed)?;
    let status = sim.run_until_done(args.max_seconds.saturating_mul(1000));

    let Some(score) = sim.score().cloned() else {
        println!(
            "{} still standing after {}s ({:?})",
            sim.boss().name,
            args.max_seconds,
            status
        );
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        print_report(&sim, &score, args.log_lines);
    }

    if let Some(path) = &args.save {
        let json = sim.save().to_json()?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "raid saved");
    }
    Ok(())
}

fn print_report(sim: &Simulation, score: &ScoreReport, log_lines: usize) {
    let skip = sim.log().len().saturating_sub(log_lines);
    for entry in sim.log().entries().iter().skip(skip) {
        println!("{}", entry);
    }

    println!();
    println!("{}", score.summary());
    println!();
    println!("{:<16} {:>10} {:>10} {:>8} {:>6}", "Healer", "Healing", "Overheal", "HPS", "Casts");
    for line in score.ranking() {
        println!(
            "{:<16} {:>10.0} {:>9.1}% {:>8.1} {:>6}",
            line.member.to_string(),
            line.effective,
            line.overheal_ratio() * 100.0,
            line.hps,
            line.casts
        );
    }

    if !score.loot.is_empty() {
        println!();
        for award in &score.loot {
            match award.roll {
                Some(roll) => println!(
                    "{} -> {} for {:.0} DKP (won roll {})",
                    award.item_name, award.member, award.dkp_cost, roll
                ),
                None => println!("{} -> {} for {:.0} DKP", award.item_name, award.member, award.dkp_cost),
            }
        }
    }
    println!("DKP awarded: {:.0}", score.dkp_awarded);
}
