//! Headless Tankfall match runner.
//!
//! Runs one match with a scripted player and logs a summary. Useful for
//! soak-testing tuning changes without a renderer.
//!
//! ```text
//! tankfall-headless [CONFIG.json] [--seed N] [--ticks N]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `tankfall_core=info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use tankfall_core::{EntityTag, GameEvent, PlayerIntent, SimConfig, Simulation, StatKind};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Command-line options.
struct Options {
    config: Option<PathBuf>,
    seed: u64,
    ticks: u64,
}

impl Options {
    fn parse() -> Result<Self> {
        let mut options = Self {
            config: None,
            seed: 1,
            ticks: 60 * 120,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().context("--seed needs a value")?;
                    options.seed = value.parse().with_context(|| format!("bad seed {value:?}"))?;
                }
                "--ticks" => {
                    let value = args.next().context("--ticks needs a value")?;
                    options.ticks = value
                        .parse()
                        .with_context(|| format!("bad tick count {value:?}"))?;
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                path => options.config = Some(PathBuf::from(path)),
            }
        }
        Ok(options)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Match totals.
#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    experience: f32,
    level_ups: u32,
    defeats: u32,
    volleys: u32,
}

impl Tally {
    fn record(&mut self, event: &GameEvent, player: tankfall_core::EntityId) {
        match event {
            GameEvent::ExperienceGained { entity, amount, .. } if *entity == player => {
                self.kills += 1;
                self.experience += amount;
            }
            GameEvent::LevelUp { entity, .. } if *entity == player => self.level_ups += 1,
            GameEvent::PlayerDefeated { .. } => self.defeats += 1,
            GameEvent::VolleyFired { entity, .. } if *entity == player => self.volleys += 1,
            _ => {}
        }
    }
}

/// Circles the origin and shoots at the nearest shape or AI tank.
fn scripted_intent(sim: &Simulation, tick: u64) -> PlayerIntent {
    let Some(player) = sim.player_id().and_then(|id| sim.arena().living_tank(id)) else {
        return PlayerIntent::default();
    };
    let position = player.transform.position;
    #[allow(clippy::cast_precision_loss)]
    let angle = tick as f32 / 240.0;

    let target = sim
        .arena()
        .entities_sorted()
        .filter(|entity| {
            matches!(entity.tag(), EntityTag::Shape | EntityTag::Ai) && !entity.is_dead()
        })
        .map(tankfall_core::entity::Entity::position)
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

    PlayerIntent {
        movement: Vec2::from_angle(angle).perp(),
        aim_point: target,
        fire: target.is_some(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("tankfall_core=info"))?,
        )
        .init();

    let options = Options::parse()?;
    let config = load_config(options.config.as_ref())?;
    let mut sim = Simulation::new(config, options.seed).context("invalid configuration")?;

    let player = sim.spawn_player(Vec2::ZERO);
    sim.populate();
    info!(seed = options.seed, ticks = options.ticks, "match starting");

    let mut tally = Tally::default();
    for tick in 0..options.ticks {
        sim.set_player_intent(scripted_intent(&sim, tick));
        sim.step();

        for event in sim.take_events() {
            if let GameEvent::LevelUp { entity, .. } = &event {
                if *entity == player {
                    // alternate damage and reload
                    let stat = if tally.level_ups % 2 == 0 {
                        StatKind::Damage
                    } else {
                        StatKind::Reload
                    };
                    sim.request_stat_upgrade(stat);
                }
            }
            tally.record(&event, player);
        }

        if sim.is_player_defeated() {
            sim.respawn_player();
        }
    }

    info!(
        kills = tally.kills,
        experience = tally.experience,
        level_ups = tally.level_ups,
        defeats = tally.defeats,
        volleys = tally.volleys,
        level = sim.level(player).unwrap_or(0),
        class = %sim.class_of(player).unwrap_or_default(),
        ai_alive = sim.arena().count_alive_with_tag(EntityTag::Ai),
        "match finished"
    );
    Ok(())
}
