mod assets;
mod config;
pub mod engine;
pub mod entities;
pub mod rng;
pub mod tables;
pub mod telemetry;
pub mod world;

pub use engine::{DynamicNpcEngine, SpawnError, TickOutcome};
pub use rng::{EngineRng, RandomSource};
pub use tables::{TableSet, TableStore};
pub use world::host::{Action, CharacterView, WorldHost};

use engine::profile::{GANG_TEMPLATE, RUNNER_TEMPLATE};
use entities::skills::SkillId;
use std::sync::Arc;
use world::memory::{demo_city, CharacterTemplate, MemoryWorld};
use world::room::RoomId;

const DEMO_START: u64 = 1_000_000;
const TICK_SECS: u64 = 10;

pub fn run(args: &[String]) -> Result<(), String> {
    let config = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&config.root)?;
    let summary = assets::scan(&config.root)?;
    println!("npcgen: table scan");
    println!("- root: {}", config.root.display());
    if summary.missing_dir {
        println!("- tables: missing tables directory, using builtin tables");
    } else {
        println!(
            "- tables: txt={}, spawn={}, yaml={}",
            summary.table_files, summary.spawn_files, summary.yaml_files
        );
    }

    let store = Arc::new(TableStore::new(&config.root));
    let tables = store.load();
    print!("{}", tables.report);
    if tables.report.total_skipped() > 0 {
        eprintln!(
            "npcgen: {} table lines skipped, see log/npcgen.log",
            tables.report.total_skipped()
        );
    }

    let mut world = demo_city(RUNNER_TEMPLATE, DEMO_START);
    world.add_template(
        GANG_TEMPLATE,
        CharacterTemplate {
            name: "a ganger".to_string(),
            skills: vec![(SkillId(1), 3), (SkillId(12), 4)],
            attributes: [4, 3, 4, 2, 3, 2],
        },
    );
    let mut engine = DynamicNpcEngine::seeded(Arc::clone(&store), config.seed);
    let totals = simulate(&mut engine, &mut world, config.ticks);

    println!("npcgen: demo run (seed {}, {} ticks)", config.seed, config.ticks);
    println!("- spawned: {}", totals.spawned);
    println!("- configured: {}", totals.tick.configured);
    println!("- actions: {}", totals.tick.actions);
    println!("- social replies: {}", totals.replies);
    println!("- evicted: {}", totals.tick.evicted);
    println!("- reaped: {}", totals.tick.reaped);
    println!("- still live: {}", engine.lifecycle().len());
    for id in engine.lifecycle().ids() {
        if let (Some(view), Some(record)) = (world.character(id), engine.lifecycle().get(id)) {
            let tier = record
                .tier
                .and_then(|tier| tables.tiers.find(tier))
                .map_or("-", |tier| tier.name.as_str());
            let class = record.class.map_or("-", |class| class.as_str());
            println!("  {} [{}] tier={} class={}", view.name, record.profile.name(), tier, class);
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct DemoTotals {
    spawned: usize,
    replies: usize,
    tick: TickOutcome,
}

/// Two players log in, wander into the barrens, wave at whoever showed up and log
/// out; the rest of the run lets the abandoned zones drain.
fn simulate(engine: &mut DynamicNpcEngine, world: &mut MemoryWorld, ticks: u32) -> DemoTotals {
    let mut totals = DemoTotals::default();
    let kira = world.add_player("Kira", RoomId(100));
    let dex = world.add_player("Dex", RoomId(103));
    totals.spawned += engine.on_player_login(world, kira);
    totals.spawned += engine.on_player_login(world, dex);

    let wander_at = ticks / 4;
    let leave_at = ticks / 2;
    for tick in 0..ticks {
        if tick == wander_at {
            world.move_character(kira, RoomId(200));
            totals.spawned += engine.on_player_enter_zone(world, kira, RoomId(200));
            let bystanders = world.occupants(RoomId(103));
            let target = bystanders.into_iter().find(|id| engine.lifecycle().contains(*id));
            totals.replies += engine.notify_social(world, dex, target, "wave");
        }
        if tick == leave_at {
            world.remove_character(kira);
            world.remove_character(dex);
            // Jump past the longest inactivity window so the drain shows up.
            let longest = engine
                .profiles()
                .iter()
                .map(|profile| profile.spawn.inactivity_secs)
                .max()
                .unwrap_or(0);
            world.advance(longest);
        }
        world.advance(TICK_SECS);
        let outcome = engine.run_maintenance_tick(world);
        totals.tick.configured += outcome.configured;
        totals.tick.actions += outcome.actions;
        totals.tick.evicted += outcome.evicted;
        totals.tick.reaped += outcome.reaped;
    }
    totals
}
